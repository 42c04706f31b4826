pub mod error;
pub mod models;
pub mod storage;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use models::EmbeddingModel;
pub use storage::DigestStorage;
pub use types::{Article, MediaEntry, MediaField, NewsDigest, RawFeedItem, Topic};

pub mod prelude {
    pub use super::{Article, Error, NewsDigest, Result, Topic};
}
