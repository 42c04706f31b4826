use std::path::Path;
use std::sync::Arc;
use nt_core::{DigestStorage, Error, Result};

pub mod backends;

pub use backends::*;

/// Build a storage backend by name: `memory` or `json` (rooted at `path`).
pub fn create_storage(kind: &str, path: Option<&Path>) -> Result<Arc<dyn DigestStorage>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        "json" => {
            let dir = path.ok_or_else(|| {
                Error::Storage("JSON storage needs an output directory".to_string())
            })?;
            Ok(Arc::new(JsonFileStorage::new(dir)))
        }
        other => Err(Error::Storage(format!(
            "Unknown storage backend: {}. Available backends: memory, json",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_storage;
    pub use nt_core::DigestStorage;
}
