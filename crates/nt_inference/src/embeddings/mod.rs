use std::future::Future;
use std::sync::Arc;
use futures::future::{join_all, BoxFuture, FutureExt};
use nt_core::{EmbeddingModel, Error, Result};
use tokio::sync::{OnceCell, Semaphore};
use crate::models::create_model;
use crate::EmbeddingConfig;

type ModelFuture = BoxFuture<'static, Result<Arc<dyn EmbeddingModel>>>;
type ModelLoader = Box<dyn Fn() -> ModelFuture + Send + Sync>;

/// Lazily constructed embedding model shared by every pipeline run.
///
/// The model is loaded on first use. Concurrent first callers wait on the same
/// initialization, so the loader runs at most once per successful load. A
/// failed load leaves the handle empty and the next caller tries again.
pub struct SharedEmbedder {
    cell: OnceCell<Arc<dyn EmbeddingModel>>,
    loader: ModelLoader,
    semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for SharedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEmbedder")
            .field("model", &self.cell.get())
            .field("permits", &self.semaphore.available_permits())
            .finish()
    }
}

impl SharedEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        let concurrency = config.concurrency;
        Self::with_loader(concurrency, move || {
            let config = config.clone();
            async move {
                let model = create_model(&config).await?;
                tracing::info!(
                    "🧠 Embedding model initialized (using {} via {})",
                    model.name(),
                    config.backend
                );
                Ok::<_, Error>(model)
            }
        })
    }

    pub fn with_loader<F, Fut>(concurrency: usize, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn EmbeddingModel>>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(move || loader().boxed()),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Wrap an already constructed model.
    pub fn with_model(model: Arc<dyn EmbeddingModel>, concurrency: usize) -> Self {
        let embedder = Self::with_loader(concurrency, {
            let model = model.clone();
            move || {
                let model = model.clone();
                async move { Ok::<_, Error>(model) }
            }
        });
        // A fresh cell cannot already be set
        let _ = embedder.cell.set(model);
        embedder
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn model(&self) -> Result<Arc<dyn EmbeddingModel>> {
        self.cell
            .get_or_try_init(|| (self.loader)())
            .await
            .cloned()
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.model().await?;
        model.generate_embeddings(text).await
    }

    /// Embed every text; vector `i` belongs to `texts[i]`. Requests run
    /// concurrently up to the configured limit, and any failure fails the batch.
    pub async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.model().await?;

        let futures = texts.iter().map(|text| {
            let model = model.clone();
            let semaphore = self.semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.map_err(|e| Error::External(e.into()))?;
                model.generate_embeddings(text).await
            }
        });

        join_all(futures).await.into_iter().collect()
    }
}
