use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use clap::{Args, Parser, Subcommand};
use nt_core::{Article, DigestStorage, NewsDigest, Result};
use nt_feeds::{
    init_logging, parse_sources, FeedManager, FetchConfig, HttpFeedFetcher, NewsPipeline,
    NormalizerConfig, PipelineConfig,
};
use nt_feeds::normalizer::DEFAULT_LIMIT;
use nt_inference::{EmbeddingBackend, EmbeddingConfig, SharedEmbedder};
use nt_web::{create_app, serve, AppState};
use tracing::{info, warn};

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Korean news digest with topic clustering", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Comma separated RSS feed URLs
    #[arg(long, env = "FEEDS", global = true)]
    feeds: Option<String>,
    /// Articles kept after sorting
    #[arg(long, env = "LIMIT", default_value_t = DEFAULT_LIMIT, global = true)]
    limit: usize,
    /// Per-feed request timeout (e.g. 15s, 1m)
    #[arg(long, env = "FEED_TIMEOUT", default_value = "15s", global = true)]
    timeout: HumanDuration,
    /// Embedding backend: openai (any OpenAI-compatible server, e.g. ollama) or hashing
    #[arg(long, env = "NT_EMBEDDING", default_value = "openai", global = true)]
    embedding: EmbeddingBackend,
    #[arg(long, env = "EMBEDDING_URL", default_value = "http://localhost:11434/v1", global = true)]
    embedding_url: String,
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "all-minilm", global = true)]
    embedding_model: String,
    #[arg(long, env = "EMBEDDING_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Max concurrent embedding requests
    #[arg(long, env = "EMBEDDING_CONCURRENCY", default_value_t = 8, global = true)]
    concurrency: usize,
    /// Fix the clustering outcome
    #[arg(long, env = "NT_SEED", global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the API and the built frontend
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8787)]
        port: u16,
        #[arg(long, env = "STATIC_DIR", default_value = "dist")]
        static_dir: PathBuf,
        /// How long a built digest is reused (e.g. 10m, 1h)
        #[arg(long, env = "CACHE_TTL", default_value = "10m")]
        cache_ttl: HumanDuration,
    },
    /// Write articles.json and topics.json for static hosting
    Build {
        #[arg(long, env = "OUT_DIR", default_value = "public")]
        out_dir: PathBuf,
    },
    /// Print the normalized article list
    Fetch {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn create_pipeline(args: &PipelineArgs) -> Result<NewsPipeline> {
    let fetcher = HttpFeedFetcher::new(&FetchConfig {
        timeout: args.timeout.0,
        ..Default::default()
    })?;
    let feeds = FeedManager::new(Arc::new(fetcher), parse_sources(args.feeds.as_deref()));
    info!("📡 {} feed sources configured", feeds.sources().len());

    let embedder = SharedEmbedder::new(EmbeddingConfig {
        backend: args.embedding,
        base_url: args.embedding_url.clone(),
        model_name: args.embedding_model.clone(),
        api_key: args.api_key.clone(),
        concurrency: args.concurrency.max(1),
        ..Default::default()
    });

    Ok(NewsPipeline::new(
        feeds,
        Arc::new(embedder),
        PipelineConfig {
            normalizer: NormalizerConfig {
                limit: args.limit,
                ..Default::default()
            },
            seed: args.seed,
            ..Default::default()
        },
    ))
}

async fn build(pipeline: &NewsPipeline, out_dir: PathBuf) -> Result<()> {
    let storage = nt_storage::create_storage("json", Some(out_dir.as_path()))?;

    let articles = pipeline.fetch_articles().await;
    storage
        .store_digest(&NewsDigest::articles_only(articles.clone()))
        .await?;

    let digest = pipeline.topics_from(articles).await;
    if !digest.has_topics() {
        warn!("⚠️ Skipping topics.json, only articles.json was written");
        return Ok(());
    }
    if let Err(e) = storage.store_digest(&digest).await {
        warn!(error = %e, "⚠️ Failed to write topics.json");
    }
    Ok(())
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        let date = article.published_timestamp().format("%Y-%m-%d %H:%M");
        println!("{:>4}  {}  {:<20}  {}", article.id, date, article.source, article.title);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pipeline = Arc::new(create_pipeline(&cli.pipeline)?);

    match cli.command {
        Commands::Serve { port, static_dir, cache_ttl } => {
            info!("🗞️ Starting server (cache ttl {})", cache_ttl);
            let state = AppState::new(pipeline, cache_ttl.0);
            let app = create_app(state, Some(static_dir.as_path())).await;
            serve(app, SocketAddr::from(([0, 0, 0, 0], port))).await?;
        }
        Commands::Build { out_dir } => {
            info!("🏗️ Building digest into {}", out_dir.display());
            build(&pipeline, out_dir).await?;
        }
        Commands::Fetch { json } => {
            let articles = pipeline.fetch_articles().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                print_articles(&articles);
            }
        }
    }

    Ok(())
}
