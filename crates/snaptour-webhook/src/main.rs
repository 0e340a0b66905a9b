//! snaptour webhook server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `SNAPTOUR_*` environment variables, opens the SQLite store, and serves the
//! LINE webhook over HTTP.
//!
//! # Seeding label definitions
//!
//! ```sh
//! cargo run -p snaptour-webhook --bin server -- --import-labels labels.toml
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use snaptour_store_sqlite::SqliteStore;
use snaptour_webhook::{
  AppState, ServerConfig,
  blob::FsBlobStore,
  classifier::HttpClassifier,
  line::{LineClient, LineConfig},
  seed,
};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SnapTour LINE webhook server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Import label definitions from a TOML file into the store and exit.
  #[arg(long, value_name = "FILE")]
  import_labels: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SNAPTOUR"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: import labels and exit.
  if let Some(path) = cli.import_labels {
    let source = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read {path:?}"))?;
    let count = seed::import_labels(&store, &source)
      .await
      .context("failed to import labels")?;
    tracing::info!(count, "labels imported");
    return Ok(());
  }

  let messaging = LineClient::new(LineConfig {
    access_token:  server_cfg.channel_access_token.clone(),
    api_base:      server_cfg.line_api_base.clone(),
    data_api_base: server_cfg.line_data_api_base.clone(),
  })
  .context("failed to build LINE client")?;

  let blobs = FsBlobStore::new(
    expand_tilde(&server_cfg.blob_dir),
    server_cfg.bucket.clone(),
    server_cfg.storage_domain.clone(),
  );

  let classifier = HttpClassifier::new(
    server_cfg.classifier_endpoint.clone(),
    server_cfg.classifier_model.clone(),
    server_cfg.min_confidence,
  )
  .context("failed to build classifier client")?;

  if server_cfg.channel_secret.is_none() {
    tracing::warn!("channel_secret is not set; webhook signatures will not be verified");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  let state = AppState::new(
    Arc::new(store),
    Arc::new(messaging),
    Arc::new(blobs),
    Arc::new(classifier),
    server_cfg,
    StdRng::from_entropy(),
  );

  let app = snaptour_webhook::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
