//! HTTP surface for SnapTour.
//!
//! Exposes an axum [`Router`] with the LINE webhook endpoint and a read-only
//! JSON API, wired to any set of collaborators implementing the traits in
//! [`snaptour_core::service`].

pub mod api;
pub mod blob;
pub mod classifier;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod line;
pub mod seed;
pub mod signature;

#[cfg(test)]
mod testing;

pub use error::Error;

use std::{
  collections::HashMap,
  path::PathBuf,
  sync::{Arc, Mutex},
};

use axum::{
  Router,
  extract::State,
  http::{HeaderMap, StatusCode},
  routing::{get, post},
};
use bytes::Bytes;
use rand::rngs::StdRng;
use serde::Deserialize;
use snaptour_core::{
  reply::{Composer, DEFAULT_GOAL_POINT, DEFAULT_RECOMMENDED_LABELS},
  service::{BlobStore, Classifier, GameStore, Messaging},
};
use tower_http::trace::TraceLayer;

use event::WebhookPayload;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SNAPTOUR_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  pub channel_access_token: String,
  /// When set, webhook bodies must carry a valid `X-Line-Signature`.
  #[serde(default)]
  pub channel_secret:       Option<String>,
  #[serde(default = "default_line_api_base")]
  pub line_api_base:        String,
  #[serde(default = "default_line_data_api_base")]
  pub line_data_api_base:   String,
  pub bucket:               String,
  #[serde(default = "default_storage_domain")]
  pub storage_domain:       String,
  /// Local directory images are written to.
  #[serde(default = "default_blob_dir")]
  pub blob_dir:             PathBuf,
  pub classifier_endpoint:  String,
  /// Model identifier sent with every classification request.
  pub classifier_model:     String,
  #[serde(default)]
  pub min_confidence:       Option<f32>,
  #[serde(default = "default_goal_point")]
  pub goal_point:           i64,
  #[serde(default = "default_recommended_labels")]
  pub recommended_labels:   Vec<String>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("snaptour.db") }
fn default_line_api_base() -> String { line::DEFAULT_API_BASE.to_owned() }
fn default_line_data_api_base() -> String { line::DEFAULT_DATA_API_BASE.to_owned() }
fn default_storage_domain() -> String { blob::DEFAULT_STORAGE_DOMAIN.to_owned() }
fn default_blob_dir() -> PathBuf { PathBuf::from("blobs") }
fn default_goal_point() -> i64 { DEFAULT_GOAL_POINT }
fn default_recommended_labels() -> Vec<String> {
  DEFAULT_RECOMMENDED_LABELS.iter().map(|s| s.to_string()).collect()
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the webhook handler: every collaborator is
/// passed in explicitly.
pub struct AppState<S, M, B, C> {
  pub store:      Arc<S>,
  pub messaging:  Arc<M>,
  pub blobs:      Arc<B>,
  pub classifier: Arc<C>,
  pub composer:   Arc<Composer>,
  pub config:     Arc<ServerConfig>,
  /// Source for the encouragement draw; seeded in tests.
  pub rng:        Arc<Mutex<StdRng>>,
  /// Last interaction timestamp handed out per user.
  pub last_seen:  Arc<Mutex<HashMap<String, i64>>>,
}

impl<S, M, B, C> AppState<S, M, B, C> {
  pub fn new(
    store: Arc<S>,
    messaging: Arc<M>,
    blobs: Arc<B>,
    classifier: Arc<C>,
    config: ServerConfig,
    rng: StdRng,
  ) -> Self {
    let composer = Composer::new(config.goal_point, config.recommended_labels.clone());
    Self {
      store,
      messaging,
      blobs,
      classifier,
      composer: Arc::new(composer),
      config: Arc::new(config),
      rng: Arc::new(Mutex::new(rng)),
      last_seen: Arc::default(),
    }
  }
}

impl<S, M, B, C> Clone for AppState<S, M, B, C> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      messaging:  self.messaging.clone(),
      blobs:      self.blobs.clone(),
      classifier: self.classifier.clone(),
      composer:   self.composer.clone(),
      config:     self.config.clone(),
      rng:        self.rng.clone(),
      last_seen:  self.last_seen.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`]: `POST /webhook`, `GET /health` and `/api/*`.
pub fn router<S, M, B, C>(state: AppState<S, M, B, C>) -> Router
where
  S: GameStore + 'static,
  M: Messaging + 'static,
  B: BlobStore + 'static,
  C: Classifier + 'static,
{
  let api = api::api_router(state.store.clone(), state.composer.goal);

  Router::new()
    .route("/webhook", post(webhook_handler::<S, M, B, C>))
    .route("/health", get(|| async { "ok" }))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

/// `POST /webhook`
///
/// Rejects bad signatures and unparseable bodies; otherwise handles every
/// event and answers `200 OK` whatever happened downstream.
async fn webhook_handler<S, M, B, C>(
  State(state): State<AppState<S, M, B, C>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<StatusCode, Error>
where
  S: GameStore + 'static,
  M: Messaging + 'static,
  B: BlobStore + 'static,
  C: Classifier + 'static,
{
  if let Some(secret) = &state.config.channel_secret {
    let provided = headers
      .get(signature::HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or(Error::Unauthorized)?;
    signature::verify(secret.as_bytes(), &body, provided)?;
  }

  let payload: WebhookPayload =
    serde_json::from_slice(&body).map_err(|e| Error::BadRequest(e.to_string()))?;

  tracing::info!(
    destination = payload.destination.as_deref().unwrap_or_default(),
    events = payload.events.len(),
    "webhook received"
  );
  dispatch::handle_events(&state, payload.events).await;

  Ok(StatusCode::OK)
}

// ─── Integration tests ────────────────────────────────────────────────────────
