//! Read-only JSON API over the game store.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/labels` | All label definitions |
//! | `GET`  | `/users/{user_id}/summary` | Distinct labels, total score, goal status |
//! | `GET`  | `/users/{user_id}/interactions` | Interaction records, newest first |

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Path, State},
  routing::get,
};
use serde::Serialize;
use snaptour_core::{
  Summary,
  aggregate::{goal_reached, summarize},
  record::{InteractionRecord, LabelDefinition},
  service::GameStore,
};

use crate::error::ApiError;

struct ApiState<S> {
  store: Arc<S>,
  goal:  i64,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), goal: self.goal } }
}

/// Build the API router for `store`, reporting goal status against `goal`.
///
/// The returned `Router<()>` can be nested into any parent router.
pub fn api_router<S>(store: Arc<S>, goal: i64) -> Router<()>
where
  S: GameStore + 'static,
{
  Router::new()
    .route("/labels", get(labels::<S>))
    .route("/users/{user_id}/summary", get(summary::<S>))
    .route("/users/{user_id}/interactions", get(interactions::<S>))
    .with_state(ApiState { store, goal })
}

/// `GET /labels`
async fn labels<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<LabelDefinition>>, ApiError>
where
  S: GameStore,
{
  let labels = state
    .store
    .list_labels()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(labels))
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
  #[serde(flatten)]
  pub summary:      Summary,
  pub goal:         i64,
  pub goal_reached: bool,
}

/// `GET /users/{user_id}/summary`
async fn summary<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError>
where
  S: GameStore,
{
  let rows = state
    .store
    .observations(&user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let summary = summarize(&rows);
  let reached = goal_reached(summary.total_score, state.goal);

  Ok(Json(SummaryResponse { summary, goal: state.goal, goal_reached: reached }))
}

/// `GET /users/{user_id}/interactions`
async fn interactions<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<InteractionRecord>>, ApiError>
where
  S: GameStore,
{
  let records = state
    .store
    .list_interactions(&user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}
