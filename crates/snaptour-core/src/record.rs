//! Persisted record types: interactions, label definitions and observations.
//!
//! All three live in external storage; the core only reads and appends them
//! through [`crate::service::GameStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Interactions ────────────────────────────────────────────────────────────

/// One inbound event from a user, keyed by `(user_id, timestamp)`.
///
/// Writing a record whose key already exists overwrites the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
  pub user_id:      String,
  /// Unix seconds at which the event was handled.
  pub timestamp:    i64,
  pub display_name: String,
  /// Set for text messages.
  pub message_text: Option<String>,
  /// Set for image messages whose content was stored successfully.
  pub image_url:    Option<String>,
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Reference data for a label the classifier can recognise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefinition {
  pub label:   String,
  /// Extra reply sent after a successful recognition, if any.
  #[serde(default)]
  pub message: Option<String>,
  /// Points awarded per recognition.
  #[serde(default)]
  pub score:   i64,
}

// ─── Observations ────────────────────────────────────────────────────────────

/// One recognition of `label` in an image sent by `user_id`.
///
/// Observations are append-only: recognising the same label twice yields two
/// rows, and both count towards the user's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
  pub observation_id: Uuid,
  pub user_id:        String,
  pub label:          String,
  pub score:          i64,
  /// Server-assigned; never changes after creation.
  pub recorded_at:    DateTime<Utc>,
}

/// Input to [`crate::service::GameStore::record_observation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObservation {
  pub user_id: String,
  pub label:   String,
  pub score:   i64,
}

impl NewObservation {
  pub fn new(
    user_id: impl Into<String>,
    label: impl Into<String>,
    score: i64,
  ) -> Self {
    Self { user_id: user_id.into(), label: label.into(), score }
  }
}
