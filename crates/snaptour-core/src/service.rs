//! Collaborator traits: persistence, messaging transport, blob storage and
//! the image classifier.
//!
//! Backends live in other crates (`snaptour-store-sqlite`,
//! `snaptour-webhook`). The event router depends only on these traits, so
//! every collaborator can be replaced with a test double.
//!
//! All methods return `Send` futures so implementations can be used from
//! axum handlers on a multi-threaded tokio runtime.

use std::future::Future;

use crate::{
  interpret::CandidateLabel,
  record::{InteractionRecord, LabelDefinition, NewObservation, Observation},
  reply::ReplyItem,
};

// ─── Persistence ─────────────────────────────────────────────────────────────

/// Storage for interaction records, label definitions and observations.
pub trait GameStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Interactions ──────────────────────────────────────────────────────

  /// Insert or overwrite the record keyed by `(user_id, timestamp)`.
  fn upsert_interaction(
    &self,
    record: InteractionRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All records for a user, newest first.
  fn list_interactions<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<InteractionRecord>, Self::Error>> + Send + 'a;

  // ── Label definitions ─────────────────────────────────────────────────

  /// Look up a label definition. Returns `None` for unknown labels.
  fn get_label<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Option<LabelDefinition>, Self::Error>> + Send + 'a;

  fn list_labels(
    &self,
  ) -> impl Future<Output = Result<Vec<LabelDefinition>, Self::Error>> + Send + '_;

  /// Insert or replace a label definition. Only used by admin imports.
  fn put_label(
    &self,
    definition: LabelDefinition,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Observations (append-only) ────────────────────────────────────────

  /// Append one observation. Never overwrites an earlier row.
  fn record_observation(
    &self,
    input: NewObservation,
  ) -> impl Future<Output = Result<Observation, Self::Error>> + Send + '_;

  /// All observations for a user in the order they were recorded.
  fn observations<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send + 'a;
}

// ─── Messaging transport ─────────────────────────────────────────────────────

/// The chat platform: profiles, message content and replies.
pub trait Messaging: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn display_name<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Binary content of an image message.
  fn message_content<'a>(
    &'a self,
    message_id: &'a str,
  ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send + 'a;

  /// Send `items` as the reply to the event that carried `reply_token`.
  fn reply<'a>(
    &'a self,
    reply_token: &'a str,
    items: &'a [ReplyItem],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Blob storage ────────────────────────────────────────────────────────────

/// Location of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
  pub bucket: String,
  pub key:    String,
}

pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn put<'a>(
    &'a self,
    key: &'a str,
    data: Vec<u8>,
  ) -> impl Future<Output = Result<BlobRef, Self::Error>> + Send + 'a;

  /// Public URL, `https://<bucket>.<storage-domain>/<key>`.
  fn url(&self, blob: &BlobRef) -> String;
}

// ─── Classifier ──────────────────────────────────────────────────────────────

pub trait Classifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Candidates for the stored image, highest confidence first.
  fn classify<'a>(
    &'a self,
    blob: &'a BlobRef,
  ) -> impl Future<Output = Result<Vec<CandidateLabel>, Self::Error>> + Send + 'a;
}
