//! Test doubles for the messaging, blob and classifier collaborators.

use std::{
  collections::HashMap,
  path::PathBuf,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use rand::{SeedableRng, rngs::StdRng};
use snaptour_core::{
  interpret::CandidateLabel,
  record::{InteractionRecord, LabelDefinition, NewObservation, Observation},
  reply::{Composer, ReplyItem},
  service::{BlobRef, BlobStore, Classifier, GameStore, Messaging},
};
use snaptour_store_sqlite::SqliteStore;
use thiserror::Error;

use crate::{
  AppState, ServerConfig,
  event::{Event, Inbound, InboundMessage, Message, Source},
};

#[derive(Debug, Error)]
#[error("fake failure: {0}")]
pub struct FakeError(&'static str);

// ─── Messaging ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeMessaging {
  replies:       Mutex<Vec<(String, Vec<ReplyItem>)>>,
  attempts:      AtomicUsize,
  fail_profile:  AtomicBool,
  fail_content:  AtomicBool,
  fail_replies:  AtomicBool,
}

impl FakeMessaging {
  pub fn fail_profile(&self) { self.fail_profile.store(true, Ordering::SeqCst) }

  pub fn fail_content(&self) { self.fail_content.store(true, Ordering::SeqCst) }

  pub fn fail_replies(&self) { self.fail_replies.store(true, Ordering::SeqCst) }

  pub fn replies(&self) -> Vec<(String, Vec<ReplyItem>)> {
    self.replies.lock().unwrap().clone()
  }

  pub fn reply_attempts(&self) -> usize { self.attempts.load(Ordering::SeqCst) }
}

impl Messaging for FakeMessaging {
  type Error = FakeError;

  async fn display_name(&self, _user_id: &str) -> Result<String, FakeError> {
    if self.fail_profile.load(Ordering::SeqCst) {
      return Err(FakeError("profile"));
    }
    Ok("花子".to_owned())
  }

  async fn message_content(&self, _message_id: &str) -> Result<Vec<u8>, FakeError> {
    if self.fail_content.load(Ordering::SeqCst) {
      return Err(FakeError("content"));
    }
    Ok(vec![0xFF, 0xD8, 0xFF, 0xE0])
  }

  async fn reply(&self, reply_token: &str, items: &[ReplyItem]) -> Result<(), FakeError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    if self.fail_replies.load(Ordering::SeqCst) {
      return Err(FakeError("reply"));
    }
    self
      .replies
      .lock()
      .unwrap()
      .push((reply_token.to_owned(), items.to_vec()));
    Ok(())
  }
}

// ─── Blobs ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeBlobs {
  blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeBlobs {
  pub fn contains(&self, key: &str) -> bool { self.blobs.lock().unwrap().contains_key(key) }
}

impl BlobStore for FakeBlobs {
  type Error = FakeError;

  async fn put(&self, key: &str, data: Vec<u8>) -> Result<BlobRef, FakeError> {
    self.blobs.lock().unwrap().insert(key.to_owned(), data);
    Ok(BlobRef { bucket: "photos".into(), key: key.to_owned() })
  }

  fn url(&self, blob: &BlobRef) -> String {
    format!("https://{}.s3.amazonaws.com/{}", blob.bucket, blob.key)
  }
}

// ─── Classifier ──────────────────────────────────────────────────────────────

pub struct FakeClassifier {
  labels: Vec<CandidateLabel>,
  fail:   AtomicBool,
}

impl FakeClassifier {
  pub fn new(labels: Vec<CandidateLabel>) -> Self {
    Self { labels, fail: AtomicBool::new(false) }
  }

  pub fn fail(&self) { self.fail.store(true, Ordering::SeqCst) }
}

impl Classifier for FakeClassifier {
  type Error = FakeError;

  async fn classify(&self, _blob: &BlobRef) -> Result<Vec<CandidateLabel>, FakeError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(FakeError("classify"));
    }
    Ok(self.labels.clone())
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A [`GameStore`] whose every call fails.
pub struct FailingStore;

impl GameStore for FailingStore {
  type Error = FakeError;

  async fn upsert_interaction(&self, _record: InteractionRecord) -> Result<(), FakeError> {
    Err(FakeError("upsert_interaction"))
  }

  async fn list_interactions(&self, _user_id: &str) -> Result<Vec<InteractionRecord>, FakeError> {
    Err(FakeError("list_interactions"))
  }

  async fn get_label(&self, _label: &str) -> Result<Option<LabelDefinition>, FakeError> {
    Err(FakeError("get_label"))
  }

  async fn list_labels(&self) -> Result<Vec<LabelDefinition>, FakeError> {
    Err(FakeError("list_labels"))
  }

  async fn put_label(&self, _definition: LabelDefinition) -> Result<(), FakeError> {
    Err(FakeError("put_label"))
  }

  async fn record_observation(&self, _input: NewObservation) -> Result<Observation, FakeError> {
    Err(FakeError("record_observation"))
  }

  async fn observations(&self, _user_id: &str) -> Result<Vec<Observation>, FakeError> {
    Err(FakeError("observations"))
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

pub type TestState<S = SqliteStore> = AppState<S, FakeMessaging, FakeBlobs, FakeClassifier>;

pub fn config() -> ServerConfig {
  ServerConfig {
    host:                 "127.0.0.1".into(),
    port:                 8080,
    store_path:           PathBuf::from(":memory:"),
    channel_access_token: "token".into(),
    channel_secret:       None,
    line_api_base:        crate::line::DEFAULT_API_BASE.into(),
    line_data_api_base:   crate::line::DEFAULT_DATA_API_BASE.into(),
    bucket:               "photos".into(),
    storage_domain:       crate::blob::DEFAULT_STORAGE_DOMAIN.into(),
    blob_dir:             PathBuf::from("blobs"),
    classifier_endpoint:  "http://127.0.0.1:9/detect".into(),
    classifier_model:     "arn:model/1".into(),
    min_confidence:       None,
    goal_point:           30,
    recommended_labels:   Composer::default().recommended_labels,
  }
}

/// An [`AppState`] over an in-memory store and fakes, with handles kept for
/// inspection.
pub struct Harness<S = SqliteStore> {
  pub state:      TestState<S>,
  pub messaging:  Arc<FakeMessaging>,
  pub blobs:      Arc<FakeBlobs>,
  pub classifier: Arc<FakeClassifier>,
}

impl<S> Harness<S> {
  pub fn with_store(store: S, labels: Vec<CandidateLabel>, config: ServerConfig) -> Self {
    let messaging = Arc::new(FakeMessaging::default());
    let blobs = Arc::new(FakeBlobs::default());
    let classifier = Arc::new(FakeClassifier::new(labels));

    let state = AppState::new(
      Arc::new(store),
      messaging.clone(),
      blobs.clone(),
      classifier.clone(),
      config,
      StdRng::seed_from_u64(0),
    );
    Self { state, messaging, blobs, classifier }
  }

  /// The only reply sent so far.
  pub fn single_reply(&self) -> (String, Vec<ReplyItem>) {
    let mut replies = self.messaging.replies();
    assert_eq!(replies.len(), 1, "expected exactly one reply: {replies:?}");
    replies.remove(0)
  }
}

impl Harness<FailingStore> {
  pub fn failing_store(labels: Vec<CandidateLabel>) -> Self {
    Self::with_store(FailingStore, labels, config())
  }
}

impl Harness {
  pub async fn new(labels: Vec<CandidateLabel>) -> Self {
    Self::with_config(labels, config()).await
  }

  pub async fn with_config(labels: Vec<CandidateLabel>, config: ServerConfig) -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Self::with_store(store, labels, config)
  }

  pub async fn define_label(&self, label: &str, score: i64, message: Option<&str>) {
    self
      .state
      .store
      .put_label(LabelDefinition {
        label: label.into(),
        message: message.map(str::to_owned),
        score,
      })
      .await
      .unwrap();
  }

  pub async fn observe(&self, user_id: &str, label: &str, score: i64) {
    self
      .state
      .store
      .record_observation(NewObservation::new(user_id, label, score))
      .await
      .unwrap();
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

pub fn text_event(reply_token: &str, user_id: &str, text: &str) -> Inbound {
  Inbound {
    reply_token: reply_token.into(),
    user_id:     user_id.into(),
    message:     InboundMessage::Text { text: text.into() },
  }
}

pub fn image_event(reply_token: &str, user_id: &str, message_id: &str) -> Inbound {
  Inbound {
    reply_token: reply_token.into(),
    user_id:     user_id.into(),
    message:     InboundMessage::Image { message_id: message_id.into() },
  }
}

fn raw_event(reply_token: &str, user_id: &str, message: Message) -> Event {
  Event {
    kind:        "message".into(),
    reply_token: Some(reply_token.into()),
    source:      Some(Source { user_id: Some(user_id.into()) }),
    message:     Some(message),
  }
}

pub fn raw_text_event(reply_token: &str, user_id: &str, text: &str) -> Event {
  raw_event(reply_token, user_id, Message::Text { text: text.into() })
}

pub fn raw_image_event(reply_token: &str, user_id: &str, message_id: &str) -> Event {
  raw_event(reply_token, user_id, Message::Image { id: message_id.into() })
}
