//! The event router: answers each message event of a webhook batch.
//!
//! Events are handled one after another in delivery order. Failures of any
//! collaborator are logged and degrade the reply; nothing here returns an
//! error to the caller.

use chrono::{DateTime, Duration, Utc};
use snaptour_core::{
  Command, Outcome, Summary,
  aggregate::summarize,
  interpret,
  record::{InteractionRecord, LabelDefinition, NewObservation},
  reply::ReplyItem,
  service::{BlobRef, BlobStore, Classifier, GameStore, Messaging},
};

use crate::{
  AppState,
  event::{Event, Inbound, InboundMessage},
};

/// Used when the profile lookup fails.
pub const FALLBACK_DISPLAY_NAME: &str = "ゲスト";

/// Handle every event of one webhook delivery, in order.
pub async fn handle_events<S, M, B, C>(state: &AppState<S, M, B, C>, events: Vec<Event>)
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  for event in events {
    let kind = event.kind.clone();
    match event.into_inbound() {
      Some(inbound) => handle_inbound(state, inbound, Utc::now()).await,
      None => tracing::debug!(%kind, "skipping event without a supported message"),
    }
  }
}

/// Handle one message event as of `now`.
pub async fn handle_inbound<S, M, B, C>(
  state: &AppState<S, M, B, C>,
  inbound: Inbound,
  now: DateTime<Utc>,
) where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  let Inbound { reply_token, user_id, message } = inbound;
  let display_name = resolve_display_name(state, &user_id).await;

  let mut record = InteractionRecord {
    user_id:      user_id.clone(),
    timestamp:    interaction_timestamp(state, &user_id, now),
    display_name: display_name.clone(),
    message_text: None,
    image_url:    None,
  };

  match message {
    InboundMessage::Image { message_id } => {
      tracing::info!(%user_id, %message_id, "image received");
      let (items, image_url) =
        image_reply(state, &user_id, &display_name, &message_id, now).await;
      send_reply(state, &reply_token, &items).await;
      record.image_url = image_url;
      save_interaction(state, record).await;
    }
    InboundMessage::Text { text } => {
      tracing::info!(%user_id, %text, "text received");
      record.message_text = Some(text.clone());
      save_interaction(state, record).await;
      let items = text_reply(state, &user_id, &display_name, &text).await;
      send_reply(state, &reply_token, &items).await;
    }
  }
}

// ─── Branches ────────────────────────────────────────────────────────────────

/// Store, classify and score an image. Returns the reply and the stored
/// image's URL, if it was stored.
async fn image_reply<S, M, B, C>(
  state: &AppState<S, M, B, C>,
  user_id: &str,
  display_name: &str,
  message_id: &str,
  now: DateTime<Utc>,
) -> (Vec<ReplyItem>, Option<String>)
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  let blob = store_image(state, user_id, message_id, now).await;
  let candidates = match &blob {
    Some(blob) => match state.classifier.classify(blob).await {
      Ok(candidates) => candidates,
      Err(e) => {
        tracing::warn!(%user_id, error = %e, "classification failed");
        Vec::new()
      }
    },
    None => Vec::new(),
  };

  let outcome = {
    let mut rng = state.rng.lock().unwrap_or_else(|p| p.into_inner());
    interpret(&candidates, &mut *rng)
  };

  let items = match outcome {
    Outcome::Recognized { label, confidence } => {
      tracing::info!(%user_id, %label, confidence, "image classified");
      let definition = lookup_label(state, &label).await;
      let score = definition.as_ref().map_or(0, |d| d.score);

      if let Err(e) = state
        .store
        .record_observation(NewObservation::new(user_id, label.as_str(), score))
        .await
      {
        tracing::error!(%user_id, %label, error = %e, "failed to record observation");
      }

      let has_history = !load_summary(state, user_id).await.is_empty();
      state.composer.recognized(
        display_name,
        &label,
        confidence,
        score,
        definition.as_ref().and_then(|d| d.message.as_deref()),
        has_history,
      )
    }
    Outcome::Unrecognized { encouragement } => {
      tracing::info!(%user_id, "image classified as none of the known labels");
      let has_history = !load_summary(state, user_id).await.is_empty();
      state.composer.unrecognized(encouragement, has_history)
    }
  };

  (items, blob.map(|b| state.blobs.url(&b)))
}

async fn text_reply<S, M, B, C>(
  state: &AppState<S, M, B, C>,
  user_id: &str,
  display_name: &str,
  text: &str,
) -> Vec<ReplyItem>
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  let summary = load_summary(state, user_id).await;
  let has_history = !summary.is_empty();

  match Command::parse(text) {
    Command::RecommendedLocations => state.composer.recommended(display_name, has_history),
    Command::History => state.composer.history(display_name, &summary, has_history),
    Command::Other => state.composer.prompt(display_name, has_history),
  }
}

// ─── Collaborator calls with degraded fallbacks ──────────────────────────────

async fn resolve_display_name<S, M, B, C>(state: &AppState<S, M, B, C>, user_id: &str) -> String
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  match state.messaging.display_name(user_id).await {
    Ok(name) => name,
    Err(e) => {
      tracing::warn!(%user_id, error = %e, "profile lookup failed");
      FALLBACK_DISPLAY_NAME.to_owned()
    }
  }
}

/// Key of the interaction record for an event arriving at `now`: its Unix
/// second, bumped past the last key given to the same user so that events in
/// one second get distinct records.
fn interaction_timestamp<S, M, B, C>(
  state: &AppState<S, M, B, C>,
  user_id: &str,
  now: DateTime<Utc>,
) -> i64 {
  let mut last_seen = state.last_seen.lock().unwrap_or_else(|p| p.into_inner());
  let timestamp = match last_seen.get(user_id) {
    Some(&last) if last >= now.timestamp() => last + 1,
    _ => now.timestamp(),
  };
  last_seen.insert(user_id.to_owned(), timestamp);
  timestamp
}

/// Object key for an image: the user's directory, the JST time it arrived
/// and the message id, e.g. `U1/24-07-01-21-00-00-m1.jpg`.
pub fn image_key(user_id: &str, message_id: &str, now: DateTime<Utc>) -> String {
  let jst = now + Duration::hours(9);
  format!("{user_id}/{}-{message_id}.jpg", jst.format("%y-%m-%d-%H-%M-%S"))
}

async fn store_image<S, M, B, C>(
  state: &AppState<S, M, B, C>,
  user_id: &str,
  message_id: &str,
  now: DateTime<Utc>,
) -> Option<BlobRef>
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  let data = match state.messaging.message_content(message_id).await {
    Ok(data) => data,
    Err(e) => {
      tracing::warn!(%user_id, %message_id, error = %e, "failed to fetch image content");
      return None;
    }
  };

  let key = image_key(user_id, message_id, now);
  match state.blobs.put(&key, data).await {
    Ok(blob) => {
      tracing::info!(%user_id, %key, "image stored");
      Some(blob)
    }
    Err(e) => {
      tracing::error!(%user_id, %key, error = %e, "failed to store image");
      None
    }
  }
}

async fn lookup_label<S, M, B, C>(
  state: &AppState<S, M, B, C>,
  label: &str,
) -> Option<LabelDefinition>
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  match state.store.get_label(label).await {
    Ok(Some(definition)) => Some(definition),
    Ok(None) => {
      tracing::warn!(%label, "label has no definition; scoring 0");
      None
    }
    Err(e) => {
      tracing::error!(%label, error = %e, "label lookup failed");
      None
    }
  }
}

/// The user's aggregated history; empty if the lookup fails.
async fn load_summary<S, M, B, C>(state: &AppState<S, M, B, C>, user_id: &str) -> Summary
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  match state.store.observations(user_id).await {
    Ok(rows) => summarize(&rows),
    Err(e) => {
      tracing::warn!(%user_id, error = %e, "history lookup failed");
      Summary::default()
    }
  }
}

async fn save_interaction<S, M, B, C>(state: &AppState<S, M, B, C>, record: InteractionRecord)
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  let user_id = record.user_id.clone();
  let timestamp = record.timestamp;
  if let Err(e) = state.store.upsert_interaction(record).await {
    tracing::error!(%user_id, timestamp, error = %e, "failed to save interaction");
  }
}

async fn send_reply<S, M, B, C>(state: &AppState<S, M, B, C>, reply_token: &str, items: &[ReplyItem])
where
  S: GameStore,
  M: Messaging,
  B: BlobStore,
  C: Classifier,
{
  match state.messaging.reply(reply_token, items).await {
    Ok(()) => tracing::info!(messages = items.len(), "reply sent"),
    Err(e) => tracing::error!(error = %e, "failed to send reply"),
  }
}
