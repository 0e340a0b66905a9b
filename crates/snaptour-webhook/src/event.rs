//! Webhook payload types as delivered by the LINE platform.
//!
//! Only message events carry a reply token; everything else (follows,
//! unfollows, postbacks) is parsed loosely and then skipped.

use serde::Deserialize;

/// Body of a webhook request.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
  #[serde(default)]
  pub destination: Option<String>,
  #[serde(default)]
  pub events:      Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  #[serde(rename = "type")]
  pub kind:        String,
  #[serde(default)]
  pub reply_token: Option<String>,
  #[serde(default)]
  pub source:      Option<Source>,
  #[serde(default)]
  pub message:     Option<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
  #[serde(default)]
  pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
  Text { text: String },
  Image { id: String },
  /// Stickers, video, audio, location, files.
  #[serde(other)]
  Unsupported,
}

// ─── Normalised form ─────────────────────────────────────────────────────────

/// A message event the router knows how to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
  pub reply_token: String,
  pub user_id:     String,
  pub message:     InboundMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
  Text { text: String },
  Image { message_id: String },
}

impl Event {
  /// `None` for anything that cannot or should not be replied to.
  pub fn into_inbound(self) -> Option<Inbound> {
    let reply_token = self.reply_token?;
    let user_id = self.source?.user_id?;
    let message = match self.message? {
      Message::Text { text } => InboundMessage::Text { text },
      Message::Image { id } => InboundMessage::Image { message_id: id },
      Message::Unsupported => return None,
    };
    Some(Inbound { reply_token, user_id, message })
  }
}
