//! LINE Messaging API client, the production [`Messaging`] backend.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use snaptour_core::{reply::ReplyItem, service::Messaging};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.line.me";
pub const DEFAULT_DATA_API_BASE: &str = "https://api-data.line.me";

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("LINE API returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },
}

/// Connection settings for the LINE API.
#[derive(Clone)]
pub struct LineConfig {
  pub access_token:  String,
  pub api_base:      String,
  /// Host serving message content (images).
  pub data_api_base: String,
}

/// Async HTTP client for the LINE Messaging API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct LineClient {
  client: Client,
  config: LineConfig,
}

impl LineClient {
  pub fn new(config: LineConfig) -> Result<Self, Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
  }

  /// Turn non-2xx responses into [`Error::Status`], keeping the body.
  async fn check(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status { status, body })
  }
}

impl Messaging for LineClient {
  type Error = Error;

  /// `GET /v2/bot/profile/{userId}`
  async fn display_name(&self, user_id: &str) -> Result<String, Error> {
    let resp = self
      .client
      .get(Self::url(&self.config.api_base, &format!("/v2/bot/profile/{user_id}")))
      .bearer_auth(&self.config.access_token)
      .send()
      .await?;
    let profile: Profile = Self::check(resp).await?.json().await?;
    Ok(profile.display_name)
  }

  /// `GET /v2/bot/message/{messageId}/content`
  async fn message_content(&self, message_id: &str) -> Result<Vec<u8>, Error> {
    let resp = self
      .client
      .get(Self::url(
        &self.config.data_api_base,
        &format!("/v2/bot/message/{message_id}/content"),
      ))
      .bearer_auth(&self.config.access_token)
      .send()
      .await?;
    Ok(Self::check(resp).await?.bytes().await?.to_vec())
  }

  /// `POST /v2/bot/message/reply`
  async fn reply(&self, reply_token: &str, items: &[ReplyItem]) -> Result<(), Error> {
    let body = ReplyRequest { reply_token, messages: to_line_messages(items) };
    tracing::debug!(reply_token, messages = items.len(), "sending reply");

    let resp = self
      .client
      .post(Self::url(&self.config.api_base, "/v2/bot/message/reply"))
      .bearer_auth(&self.config.access_token)
      .json(&body)
      .send()
      .await?;
    let resp = Self::check(resp).await?;
    tracing::debug!(status = %resp.status(), "reply accepted");
    Ok(())
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
  display_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
  reply_token: &'a str,
  messages:    Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TextMessage<'a> {
  #[serde(rename = "type")]
  kind:        &'static str,
  text:        &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  quick_reply: Option<QuickReply<'a>>,
}

#[derive(Debug, Serialize)]
struct QuickReply<'a> {
  items: Vec<QuickReplyButton<'a>>,
}

#[derive(Debug, Serialize)]
struct QuickReplyButton<'a> {
  #[serde(rename = "type")]
  kind:   &'static str,
  action: MessageAction<'a>,
}

#[derive(Debug, Serialize)]
struct MessageAction<'a> {
  #[serde(rename = "type")]
  kind:  &'static str,
  label: &'a str,
  text:  &'a str,
}

pub(crate) fn to_line_messages(items: &[ReplyItem]) -> Vec<TextMessage<'_>> {
  items
    .iter()
    .map(|item| TextMessage {
      kind:        "text",
      text:        &item.text,
      quick_reply: item.quick_reply.as_ref().map(|actions| QuickReply {
        items: actions
          .iter()
          .map(|a| QuickReplyButton {
            kind:   "action",
            action: MessageAction { kind: "message", label: &a.label, text: &a.text },
          })
          .collect(),
      }),
    })
    .collect()
}
