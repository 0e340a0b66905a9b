//! Reply composition: turns outcomes and summaries into reply items.
//!
//! Every composed reply ends with an item carrying the quick-reply menu, so
//! the user always has a way back into the bot's commands.

use serde::{Deserialize, Serialize};

use crate::{
  aggregate::{Summary, goal_reached},
  command::{HISTORY_TRIGGER, RECOMMENDED_TRIGGER},
};

// ─── Reply items ─────────────────────────────────────────────────────────────

/// A clickable button that re-sends `text` as a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReplyAction {
  pub label: String,
  pub text:  String,
}

impl QuickReplyAction {
  /// An action whose button label and injected text are the same.
  pub fn echo(text: &str) -> Self {
    Self { label: text.to_owned(), text: text.to_owned() }
  }
}

/// One message of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyItem {
  pub text:        String,
  pub quick_reply: Option<Vec<QuickReplyAction>>,
}

impl ReplyItem {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: text.into(), quick_reply: None }
  }

  pub fn with_menu(text: impl Into<String>, menu: Vec<QuickReplyAction>) -> Self {
    Self { text: text.into(), quick_reply: Some(menu) }
  }
}

/// The menu attached to every reply. The history button only appears once the
/// user has at least one observation.
pub fn quick_reply_menu(has_history: bool) -> Vec<QuickReplyAction> {
  let mut menu = vec![QuickReplyAction::echo(RECOMMENDED_TRIGGER)];
  if has_history {
    menu.push(QuickReplyAction::echo(HISTORY_TRIGGER));
  }
  menu
}

// ─── Composer ────────────────────────────────────────────────────────────────

/// Labels suggested when the user asks where to take photos.
pub const DEFAULT_RECOMMENDED_LABELS: [&str; 5] = [
  "成瀬記念講堂",
  "七十年館の食堂メニュー表",
  "成瀬記念館分館（旧成瀬仁蔵住宅）",
  "成瀬記念館",
  "百年館",
];

pub const DEFAULT_GOAL_POINT: i64 = 30;

pub const NO_HISTORY: &str = "まだ何も写真をもらってないよ！";

/// Builds the reply for each branch of the event router.
#[derive(Debug, Clone)]
pub struct Composer {
  pub goal:               i64,
  pub recommended_labels: Vec<String>,
}

impl Default for Composer {
  fn default() -> Self {
    Self {
      goal:               DEFAULT_GOAL_POINT,
      recommended_labels: DEFAULT_RECOMMENDED_LABELS
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
  }
}

impl Composer {
  pub fn new(goal: i64, recommended_labels: Vec<String>) -> Self {
    Self { goal, recommended_labels }
  }

  /// Reply to an image whose top label was recognised.
  pub fn recognized(
    &self,
    display_name: &str,
    label: &str,
    confidence: f32,
    score: i64,
    label_message: Option<&str>,
    has_history: bool,
  ) -> Vec<ReplyItem> {
    let mut items = vec![ReplyItem::text(format!(
      "この画像は{display_name}さんがキャンパスで撮った{label}ってところかな？ \
       (信頼度: {confidence:.2}%)\n{score}ポイント獲得！"
    ))];
    if let Some(message) = label_message {
      items.push(ReplyItem::text(message));
    }
    items.push(ReplyItem::with_menu(
      "もっといろんな場所の写真が見たいな✨",
      quick_reply_menu(has_history),
    ));
    items
  }

  /// Reply to an image with no recognised label.
  pub fn unrecognized(&self, encouragement: &str, has_history: bool) -> Vec<ReplyItem> {
    vec![ReplyItem::with_menu(encouragement, quick_reply_menu(has_history))]
  }

  /// Reply listing the recommended photo spots in declared order.
  pub fn recommended(&self, display_name: &str, has_history: bool) -> Vec<ReplyItem> {
    let mut text =
      format!("今回{display_name}さんに撮って欲しいオススメの場所はこちら！");
    for label in &self.recommended_labels {
      text.push_str("\n・");
      text.push_str(label);
    }
    vec![ReplyItem::with_menu(text, quick_reply_menu(has_history))]
  }

  /// Reply listing the user's discovered labels and point total.
  pub fn history(
    &self,
    display_name: &str,
    summary: &Summary,
    has_history: bool,
  ) -> Vec<ReplyItem> {
    let menu = quick_reply_menu(has_history);
    if summary.is_empty() {
      return vec![ReplyItem::with_menu(NO_HISTORY, menu)];
    }

    let mut text =
      format!("{display_name}さんからもらった画像で判定できた場所はこちら！");
    for label in &summary.distinct_labels {
      text.push_str("\n・");
      text.push_str(label);
    }
    text.push_str(&format!(
      "\n\n現在の{display_name}さんの合計ポイントは{}点だよ。",
      summary.total_score
    ));
    if goal_reached(summary.total_score, self.goal) {
      text.push_str(&format!(
        "\nわぁ！{}ポイントをこえたね！\nたくさん写真を送ってくれてありがとう✨",
        self.goal
      ));
    }
    vec![ReplyItem::with_menu(text, menu)]
  }

  /// Reply to any other text: ask for a photo.
  pub fn prompt(&self, display_name: &str, has_history: bool) -> Vec<ReplyItem> {
    vec![
      ReplyItem::text(format!("{display_name}さん、画像を送ってほしいな！！")),
      ReplyItem::with_menu("画像を判別するよ！", quick_reply_menu(has_history)),
    ]
  }
}
