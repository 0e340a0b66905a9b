//! Recognised text commands, i.e. the quick-reply menu triggers.

/// Text sent by the "recommended locations" quick-reply button.
pub const RECOMMENDED_TRIGGER: &str = "撮って欲しい場所は？";

/// Text sent by the "history" quick-reply button.
pub const HISTORY_TRIGGER: &str = "判別履歴";

/// A text message, classified by its exact content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  RecommendedLocations,
  History,
  /// Anything else; answered with a prompt to send a photo.
  Other,
}

impl Command {
  pub fn parse(text: &str) -> Self {
    match text {
      RECOMMENDED_TRIGGER => Self::RecommendedLocations,
      HISTORY_TRIGGER => Self::History,
      _ => Self::Other,
    }
  }
}
