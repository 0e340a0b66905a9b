//! Interpretation of the classifier's ranked candidates for one image.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

/// One candidate returned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLabel {
  pub name:       String,
  /// Percentage in `0.0..=100.0`.
  pub confidence: f32,
}

impl CandidateLabel {
  pub fn new(name: impl Into<String>, confidence: f32) -> Self {
    Self { name: name.into(), confidence }
  }
}

/// Replies used when nothing in the image was recognised.
pub const ENCOURAGEMENTS: [&str; 3] = [
  "インスタ映えする素敵な場所だね😍",
  "くんくん...素敵なところだね🌈",
  "すごくいい写真だね✨\n僕もこの写真の場所に行ってみたいな！",
];

/// What the image pipeline should do with a classification result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  /// The top-ranked candidate; an observation must be recorded for it.
  Recognized { label: String, confidence: f32 },
  /// No candidates; nothing is recorded.
  Unrecognized { encouragement: &'static str },
}

impl Outcome {
  pub fn is_recognized(&self) -> bool { matches!(self, Self::Recognized { .. }) }
}

/// Pick the recognised label, or draw an encouragement from `rng`.
///
/// `labels` is trusted to be sorted by confidence, highest first, so the
/// first entry always wins.
pub fn interpret<R>(labels: &[CandidateLabel], rng: &mut R) -> Outcome
where
  R: Rng + ?Sized,
{
  match labels.first() {
    Some(top) => Outcome::Recognized {
      label:      top.name.clone(),
      confidence: top.confidence,
    },
    None => Outcome::Unrecognized {
      encouragement: ENCOURAGEMENTS
        .choose(rng)
        .copied()
        .unwrap_or(ENCOURAGEMENTS[0]),
    },
  }
}
