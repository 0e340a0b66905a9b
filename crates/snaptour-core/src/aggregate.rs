//! Reduction of a user's observation history into a score summary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::Observation;

/// The derived view of one user's history. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  /// Every label recognised at least once, in first-seen order.
  pub distinct_labels: Vec<String>,
  /// Sum of all observation scores, repeats included.
  pub total_score:     i64,
}

impl Summary {
  pub fn is_empty(&self) -> bool { self.distinct_labels.is_empty() }
}

/// Collapse `(label, score)` pairs into a [`Summary`].
///
/// Labels are deduplicated for display; scores are not, so a label seen three
/// times contributes its score three times.
pub fn aggregate_history<I, L>(observations: I) -> Summary
where
  I: IntoIterator<Item = (L, i64)>,
  L: AsRef<str>,
{
  let mut seen = HashSet::new();
  let mut summary = Summary::default();

  for (label, score) in observations {
    let label = label.as_ref();
    if seen.insert(label.to_owned()) {
      summary.distinct_labels.push(label.to_owned());
    }
    summary.total_score = summary.total_score.saturating_add(score);
  }

  summary
}

/// Convenience wrapper over [`aggregate_history`] for stored rows.
pub fn summarize(observations: &[Observation]) -> Summary {
  aggregate_history(observations.iter().map(|o| (o.label.as_str(), o.score)))
}

/// Whether `total_score` has reached `goal` (inclusive).
pub fn goal_reached(total_score: i64, goal: i64) -> bool { total_score >= goal }
