//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use snaptour_core::record::{InteractionRecord, LabelDefinition, Observation};
use uuid::Uuid;

use crate::{Error, Result};

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `interactions` row.
pub struct RawInteraction {
  pub user_id:      String,
  pub timestamp:    i64,
  pub display_name: String,
  pub message_text: Option<String>,
  pub image_url:    Option<String>,
}

impl RawInteraction {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      timestamp:    row.get(1)?,
      display_name: row.get(2)?,
      message_text: row.get(3)?,
      image_url:    row.get(4)?,
    })
  }

  pub fn into_record(self) -> InteractionRecord {
    InteractionRecord {
      user_id:      self.user_id,
      timestamp:    self.timestamp,
      display_name: self.display_name,
      message_text: self.message_text,
      image_url:    self.image_url,
    }
  }
}

/// Raw values read directly from a `labels` row.
pub struct RawLabel {
  pub label:   String,
  pub message: Option<String>,
  pub score:   i64,
}

impl RawLabel {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      label:   row.get(0)?,
      message: row.get(1)?,
      score:   row.get(2)?,
    })
  }

  pub fn into_definition(self) -> LabelDefinition {
    LabelDefinition { label: self.label, message: self.message, score: self.score }
  }
}

/// Raw strings read directly from an `observations` row.
pub struct RawObservation {
  pub observation_id: String,
  pub user_id:        String,
  pub label:          String,
  pub score:          i64,
  pub recorded_at:    String,
}

impl RawObservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      observation_id: row.get(0)?,
      user_id:        row.get(1)?,
      label:          row.get(2)?,
      score:          row.get(3)?,
      recorded_at:    row.get(4)?,
    })
  }

  pub fn into_observation(self) -> Result<Observation> {
    Ok(Observation {
      observation_id: decode_uuid(&self.observation_id)?,
      user_id:        self.user_id,
      label:          self.label,
      score:          self.score,
      recorded_at:    decode_dt(&self.recorded_at)?,
    })
  }
}
