//! [`SqliteStore`]: the SQLite implementation of [`GameStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use snaptour_core::{
  record::{InteractionRecord, LabelDefinition, NewObservation, Observation},
  service::GameStore,
};

use crate::{
  Result,
  encode::{RawInteraction, RawLabel, RawObservation, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SnapTour game store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── GameStore impl ──────────────────────────────────────────────────────────

impl GameStore for SqliteStore {
  type Error = crate::Error;

  // ── Interactions ──────────────────────────────────────────────────────────

  async fn upsert_interaction(&self, record: InteractionRecord) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO interactions
             (user_id, timestamp, display_name, message_text, image_url)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id, timestamp) DO UPDATE SET
             display_name = excluded.display_name,
             message_text = excluded.message_text,
             image_url    = excluded.image_url",
          rusqlite::params![
            record.user_id,
            record.timestamp,
            record.display_name,
            record.message_text,
            record.image_url,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_interactions(&self, user_id: &str) -> Result<Vec<InteractionRecord>> {
    let user_id = user_id.to_owned();

    let raws: Vec<RawInteraction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, timestamp, display_name, message_text, image_url
           FROM interactions
           WHERE user_id = ?1
           ORDER BY timestamp DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawInteraction::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawInteraction::into_record).collect())
  }

  // ── Label definitions ─────────────────────────────────────────────────────

  async fn get_label(&self, label: &str) -> Result<Option<LabelDefinition>> {
    let label = label.to_owned();

    let raw: Option<RawLabel> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT label, message, score FROM labels WHERE label = ?1",
            rusqlite::params![label],
            RawLabel::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawLabel::into_definition))
  }

  async fn list_labels(&self) -> Result<Vec<LabelDefinition>> {
    let raws: Vec<RawLabel> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT label, message, score FROM labels ORDER BY label")?;
        let rows = stmt
          .query_map([], RawLabel::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawLabel::into_definition).collect())
  }

  async fn put_label(&self, definition: LabelDefinition) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO labels (label, message, score) VALUES (?1, ?2, ?3)
           ON CONFLICT (label) DO UPDATE SET
             message = excluded.message,
             score   = excluded.score",
          rusqlite::params![definition.label, definition.message, definition.score],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Observations (append-only) ────────────────────────────────────────────

  async fn record_observation(&self, input: NewObservation) -> Result<Observation> {
    let observation = Observation {
      observation_id: Uuid::new_v4(),
      user_id:        input.user_id,
      label:          input.label,
      score:          input.score,
      recorded_at:    Utc::now(),
    };

    let id_str  = encode_uuid(observation.observation_id);
    let user_id = observation.user_id.clone();
    let label   = observation.label.clone();
    let score   = observation.score;
    let at_str  = encode_dt(observation.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO observations (observation_id, user_id, label, score, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_id, label, score, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(observation)
  }

  async fn observations(&self, user_id: &str) -> Result<Vec<Observation>> {
    let user_id = user_id.to_owned();

    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT observation_id, user_id, label, score, recorded_at
           FROM observations
           WHERE user_id = ?1
           ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawObservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }
}
