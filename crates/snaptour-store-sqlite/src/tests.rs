//! Integration tests for `SqliteStore` against an in-memory database.

use snaptour_core::{
  aggregate::summarize,
  record::{InteractionRecord, LabelDefinition, NewObservation},
  service::GameStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn interaction(user_id: &str, timestamp: i64, text: Option<&str>) -> InteractionRecord {
  InteractionRecord {
    user_id: user_id.into(),
    timestamp,
    display_name: "花子".into(),
    message_text: text.map(str::to_owned),
    image_url: None,
  }
}

// ─── Interactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_list_interactions() {
  let s = store().await;
  s.upsert_interaction(interaction("U1", 100, Some("hello"))).await.unwrap();
  s.upsert_interaction(interaction("U1", 200, Some("again"))).await.unwrap();
  s.upsert_interaction(interaction("U2", 150, Some("other"))).await.unwrap();

  let records = s.list_interactions("U1").await.unwrap();
  assert_eq!(records.len(), 2);
  // Newest first.
  assert_eq!(records[0].timestamp, 200);
  assert_eq!(records[1].timestamp, 100);
}

#[tokio::test]
async fn same_key_overwrites() {
  let s = store().await;
  s.upsert_interaction(interaction("U1", 100, Some("first"))).await.unwrap();

  let mut second = interaction("U1", 100, None);
  second.image_url = Some("https://bucket.s3.amazonaws.com/U1/x.jpg".into());
  s.upsert_interaction(second.clone()).await.unwrap();

  let records = s.list_interactions("U1").await.unwrap();
  assert_eq!(records, vec![second]);
}

#[tokio::test]
async fn list_interactions_unknown_user_is_empty() {
  let s = store().await;
  assert!(s.list_interactions("nobody").await.unwrap().is_empty());
}

// ─── Labels ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_label() {
  let s = store().await;
  let def = LabelDefinition {
    label:   "成瀬記念講堂".into(),
    message: Some("歴史ある講堂だよ".into()),
    score:   10,
  };
  s.put_label(def.clone()).await.unwrap();

  assert_eq!(s.get_label("成瀬記念講堂").await.unwrap(), Some(def));
}

#[tokio::test]
async fn get_missing_label_returns_none() {
  let s = store().await;
  assert!(s.get_label("百年館").await.unwrap().is_none());
}

#[tokio::test]
async fn put_label_replaces_existing() {
  let s = store().await;
  s.put_label(LabelDefinition { label: "百年館".into(), message: None, score: 5 })
    .await
    .unwrap();
  s.put_label(LabelDefinition { label: "百年館".into(), message: None, score: 8 })
    .await
    .unwrap();

  let labels = s.list_labels().await.unwrap();
  assert_eq!(labels.len(), 1);
  assert_eq!(labels[0].score, 8);
}

// ─── Observations ────────────────────────────────────────────────────────────

#[tokio::test]
async fn observations_are_appended_not_merged() {
  let s = store().await;
  s.record_observation(NewObservation::new("U1", "A", 5)).await.unwrap();
  s.record_observation(NewObservation::new("U1", "B", 3)).await.unwrap();
  s.record_observation(NewObservation::new("U1", "A", 5)).await.unwrap();

  let rows = s.observations("U1").await.unwrap();
  let labels: Vec<&str> = rows.iter().map(|o| o.label.as_str()).collect();
  assert_eq!(labels, vec!["A", "B", "A"]);

  let summary = summarize(&rows);
  assert_eq!(summary.distinct_labels, vec!["A", "B"]);
  assert_eq!(summary.total_score, 13);
}

#[tokio::test]
async fn observations_are_scoped_to_user() {
  let s = store().await;
  s.record_observation(NewObservation::new("U1", "A", 5)).await.unwrap();
  s.record_observation(NewObservation::new("U2", "B", 3)).await.unwrap();

  let rows = s.observations("U2").await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].label, "B");
  assert!(s.observations("U3").await.unwrap().is_empty());
}

#[tokio::test]
async fn recorded_observation_roundtrips() {
  let s = store().await;
  let recorded = s
    .record_observation(NewObservation::new("U1", "成瀬記念館", 7))
    .await
    .unwrap();

  let rows = s.observations("U1").await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].observation_id, recorded.observation_id);
  assert_eq!(rows[0].score, 7);
  assert_eq!(
    rows[0].recorded_at.timestamp_micros(),
    recorded.recorded_at.timestamp_micros()
  );
}

#[tokio::test]
async fn reopening_file_store_keeps_data() {
  let dir = std::env::temp_dir().join(format!("snaptour-test-{}", uuid::Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.record_observation(NewObservation::new("U1", "A", 1)).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.observations("U1").await.unwrap().len(), 1);

  std::fs::remove_dir_all(&dir).ok();
}
