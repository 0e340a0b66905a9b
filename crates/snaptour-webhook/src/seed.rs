//! Label definition import from a TOML file.
//!
//! ```toml
//! [[labels]]
//! label   = "成瀬記念講堂"
//! message = "入学式もここで行われるんだよ"
//! score   = 10
//! ```

use serde::Deserialize;
use snaptour_core::{record::LabelDefinition, service::GameStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid label file: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Deserialize)]
struct LabelFile {
  #[serde(default)]
  labels: Vec<LabelDefinition>,
}

/// Parse `source` and upsert every label into `store`. Returns the number of
/// labels written.
pub async fn import_labels<S>(store: &S, source: &str) -> Result<usize, Error>
where
  S: GameStore,
{
  let file: LabelFile = toml::from_str(source)?;
  let count = file.labels.len();

  for definition in file.labels {
    tracing::info!(label = %definition.label, score = definition.score, "importing label");
    store
      .put_label(definition)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
  }

  Ok(count)
}

#[cfg(test)]
mod tests {
  use snaptour_store_sqlite::SqliteStore;

  use super::*;

  #[tokio::test]
  async fn imports_labels() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let source = r#"
      [[labels]]
      label = "成瀬記念講堂"
      message = "歴史ある講堂だよ"
      score = 10

      [[labels]]
      label = "百年館"
      score = 5
    "#;

    assert_eq!(import_labels(&store, source).await.unwrap(), 2);

    let hall = store.get_label("成瀬記念講堂").await.unwrap().unwrap();
    assert_eq!(hall.score, 10);
    assert_eq!(hall.message.as_deref(), Some("歴史ある講堂だよ"));

    let centennial = store.get_label("百年館").await.unwrap().unwrap();
    assert_eq!(centennial.score, 5);
    assert!(centennial.message.is_none());
  }

  #[tokio::test]
  async fn rejects_malformed_file() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = import_labels(&store, "[[labels]]\nscore = \"ten\"").await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
  }
}
