//! Filesystem-backed [`BlobStore`].
//!
//! Blobs are written beneath `root` using the key as a relative path. The
//! public URL is derived from the bucket name and storage domain, matching the
//! layout of a bucket synced from that directory.

use std::path::{Component, Path, PathBuf};

use snaptour_core::service::{BlobRef, BlobStore};
use thiserror::Error;

pub const DEFAULT_STORAGE_DOMAIN: &str = "s3.amazonaws.com";

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid blob key: {0:?}")]
  InvalidKey(String),
}

#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root:   PathBuf,
  bucket: String,
  domain: String,
}

impl FsBlobStore {
  pub fn new(
    root: impl Into<PathBuf>,
    bucket: impl Into<String>,
    domain: impl Into<String>,
  ) -> Self {
    Self { root: root.into(), bucket: bucket.into(), domain: domain.into() }
  }

  /// Resolve `key` beneath the root, refusing absolute paths and `..`.
  fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
    let relative = Path::new(key);
    let plain = relative
      .components()
      .all(|c| matches!(c, Component::Normal(_)));
    if key.is_empty() || !plain {
      return Err(Error::InvalidKey(key.to_owned()));
    }
    Ok(self.root.join(relative))
  }
}

impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn put(&self, key: &str, data: Vec<u8>) -> Result<BlobRef, Error> {
    let path = self.path_for(key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, data).await?;
    Ok(BlobRef { bucket: self.bucket.clone(), key: key.to_owned() })
  }

  fn url(&self, blob: &BlobRef) -> String {
    format!("https://{}.{}/{}", blob.bucket, self.domain, blob.key)
  }
}
