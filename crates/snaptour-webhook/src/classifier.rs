//! HTTP client for a custom-label image classifier.
//!
//! Requests and responses follow the `DetectCustomLabels` JSON shape: the
//! image is referenced by bucket and object name, and candidates come back in
//! `CustomLabels`, highest confidence first.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use snaptour_core::{
  interpret::CandidateLabel,
  service::{BlobRef, Classifier},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("classifier returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },
}

#[derive(Clone)]
pub struct HttpClassifier {
  client:         Client,
  endpoint:       String,
  model:          String,
  min_confidence: Option<f32>,
}

impl HttpClassifier {
  pub fn new(
    endpoint: impl Into<String>,
    model: impl Into<String>,
    min_confidence: Option<f32>,
  ) -> Result<Self, Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
      model: model.into(),
      min_confidence,
    })
  }
}

impl Classifier for HttpClassifier {
  type Error = Error;

  async fn classify(&self, blob: &BlobRef) -> Result<Vec<CandidateLabel>, Error> {
    let request = DetectRequest {
      project_version_arn: &self.model,
      image:               ImageRef {
        s3_object: S3Object { bucket: &blob.bucket, name: &blob.key },
      },
      min_confidence:      self.min_confidence,
    };

    let resp = self.client.post(&self.endpoint).json(&request).send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }

    let detected: DetectResponse = resp.json().await?;
    Ok(
      detected
        .custom_labels
        .into_iter()
        .map(|l| CandidateLabel { name: l.name, confidence: l.confidence })
        .collect(),
    )
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectRequest<'a> {
  project_version_arn: &'a str,
  image:               ImageRef<'a>,
  #[serde(skip_serializing_if = "Option::is_none")]
  min_confidence:      Option<f32>,
}

#[derive(Serialize)]
struct ImageRef<'a> {
  #[serde(rename = "S3Object")]
  s3_object: S3Object<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct S3Object<'a> {
  bucket: &'a str,
  name:   &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectResponse {
  #[serde(default)]
  custom_labels: Vec<CustomLabel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CustomLabel {
  name:       String,
  confidence: f32,
}
