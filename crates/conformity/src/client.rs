//! HTTP client for the analysis server.
//!
//! A thin reqwest wrapper. It sorts every failure into the [`FlowError`]
//! families so the flows only have to decide what to show.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::error::FlowError;
use crate::form::SelectedFile;
use crate::messages;
use crate::model::AnalysisResult;

pub const UPLOAD_PATH: &str = "/upload";
pub const CONVERT_PATH: &str = "/convert-excel-to-json";

/// The two server endpoints the flows talk to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisApi: Send + Sync {
  /// POST `{vtt_file, curriculum_file}` to `/upload`.
  async fn upload(
    &self,
    transcript: SelectedFile,
    curriculum: SelectedFile,
  ) -> Result<AnalysisResult, FlowError>;

  /// POST `{file}` to `/convert-excel-to-json` and return the raw body.
  async fn convert(&self, spreadsheet: SelectedFile) -> Result<Vec<u8>, FlowError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: Option<String>,
}

pub struct HttpAnalysisClient {
  client: Client,
  upload_url: Url,
  convert_url: Url,
}

impl HttpAnalysisClient {
  pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
    let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

    Ok(Self {
      client,
      upload_url: config.endpoint(UPLOAD_PATH)?,
      convert_url: config.endpoint(CONVERT_PATH)?,
    })
  }

  async fn post(&self, url: &Url, form: Form) -> Result<Response, FlowError> {
    tracing::debug!(%url, "sending multipart request");
    let response = self.client.post(url.clone()).multipart(form).send().await?;
    tracing::debug!(%url, status = %response.status(), "received response");
    Ok(response)
  }
}

fn file_part(file: SelectedFile) -> Part {
  Part::bytes(file.bytes).file_name(file.file_name)
}

/// Turn a non-2xx reply into `FlowError::Server`, preferring the body's
/// `error` field and otherwise the endpoint's fallback text.
async fn server_error(response: Response, fallback: &str) -> FlowError {
  let status = response.status();
  let message = match response.text().await {
    Ok(body) => serde_json::from_str::<ErrorBody>(&body)
      .ok()
      .and_then(|body| body.error)
      .filter(|message| !message.is_empty()),
    Err(e) => {
      tracing::warn!(%status, error = %e, "could not read error body");
      None
    }
  };

  tracing::warn!(%status, message = message.as_deref().unwrap_or("<none>"), "server rejected request");
  FlowError::server(message.unwrap_or_else(|| fallback.to_string()))
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
  async fn upload(
    &self,
    transcript: SelectedFile,
    curriculum: SelectedFile,
  ) -> Result<AnalysisResult, FlowError> {
    let form =
      Form::new().part("vtt_file", file_part(transcript)).part("curriculum_file", file_part(curriculum));

    let response = self.post(&self.upload_url, form).await?;
    if !response.status().is_success() {
      return Err(server_error(response, messages::UPLOAD_FALLBACK).await);
    }

    let body = response.bytes().await?;
    AnalysisResult::from_slice(&body)
  }

  async fn convert(&self, spreadsheet: SelectedFile) -> Result<Vec<u8>, FlowError> {
    let form = Form::new().part("file", file_part(spreadsheet));

    let response = self.post(&self.convert_url, form).await?;
    if !response.status().is_success() {
      return Err(server_error(response, messages::CONVERT_FALLBACK).await);
    }

    Ok(response.bytes().await?.to_vec())
  }
}
