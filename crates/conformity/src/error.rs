use std::path::PathBuf;
use thiserror::Error;

use crate::messages;

/// Every way a submission can end without a result.
///
/// Variants fall into three families: validation (nothing was sent),
/// server-reported (a non-2xx reply), and local failures on either side of
/// the request (`Transport` before a reply arrived, `Processing` after).
#[derive(Error, Debug)]
pub enum FlowError {
  #[error("transcript and curriculum files are both required")]
  MissingFiles,

  #[error("no file selected")]
  MissingFile,

  #[error("cannot read {path}: {source}")]
  Unreadable {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("a submission is already in flight")]
  Busy,

  #[error("server rejected the request: {message}")]
  Server { message: String },

  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("could not process the response: {message}")]
  Processing { message: String },
}

impl FlowError {
  pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Unreadable { path: path.into(), source }
  }

  pub fn server(message: impl Into<String>) -> Self {
    Self::Server { message: message.into() }
  }

  pub fn processing(message: impl Into<String>) -> Self {
    Self::Processing { message: message.into() }
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, Self::MissingFiles | Self::MissingFile | Self::Unreadable { .. })
  }

  /// Text shown to the user for this error. `processing_prefix` is the
  /// flow-specific lead-in for post-response failures.
  pub fn alert_text(&self, processing_prefix: &str) -> String {
    match self {
      Self::MissingFiles => messages::MISSING_FILES.to_string(),
      Self::MissingFile => messages::MISSING_FILE.to_string(),
      Self::Unreadable { path, .. } => format!("{}: {}", messages::UNREADABLE, path.display()),
      Self::Busy => messages::BUSY.to_string(),
      Self::Server { message } => message.clone(),
      Self::Transport(_) => messages::TRANSPORT.to_string(),
      Self::Processing { message } => format!("{processing_prefix}: {message}"),
    }
  }
}
