use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHARTS_DIR: &str = "charts";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("invalid server URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("server URL must be http or https, got '{0}'")]
  UnsupportedScheme(String),

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

/// Where the analysis server lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the server; endpoint paths are resolved against it
  pub base_url: Url,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
    }
  }
}

impl ClientConfig {
  pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
    let mut base_url = Url::parse(base_url)?;
    if !matches!(base_url.scheme(), "http" | "https") {
      return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
    }
    // Without a trailing slash `join` would replace the last path segment.
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }
    Ok(Self { base_url, timeout_secs })
  }

  pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
    Ok(self.base_url.join(path.trim_start_matches('/'))?)
  }
}

/// Default target for saved downloads: the platform download folder, else
/// the working directory.
pub fn default_download_dir() -> PathBuf {
  dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
