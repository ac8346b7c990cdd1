//! Saving a response body as a downloaded file.
//!
//! Mirrors the browser's object-URL dance: the body is staged behind a
//! temporary [`ObjectUrl`], saved under a download name, and the URL is
//! released. [`ObjectUrlGuard`] makes the release happen on every path.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

pub const CONVERTED_FILE_NAME: &str = "curriculum.json";

#[derive(Error, Debug)]
pub enum DownloadError {
  #[error("failed to stage download: {0}")]
  Stage(#[source] std::io::Error),

  #[error("failed to save {path}: {source}")]
  Save {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("object URL {0} is not live")]
  UnknownUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
  pub fn generate() -> Self {
    Self(format!("blob:conformity/{}", Uuid::new_v4()))
  }

}

impl std::fmt::Display for ObjectUrl {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

pub trait DownloadSink: Send + Sync {
  /// Stage `bytes` and hand back a handle to them.
  fn create_object_url(&self, bytes: Vec<u8>) -> Result<ObjectUrl, DownloadError>;
  /// Save the staged bytes under `file_name`; returns where they landed.
  fn save(&self, url: &ObjectUrl, file_name: &str) -> Result<PathBuf, DownloadError>;
  /// Release the staged bytes. Unknown URLs are ignored.
  fn revoke_object_url(&self, url: &ObjectUrl);
}

/// A live object URL, revoked when dropped.
pub struct ObjectUrlGuard<'a> {
  sink: &'a dyn DownloadSink,
  url: ObjectUrl,
}

impl<'a> ObjectUrlGuard<'a> {
  pub fn acquire(sink: &'a dyn DownloadSink, bytes: Vec<u8>) -> Result<Self, DownloadError> {
    let url = sink.create_object_url(bytes)?;
    tracing::debug!(%url, "object URL created");
    Ok(Self { sink, url })
  }

  pub fn url(&self) -> &ObjectUrl {
    &self.url
  }
}

impl Drop for ObjectUrlGuard<'_> {
  fn drop(&mut self) {
    self.sink.revoke_object_url(&self.url);
    tracing::debug!(url = %self.url, "object URL revoked");
  }
}

/// Stage, save, release.
pub fn download(
  sink: &dyn DownloadSink,
  bytes: Vec<u8>,
  file_name: &str,
) -> Result<PathBuf, DownloadError> {
  let guard = ObjectUrlGuard::acquire(sink, bytes)?;
  sink.save(guard.url(), file_name)
}

/// Stages bodies in temp files and saves them into a download directory.
pub struct FileDownloadSink {
  dir: PathBuf,
  staged: Mutex<HashMap<ObjectUrl, NamedTempFile>>,
}

impl FileDownloadSink {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into(), staged: Mutex::new(HashMap::new()) }
  }

  pub fn live_urls(&self) -> usize {
    self.staged().len()
  }

  fn staged(&self) -> std::sync::MutexGuard<'_, HashMap<ObjectUrl, NamedTempFile>> {
    match self.staged.lock() {
      Ok(staged) => staged,
      Err(poisoned) => poisoned.into_inner(),
    }
  }
}

fn numbered_name(file_name: &str, n: u32) -> String {
  if n == 0 {
    return file_name.to_string();
  }
  match file_name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
    _ => format!("{file_name} ({n})"),
  }
}

/// Create the first free file in `dir`: `name.ext`, then `name (1).ext`,
/// `name (2).ext`, ... The file is created exclusively, so an existing file
/// is never truncated.
pub fn create_unique(dir: &Path, file_name: &str) -> io::Result<(PathBuf, File)> {
  let mut n = 0;
  loop {
    let candidate = dir.join(numbered_name(file_name, n));
    match OpenOptions::new().write(true).create_new(true).open(&candidate) {
      Ok(file) => return Ok((candidate, file)),
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
      Err(e) => return Err(e),
    }
  }
}

impl DownloadSink for FileDownloadSink {
  fn create_object_url(&self, bytes: Vec<u8>) -> Result<ObjectUrl, DownloadError> {
    let mut staged = NamedTempFile::new().map_err(DownloadError::Stage)?;
    staged.write_all(&bytes).map_err(DownloadError::Stage)?;
    staged.flush().map_err(DownloadError::Stage)?;

    let url = ObjectUrl::generate();
    self.staged().insert(url.clone(), staged);
    Ok(url)
  }

  fn save(&self, url: &ObjectUrl, file_name: &str) -> Result<PathBuf, DownloadError> {
    let staged = self.staged();
    let source = staged.get(url).ok_or_else(|| DownloadError::UnknownUrl(url.to_string()))?;

    fs::create_dir_all(&self.dir)
      .map_err(|source| DownloadError::Save { path: self.dir.clone(), source })?;
    let (target, mut file) = create_unique(&self.dir, file_name)
      .map_err(|source| DownloadError::Save { path: self.dir.join(file_name), source })?;
    let mut staged_file = source.reopen().map_err(DownloadError::Stage)?;
    io::copy(&mut staged_file, &mut file)
      .map_err(|source| DownloadError::Save { path: target.clone(), source })?;

    tracing::info!(path = %target.display(), "download saved");
    Ok(target)
  }

  fn revoke_object_url(&self, url: &ObjectUrl) {
    self.staged().remove(url);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  /// Records calls; `save` can be told to fail.
  #[derive(Default)]
  struct RecordingSink {
    created: Mutex<Vec<ObjectUrl>>,
    revoked: Mutex<Vec<ObjectUrl>>,
    fail_save: bool,
  }

  impl DownloadSink for RecordingSink {
    fn create_object_url(&self, _bytes: Vec<u8>) -> Result<ObjectUrl, DownloadError> {
      let url = ObjectUrl::generate();
      self.created.lock().unwrap().push(url.clone());
      Ok(url)
    }

    fn save(&self, _url: &ObjectUrl, file_name: &str) -> Result<PathBuf, DownloadError> {
      if self.fail_save {
        return Err(DownloadError::Save {
          path: PathBuf::from(file_name),
          source: std::io::Error::other("disk full"),
        });
      }
      Ok(PathBuf::from(file_name))
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
      self.revoked.lock().unwrap().push(url.clone());
    }
  }

  #[test]
  fn test_download_revokes_the_url_it_created() {
    let sink = RecordingSink::default();
    let saved = download(&sink, b"{}".to_vec(), CONVERTED_FILE_NAME).unwrap();

    assert_eq!(saved, PathBuf::from(CONVERTED_FILE_NAME));
    let created = sink.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(*sink.revoked.lock().unwrap(), *created);
  }

  #[test]
  fn test_failed_save_still_revokes() {
    let sink = RecordingSink { fail_save: true, ..Default::default() };
    let result = download(&sink, b"{}".to_vec(), CONVERTED_FILE_NAME);

    assert!(result.is_err());
    assert_eq!(*sink.revoked.lock().unwrap(), *sink.created.lock().unwrap());
  }

  #[test]
  fn test_file_sink_saves_and_releases_staging() {
    let temp_dir = TempDir::new().unwrap();
    let sink = FileDownloadSink::new(temp_dir.path());

    let saved = download(&sink, b"[1, 2]".to_vec(), CONVERTED_FILE_NAME).unwrap();

    assert_eq!(saved, temp_dir.path().join(CONVERTED_FILE_NAME));
    assert_eq!(fs::read(&saved).unwrap(), b"[1, 2]");
    assert_eq!(sink.live_urls(), 0);
  }

  #[test]
  fn test_file_sink_does_not_overwrite_existing_download() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONVERTED_FILE_NAME), "old").unwrap();
    let sink = FileDownloadSink::new(temp_dir.path());

    let saved = download(&sink, b"new".to_vec(), CONVERTED_FILE_NAME).unwrap();

    assert_eq!(saved, temp_dir.path().join("curriculum (1).json"));
    assert_eq!(fs::read_to_string(temp_dir.path().join(CONVERTED_FILE_NAME)).unwrap(), "old");
  }

  #[test]
  fn test_save_of_revoked_url_fails() {
    let temp_dir = TempDir::new().unwrap();
    let sink = FileDownloadSink::new(temp_dir.path());
    let url = sink.create_object_url(b"x".to_vec()).unwrap();
    sink.revoke_object_url(&url);

    assert!(matches!(sink.save(&url, CONVERTED_FILE_NAME), Err(DownloadError::UnknownUrl(_))));
  }

  #[test]
  fn test_create_unique_without_extension() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes"), "x").unwrap();
    let (path, _file) = create_unique(temp_dir.path(), "notes").unwrap();
    assert_eq!(path, temp_dir.path().join("notes (1)"));
  }

  #[test]
  fn test_create_unique_reserves_each_name_it_returns() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONVERTED_FILE_NAME), "kept").unwrap();

    let (first, _a) = create_unique(temp_dir.path(), CONVERTED_FILE_NAME).unwrap();
    let (second, _b) = create_unique(temp_dir.path(), CONVERTED_FILE_NAME).unwrap();

    assert_eq!(first, temp_dir.path().join("curriculum (1).json"));
    assert_eq!(second, temp_dir.path().join("curriculum (2).json"));
    assert_eq!(fs::read_to_string(temp_dir.path().join(CONVERTED_FILE_NAME)).unwrap(), "kept");
  }

  #[test]
  fn test_file_sink_never_truncates_an_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONVERTED_FILE_NAME), "old").unwrap();
    fs::write(temp_dir.path().join("curriculum (1).json"), "older").unwrap();
    let sink = FileDownloadSink::new(temp_dir.path());

    let saved = download(&sink, b"new".to_vec(), CONVERTED_FILE_NAME).unwrap();

    assert_eq!(saved, temp_dir.path().join("curriculum (2).json"));
    assert_eq!(fs::read_to_string(&saved).unwrap(), "new");
    assert_eq!(fs::read_to_string(temp_dir.path().join("curriculum (1).json")).unwrap(), "older");
  }
}
