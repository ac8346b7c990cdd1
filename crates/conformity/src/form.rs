//! Form state for the two submissions.
//!
//! A [`FileInput`] is the CLI's stand-in for an `<input type="file">`: it
//! either holds a selected path or is empty.

use std::path::{Path, PathBuf};

use crate::error::FlowError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileInput {
  selected: Option<PathBuf>,
}

impl FileInput {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn with_file(path: impl Into<PathBuf>) -> Self {
    Self { selected: Some(path.into()) }
  }

  pub fn selected(&self) -> Option<&Path> {
    self.selected.as_deref()
  }

  pub fn is_empty(&self) -> bool {
    self.selected.is_none()
  }

  pub fn clear(&mut self) {
    self.selected = None;
  }
}

impl From<Option<PathBuf>> for FileInput {
  fn from(selected: Option<PathBuf>) -> Self {
    Self { selected }
  }
}

/// A selected file read into memory, ready to become a multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
  pub file_name: String,
  pub bytes: Vec<u8>,
}

impl SelectedFile {
  pub async fn read(path: &Path) -> Result<Self, FlowError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| FlowError::unreadable(path, e))?;
    let file_name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "upload".to_string());
    Ok(Self { file_name, bytes })
  }
}

/// `uploadForm`: transcript (`vttFile`) plus curriculum (`curriculumFile`).
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
  pub transcript: FileInput,
  pub curriculum: FileInput,
}

impl UploadForm {
  pub fn new(transcript: FileInput, curriculum: FileInput) -> Self {
    Self { transcript, curriculum }
  }

  /// Both selected paths, or `MissingFiles` if either is absent.
  pub fn require_files(&self) -> Result<(&Path, &Path), FlowError> {
    match (self.transcript.selected(), self.curriculum.selected()) {
      (Some(transcript), Some(curriculum)) => Ok((transcript, curriculum)),
      _ => Err(FlowError::MissingFiles),
    }
  }
}

/// `excelConverterForm`: a single spreadsheet (`excelFile`).
#[derive(Debug, Clone, Default)]
pub struct ConvertForm {
  pub spreadsheet: FileInput,
}

impl ConvertForm {
  pub fn new(spreadsheet: FileInput) -> Self {
    Self { spreadsheet }
  }

  pub fn require_file(&self) -> Result<&Path, FlowError> {
    self.spreadsheet.selected().ok_or(FlowError::MissingFile)
  }
}
