use std::path::PathBuf;
use std::sync::Arc;

use crate::client::AnalysisApi;
use crate::download::{download, DownloadSink, CONVERTED_FILE_NAME};
use crate::error::FlowError;
use crate::flows::InFlight;
use crate::form::{ConvertForm, SelectedFile};
use crate::messages;
use crate::view::Notifier;

/// Spreadsheet → JSON conversion, saved as `curriculum.json`.
pub struct ConvertFlow {
  api: Arc<dyn AnalysisApi>,
  sink: Arc<dyn DownloadSink>,
  notifier: Arc<dyn Notifier>,
  in_flight: InFlight,
}

impl ConvertFlow {
  pub fn new(
    api: Arc<dyn AnalysisApi>,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
  ) -> Self {
    Self { api, sink, notifier, in_flight: InFlight::default() }
  }

  pub fn is_submitting(&self) -> bool {
    self.in_flight.is_active()
  }

  /// Run one submission and return where the download was saved. The form's
  /// file input is cleared only after a successful save.
  pub async fn submit(&self, form: &mut ConvertForm) -> Result<PathBuf, FlowError> {
    match self.run(form).await {
      Ok(saved) => {
        self.notifier.alert(messages::CONVERT_DONE);
        Ok(saved)
      }
      Err(error) => {
        self.report(&error);
        Err(error)
      }
    }
  }

  async fn run(&self, form: &mut ConvertForm) -> Result<PathBuf, FlowError> {
    let _guard = self.in_flight.try_begin().ok_or(FlowError::Busy)?;

    let spreadsheet = SelectedFile::read(form.require_file()?).await?;
    tracing::info!(file = %spreadsheet.file_name, "submitting spreadsheet for conversion");
    let body = self.api.convert(spreadsheet).await?;

    let saved = download(self.sink.as_ref(), body, CONVERTED_FILE_NAME)
      .map_err(|e| FlowError::processing(e.to_string()))?;

    form.spreadsheet.clear();
    Ok(saved)
  }

  fn report(&self, error: &FlowError) {
    match error {
      FlowError::Transport(e) => tracing::error!(error = %e, "conversion request failed"),
      FlowError::Busy => tracing::warn!("conversion ignored: previous submission still running"),
      e if e.is_validation() => tracing::info!(error = %e, "conversion not sent"),
      e => tracing::warn!(error = %e, "conversion failed"),
    }
    self.notifier.alert(&error.alert_text(messages::DOWNLOAD_FAILED));
  }
}
