use std::sync::Arc;

use crate::charts::{build_charts, ChartRenderer};
use crate::client::AnalysisApi;
use crate::error::FlowError;
use crate::flows::InFlight;
use crate::form::{SelectedFile, UploadForm};
use crate::messages;
use crate::model::AnalysisResult;
use crate::view::{format_percentage, Notifier, ResultsView};

/// Transcript + curriculum upload, rendered into the results view.
pub struct UploadFlow {
  api: Arc<dyn AnalysisApi>,
  view: Arc<dyn ResultsView>,
  charts: Arc<dyn ChartRenderer>,
  notifier: Arc<dyn Notifier>,
  in_flight: InFlight,
}

impl UploadFlow {
  pub fn new(
    api: Arc<dyn AnalysisApi>,
    view: Arc<dyn ResultsView>,
    charts: Arc<dyn ChartRenderer>,
    notifier: Arc<dyn Notifier>,
  ) -> Self {
    Self { api, view, charts, notifier, in_flight: InFlight::default() }
  }

  pub fn is_submitting(&self) -> bool {
    self.in_flight.is_active()
  }

  /// Run one submission. Any error has already been alerted when this
  /// returns.
  pub async fn submit(&self, form: &UploadForm) -> Result<AnalysisResult, FlowError> {
    let result = self.run(form).await;
    if let Err(error) = &result {
      self.report(error);
    }
    result
  }

  async fn run(&self, form: &UploadForm) -> Result<AnalysisResult, FlowError> {
    let _guard = self.in_flight.try_begin().ok_or(FlowError::Busy)?;

    let (transcript_path, curriculum_path) = form.require_files()?;
    let transcript = SelectedFile::read(transcript_path).await?;
    let curriculum = SelectedFile::read(curriculum_path).await?;

    tracing::info!(
      transcript = %transcript.file_name,
      curriculum = %curriculum.file_name,
      "submitting files for analysis"
    );
    let result = self.api.upload(transcript, curriculum).await?;

    self.render(&result)?;
    Ok(result)
  }

  /// Fill every result panel and draw the three charts.
  pub fn render(&self, result: &AnalysisResult) -> Result<(), FlowError> {
    self.view.show_results();
    self.view.set_score(&format_percentage(result.curriculum_match.overall_match));
    self.view.set_keywords(&result.keywords);
    self.view.set_topic_matches(&result.curriculum_match.topic_matches);
    self.view.set_lecture_stats(&result.stats);

    for (mount, chart) in build_charts(result) {
      self.charts.render(mount, &chart).map_err(|e| FlowError::processing(e.to_string()))?;
    }
    Ok(())
  }

  fn report(&self, error: &FlowError) {
    match error {
      FlowError::Transport(e) => tracing::error!(error = %e, "upload request failed"),
      FlowError::Busy => tracing::warn!("upload ignored: previous submission still running"),
      e if e.is_validation() => tracing::info!(error = %e, "upload not sent"),
      e => tracing::warn!(error = %e, "upload failed"),
    }
    self.notifier.alert(&error.alert_text(messages::RENDER_FAILED));
  }
}
