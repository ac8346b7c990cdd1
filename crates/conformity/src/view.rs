//! Where results and alerts are shown.
//!
//! The flows never look anything up by element id; they are handed a
//! [`ResultsView`] and a [`Notifier`] and drive those roles directly.

use colored::*;
use std::io::Write;
use std::sync::Mutex;

use crate::charts::MatchBand;
use crate::model::{LectureStats, TopicMatch};

/// The result panels of the upload flow.
pub trait ResultsView: Send + Sync {
  /// Make the results section visible.
  fn show_results(&self);
  /// `conformityScore`
  fn set_score(&self, text: &str);
  /// `keywordsList`
  fn set_keywords(&self, keywords: &[String]);
  /// `curriculumMatch`
  fn set_topic_matches(&self, matches: &[TopicMatch]);
  fn set_lecture_stats(&self, stats: &LectureStats);
}

/// User-visible alerts.
pub trait Notifier: Send + Sync {
  fn alert(&self, message: &str);
}

/// Score text exactly as shown: shortest decimal form plus `%`.
pub fn format_percentage(value: f64) -> String {
  // -0.0 prints as "-0"
  let value = if value == 0.0 { 0.0 } else { value };
  format!("{value}%")
}

fn keyword_chip(keyword: &str) -> String {
  format!(" {keyword} ").on_blue().white().bold().to_string()
}

fn band_colored(text: &str, percentage: f64) -> ColoredString {
  match MatchBand::for_percentage(percentage) {
    MatchBand::Weak => text.red().bold(),
    MatchBand::Partial => text.yellow().bold(),
    MatchBand::Strong => text.green().bold(),
  }
}

/// Renders the result panels as text. Writes are serialized so two panels
/// never interleave.
pub struct TerminalView<W: Write + Send> {
  out: Mutex<W>,
}

impl TerminalView<std::io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }
}

impl<W: Write + Send> TerminalView<W> {
  pub fn new(out: W) -> Self {
    Self { out: Mutex::new(out) }
  }

  pub fn into_inner(self) -> W {
    match self.out.into_inner() {
      Ok(out) => out,
      Err(poisoned) => poisoned.into_inner(),
    }
  }

  fn emit(&self, text: &str) {
    let mut out = match self.out.lock() {
      Ok(out) => out,
      Err(poisoned) => poisoned.into_inner(),
    };
    if let Err(e) = writeln!(out, "{text}") {
      tracing::warn!(error = %e, "failed to write results");
    }
  }
}

impl<W: Write + Send> ResultsView for TerminalView<W> {
  fn show_results(&self) {
    self.emit(&format!("{}", "━━━ 분석 결과 ━━━".cyan().bold()));
  }

  fn set_score(&self, text: &str) {
    self.emit(&format!("{} {}", "정합성 점수:".bold(), text.bright_white().bold()));
  }

  fn set_keywords(&self, keywords: &[String]) {
    let chips: String = keywords.iter().map(|kw| keyword_chip(kw)).collect::<Vec<_>>().join(" ");
    self.emit(&format!("{}\n  {}", "주요 키워드:".bold(), chips));
  }

  fn set_topic_matches(&self, matches: &[TopicMatch]) {
    let mut lines = vec![format!("{}", "커리큘럼 매칭:".bold())];
    for m in matches {
      let pct = band_colored(&format_percentage(m.match_percentage), m.match_percentage);
      let mut line = format!("  {} {}", m.topic, pct);
      if !m.matching_keywords.is_empty() {
        line.push_str(&format!(" {}", format!("({})", m.matching_keywords.join(", ")).dimmed()));
      }
      lines.push(line);
    }
    self.emit(&lines.join("\n"));
  }

  fn set_lecture_stats(&self, stats: &LectureStats) {
    if stats.is_empty() {
      return;
    }
    let mut parts = Vec::new();
    if let Some(total) = stats.total_words {
      parts.push(format!("단어 수 {total}"));
    }
    if let Some(unique) = stats.unique_words {
      parts.push(format!("고유 단어 {unique}"));
    }
    if let Some(avg) = stats.avg_sentence_length {
      parts.push(format!("평균 문장 길이 {avg:.1}"));
    }
    self.emit(&format!("{} {}", "강의 통계:".bold(), parts.join(" · ").dimmed()));
  }
}

/// Prints alerts to stderr with a colored tag.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
  fn alert(&self, message: &str) {
    let prefix = format!("[{}]", "alert".yellow().bold());
    for line in message.lines() {
      eprintln!("{prefix} {line}");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plain_view() -> TerminalView<Vec<u8>> {
    colored::control::set_override(false);
    TerminalView::new(Vec::new())
  }

  fn output(view: TerminalView<Vec<u8>>) -> String {
    String::from_utf8(view.into_inner()).unwrap()
  }

  #[test]
  fn test_format_percentage_uses_shortest_form() {
    assert_eq!(format_percentage(85.0), "85%");
    assert_eq!(format_percentage(85.5), "85.5%");
    assert_eq!(format_percentage(0.0), "0%");
    assert_eq!(format_percentage(-0.0), "0%");
  }

  #[test]
  fn test_terminal_view_lists_topics_and_keywords() {
    let view = plain_view();
    view.set_score("42%");
    view.set_keywords(&["python".to_string(), "data".to_string()]);
    view.set_topic_matches(&[TopicMatch {
      topic: "변수".to_string(),
      match_percentage: 33.3,
      matching_keywords: vec!["python".to_string()],
    }]);

    let text = output(view);
    assert!(text.contains("42%"));
    assert!(text.contains(" python "));
    assert!(text.contains("변수 33.3%"));
    assert!(text.contains("(python)"));
  }

  #[test]
  fn test_empty_stats_print_nothing() {
    let view = plain_view();
    view.set_lecture_stats(&LectureStats::default());
    assert!(output(view).is_empty());
  }
}
