#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use conformity::model::{LectureStats, TopicMatch};
use conformity::view::{Notifier, ResultsView};

pub const ANALYSIS_BODY: &str = r#"{
  "keywords": ["python", "pandas", "numpy"],
  "keyword_frequencies": {"python": 12, "pandas": 7, "numpy": 3},
  "curriculum_match": {
    "overall_match": 62.5,
    "topic_matches": [
      {"topic": "A", "match_percentage": 25, "matching_keywords": []},
      {"topic": "B", "match_percentage": 50, "matching_keywords": ["pandas"]},
      {"topic": "C", "match_percentage": 85, "matching_keywords": ["python", "numpy"]}
    ]
  },
  "risk_matrix": {"low_risk": ["C"], "medium_risk": ["B"], "high_risk": ["A"]},
  "avg_sentence_length": 9.5,
  "total_words": 410,
  "unique_words": 188
}"#;

/// Records what each view role was given.
#[derive(Default)]
pub struct MockView {
  pub shown: Mutex<bool>,
  pub score: Mutex<Option<String>>,
  pub keywords: Mutex<Vec<String>>,
  pub topics: Mutex<Vec<TopicMatch>>,
}

impl ResultsView for MockView {
  fn show_results(&self) {
    *self.shown.lock().unwrap() = true;
  }

  fn set_score(&self, text: &str) {
    *self.score.lock().unwrap() = Some(text.to_string());
  }

  fn set_keywords(&self, keywords: &[String]) {
    *self.keywords.lock().unwrap() = keywords.to_vec();
  }

  fn set_topic_matches(&self, matches: &[TopicMatch]) {
    *self.topics.lock().unwrap() = matches.to_vec();
  }

  fn set_lecture_stats(&self, _stats: &LectureStats) {}
}

#[derive(Default)]
pub struct MockNotifier {
  pub alerts: Mutex<Vec<String>>,
}

impl MockNotifier {
  pub fn alerts(&self) -> Vec<String> {
    self.alerts.lock().unwrap().clone()
  }
}

impl Notifier for MockNotifier {
  fn alert(&self, message: &str) {
    self.alerts.lock().unwrap().push(message.to_string());
  }
}

/// A base URL nothing is listening on.
pub fn dead_server_url() -> String {
  let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let port = listener.local_addr().unwrap().port();
  drop(listener);
  format!("http://127.0.0.1:{port}")
}

pub fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
  let path = dir.path().join(name);
  std::fs::write(&path, contents).unwrap();
  path
}
