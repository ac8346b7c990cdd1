//! Typed shape of the `/upload` reply.
//!
//! The server's JSON is parsed into these types and then checked with
//! [`AnalysisResult::validate`] before anything is rendered.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

use crate::error::FlowError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResult {
  pub keywords: Vec<String>,
  #[serde(deserialize_with = "ordered_frequencies")]
  pub keyword_frequencies: Vec<KeywordFrequency>,
  pub curriculum_match: CurriculumMatch,
  pub risk_matrix: RiskMatrix,
  #[serde(flatten)]
  pub stats: LectureStats,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurriculumMatch {
  pub overall_match: f64,
  pub topic_matches: Vec<TopicMatch>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicMatch {
  pub topic: String,
  pub match_percentage: f64,
  #[serde(default)]
  pub matching_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RiskMatrix {
  pub low_risk: Vec<String>,
  pub medium_risk: Vec<String>,
  pub high_risk: Vec<String>,
}

impl RiskMatrix {
  /// Bucket sizes in low, medium, high order.
  pub fn counts(&self) -> [usize; 3] {
    [self.low_risk.len(), self.medium_risk.len(), self.high_risk.len()]
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeywordFrequency {
  pub keyword: String,
  pub count: u64,
}

/// Optional transcript statistics the server includes alongside the match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LectureStats {
  #[serde(default)]
  pub avg_sentence_length: Option<f64>,
  #[serde(default)]
  pub total_words: Option<u64>,
  #[serde(default)]
  pub unique_words: Option<u64>,
}

impl LectureStats {
  pub fn is_empty(&self) -> bool {
    self.avg_sentence_length.is_none() && self.total_words.is_none() && self.unique_words.is_none()
  }
}

impl AnalysisResult {
  /// Parse and validate a reply body.
  pub fn from_slice(body: &[u8]) -> Result<Self, FlowError> {
    let result: AnalysisResult = serde_json::from_slice(body)
      .map_err(|e| FlowError::processing(format!("malformed analysis result: {e}")))?;
    result.validate()?;
    Ok(result)
  }

  pub fn validate(&self) -> Result<(), FlowError> {
    check_percentage("overall_match", self.curriculum_match.overall_match)?;
    for topic in &self.curriculum_match.topic_matches {
      check_percentage(&format!("match_percentage of '{}'", topic.topic), topic.match_percentage)?;
    }
    if let Some(avg) = self.stats.avg_sentence_length {
      if !avg.is_finite() || avg < 0.0 {
        return Err(FlowError::processing(format!("avg_sentence_length is invalid: {avg}")));
      }
    }
    Ok(())
  }
}

fn check_percentage(field: &str, value: f64) -> Result<(), FlowError> {
  if value.is_finite() && (0.0..=100.0).contains(&value) {
    Ok(())
  } else {
    Err(FlowError::processing(format!("{field} must be within 0..=100, got {value}")))
  }
}

/// Reads a `{keyword: count}` object without losing the server's key order.
fn ordered_frequencies<'de, D>(deserializer: D) -> Result<Vec<KeywordFrequency>, D::Error>
where
  D: Deserializer<'de>,
{
  struct OrderedVisitor;

  impl<'de> Visitor<'de> for OrderedVisitor {
    type Value = Vec<KeywordFrequency>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("a map of keyword to non-negative count")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
      A: MapAccess<'de>,
    {
      let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
      while let Some((keyword, count)) = map.next_entry::<String, u64>()? {
        out.push(KeywordFrequency { keyword, count });
      }
      Ok(out)
    }
  }

  deserializer.deserialize_map(OrderedVisitor)
}
