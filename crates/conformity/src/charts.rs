//! Chart descriptions for the three result panels.
//!
//! Charts are plain serde values in Plotly's trace/layout vocabulary; a
//! [`ChartRenderer`] decides where they end up.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{AnalysisResult, KeywordFrequency, RiskMatrix, TopicMatch};

pub const RED: &str = "#ff4d4d";
pub const YELLOW: &str = "#ffd700";
pub const GREEN: &str = "#32cd32";
pub const KEYWORD_BAR: &str = "#4a90e2";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const RISK_LEVELS: [&str; 3] = ["낮음", "중간", "높음"];

/// Logical mount point a chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartMount {
  RiskMatrix,
  KeywordFrequency,
  CurriculumComparison,
}

impl ChartMount {
  pub fn id(self) -> &'static str {
    match self {
      ChartMount::RiskMatrix => "riskMatrix",
      ChartMount::KeywordFrequency => "keywordFrequency",
      ChartMount::CurriculumComparison => "curriculumComparison",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
  pub data: Vec<Trace>,
  pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
  Heatmap {
    x: Vec<String>,
    y: Vec<String>,
    z: Vec<Vec<usize>>,
    colorscale: String,
    reversescale: bool,
  },
  Bar {
    x: Vec<String>,
    y: Vec<f64>,
    marker: Marker,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
  pub color: MarkerColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
  Single(String),
  PerBar(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
  pub title: String,
  pub xaxis: Axis,
  pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tickangle: Option<i32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub range: Option<[f64; 2]>,
}

impl Axis {
  fn titled(title: &str) -> Self {
    Self { title: title.to_string(), tickangle: None, range: None }
  }
}

/// How well a curriculum topic is covered by the lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBand {
  Weak,
  Partial,
  Strong,
}

impl MatchBand {
  pub fn for_percentage(percentage: f64) -> Self {
    if percentage < 30.0 {
      MatchBand::Weak
    } else if percentage < 70.0 {
      MatchBand::Partial
    } else {
      MatchBand::Strong
    }
  }

  pub fn color(self) -> &'static str {
    match self {
      MatchBand::Weak => RED,
      MatchBand::Partial => YELLOW,
      MatchBand::Strong => GREEN,
    }
  }
}

pub fn risk_matrix_chart(risk: &RiskMatrix) -> Chart {
  let levels: Vec<String> = RISK_LEVELS.iter().map(|level| level.to_string()).collect();
  Chart {
    data: vec![Trace::Heatmap {
      x: levels.clone(),
      y: levels,
      z: vec![risk.counts().to_vec(), vec![0, 0, 0], vec![0, 0, 0]],
      colorscale: "RdYlGn".to_string(),
      reversescale: true,
    }],
    layout: Layout {
      title: "리스크 매트릭스".to_string(),
      xaxis: Axis::titled("발생 가능성"),
      yaxis: Axis::titled("영향도"),
    },
  }
}

pub fn keyword_frequency_chart(frequencies: &[KeywordFrequency]) -> Chart {
  Chart {
    data: vec![Trace::Bar {
      x: frequencies.iter().map(|f| f.keyword.clone()).collect(),
      y: frequencies.iter().map(|f| f.count as f64).collect(),
      marker: Marker { color: MarkerColor::Single(KEYWORD_BAR.to_string()) },
    }],
    layout: Layout {
      title: "키워드 빈도".to_string(),
      xaxis: Axis::titled("키워드"),
      yaxis: Axis::titled("빈도"),
    },
  }
}

pub fn curriculum_comparison_chart(matches: &[TopicMatch]) -> Chart {
  Chart {
    data: vec![Trace::Bar {
      x: matches.iter().map(|m| m.topic.clone()).collect(),
      y: matches.iter().map(|m| m.match_percentage).collect(),
      marker: Marker {
        color: MarkerColor::PerBar(
          matches
            .iter()
            .map(|m| MatchBand::for_percentage(m.match_percentage).color().to_string())
            .collect(),
        ),
      },
    }],
    layout: Layout {
      title: "커리큘럼 주제별 매칭률".to_string(),
      xaxis: Axis { tickangle: Some(-45), ..Axis::titled("주제") },
      yaxis: Axis { range: Some([0.0, 100.0]), ..Axis::titled("매칭률 (%)") },
    },
  }
}

/// All three result charts, in render order.
pub fn build_charts(result: &AnalysisResult) -> Vec<(ChartMount, Chart)> {
  vec![
    (ChartMount::RiskMatrix, risk_matrix_chart(&result.risk_matrix)),
    (ChartMount::KeywordFrequency, keyword_frequency_chart(&result.keyword_frequencies)),
    (
      ChartMount::CurriculumComparison,
      curriculum_comparison_chart(&result.curriculum_match.topic_matches),
    ),
  ]
}

#[derive(Error, Debug)]
pub enum ChartError {
  #[error("failed to write chart {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to serialize chart: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// Draws a chart into a mount point. Calls are independent of each other.
pub trait ChartRenderer: Send + Sync {
  fn render(&self, mount: ChartMount, chart: &Chart) -> Result<(), ChartError>;
}

/// Writes each chart as a standalone HTML page, `<dir>/<mount id>.html`.
pub struct PlotlyHtmlRenderer {
  dir: PathBuf,
}

impl PlotlyHtmlRenderer {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn path_for(&self, mount: ChartMount) -> PathBuf {
    self.dir.join(format!("{}.html", mount.id()))
  }

  fn write(&self, path: &Path, contents: &str) -> Result<(), ChartError> {
    let io_err = |source| ChartError::Io { path: path.to_path_buf(), source };
    fs::create_dir_all(&self.dir).map_err(io_err)?;
    fs::write(path, contents).map_err(io_err)
  }
}

/// JSON that is safe to inline inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
  Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn html_document(mount: ChartMount, chart: &Chart) -> Result<String, serde_json::Error> {
  let id = mount.id();
  let data = script_json(&chart.data)?;
  let layout = script_json(&chart.layout)?;
  Ok(format!(
    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{id}</title>\n\
     <script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>\n<div id=\"{id}\"></div>\n\
     <script>Plotly.newPlot('{id}', {data}, {layout});</script>\n</body>\n</html>\n"
  ))
}

impl ChartRenderer for PlotlyHtmlRenderer {
  fn render(&self, mount: ChartMount, chart: &Chart) -> Result<(), ChartError> {
    let document = html_document(mount, chart)?;
    let path = self.path_for(mount);
    self.write(&path, &document)?;
    tracing::info!(mount = mount.id(), path = %path.display(), "chart written");
    Ok(())
  }
}
