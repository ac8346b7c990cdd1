//! Conformity - lecture and curriculum analysis client
//!
//! Sends a lecture transcript and a curriculum to the analysis server and
//! shows what comes back: the overall conformity score, keywords, per-topic
//! match rates, and three charts. Also converts curriculum spreadsheets to
//! JSON through the same server.
//!
//! The analysis itself happens server-side. This crate owns the two
//! submission flows ([`flows::UploadFlow`], [`flows::ConvertFlow`]) and the
//! seams they drive: [`client::AnalysisApi`], [`view::ResultsView`],
//! [`view::Notifier`], [`charts::ChartRenderer`] and
//! [`download::DownloadSink`].

pub mod charts;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod flows;
pub mod form;
pub mod messages;
pub mod model;
pub mod view;

pub use error::FlowError;
pub use model::AnalysisResult;
