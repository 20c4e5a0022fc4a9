//! Birr Lens Core Library
//!
//! Shared functionality for the Birr Lens spending analyzer:
//! - SMS export models and timezone handling
//! - Message parser for ETB amounts and merchant names
//! - Statistics over the extracted transactions
//! - PNG chart rendering (monthly bars, size donut, weekday/hour heatmap)
//! - The `analyze_transactions` pipeline tying them together

pub mod analysis;
pub mod charts;
pub mod error;
pub mod models;
pub mod parser;
pub mod stats;

pub use analysis::{load_export, Analyzer};
pub use charts::{ChartRenderer, SizeBucket, DONUT_CHART_FILE, HEATMAP_FILE, MONTHLY_CHART_FILE};
pub use error::{Error, Result};
pub use models::{
    AnalysisReport, GraphFilenames, RawMessage, SavingsOpportunity, SmsExport, Statistics,
    TimeZoneSetting, Transaction,
};
pub use parser::{MessageParser, NO_MERCHANT};
pub use stats::compute_statistics;
