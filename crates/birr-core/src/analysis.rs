//! End-to-end analysis of an SMS export
//!
//! A run either produces statistics plus all three charts, or a single
//! error. Nothing is rendered when no transactions were found.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::charts::ChartRenderer;
use crate::error::{Error, Result};
use crate::models::{AnalysisReport, RawMessage, SmsExport, TimeZoneSetting};
use crate::parser::MessageParser;
use crate::stats::compute_statistics;

/// Parse an SMS export document
pub fn load_export(data: &[u8]) -> Result<SmsExport> {
    serde_json::from_slice(data).map_err(|e| Error::InvalidFormat(e.to_string()))
}

/// Parses, aggregates and renders, using one timezone and one graph directory
pub struct Analyzer {
    parser: MessageParser,
    renderer: ChartRenderer,
}

impl Analyzer {
    pub fn new(timezone: TimeZoneSetting, graph_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            parser: MessageParser::new(timezone)?,
            renderer: ChartRenderer::new(graph_dir),
        })
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// Analyze the SMS export stored at `path`.
    ///
    /// An unreadable file is reported the same way as malformed JSON.
    pub fn analyze_transactions(&self, path: &Path) -> Result<AnalysisReport> {
        let data = std::fs::read(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "Failed to read upload");
            Error::InvalidFormat(e.to_string())
        })?;
        self.analyze_document(&data)
    }

    /// Analyze an in-memory SMS export document
    pub fn analyze_document(&self, data: &[u8]) -> Result<AnalysisReport> {
        let export = load_export(data)?;
        self.analyze_messages(&export.sms)
    }

    pub fn analyze_messages(&self, messages: &[RawMessage]) -> Result<AnalysisReport> {
        let transactions = self.parser.parse_all(messages);
        if transactions.is_empty() {
            info!(messages = messages.len(), "No transactions found in export");
            return Err(Error::NoTransactions);
        }

        let top_merchant = self.parser.top_merchant(messages);
        let stats = compute_statistics(&transactions, &top_merchant)?;
        let graphs = self.renderer.render_all(&transactions)?;

        info!(
            messages = messages.len(),
            transactions = transactions.len(),
            total_spent = stats.total_spent,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            stats,
            graphs,
            message_count: messages.len(),
            transaction_count: transactions.len(),
        })
    }
}
