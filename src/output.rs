//! Result types returned by a parse.

use crate::account::AccountType;
use crate::summary::Summary;
use crate::table::{Record, Statement, StatementTable};
use serde::{Deserialize, Serialize};

/// Counters describing how much of the document ended up in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages handed to table detection.
    pub pages: usize,
    pub tables_found: usize,
    /// Tables whose shape does not fit the layout (credit card only).
    pub tables_skipped: usize,
    /// Rows offered to the normalizer.
    pub rows_seen: usize,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
    pub duration_ms: u64,
}

/// What one layout pipeline produced.
#[derive(Debug, Clone)]
pub struct ParseOutcome<R> {
    pub table: StatementTable<R>,
    pub stats: ExtractionStats,
    /// Set when the document could not be read at all; `table` is then empty.
    pub extraction_error: Option<String>,
}

impl<R: Record> ParseOutcome<R> {
    /// An empty outcome for a document that failed to load.
    pub fn failed(error: impl ToString, stats: ExtractionStats) -> Self {
        Self {
            table: StatementTable::new(),
            stats,
            extraction_error: Some(error.to_string()),
        }
    }
}

/// Table, summary and diagnostics for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementOutput {
    pub account_type: AccountType,
    pub statement: Statement,
    pub summary: Summary,
    pub stats: ExtractionStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl StatementOutput {
    pub(crate) fn from_outcome<R>(outcome: ParseOutcome<R>) -> Self
    where
        R: Record,
        Statement: From<StatementTable<R>>,
    {
        let summary = Summary::from_table(&outcome.table);
        Self {
            account_type: R::LAYOUT,
            statement: outcome.table.into(),
            summary,
            stats: outcome.stats,
            extraction_error: outcome.extraction_error,
        }
    }

    /// The output for a document that never reached a pipeline, such as a
    /// missing file: an empty table of the layout and the default summary.
    pub fn failed(account_type: AccountType, error: impl ToString) -> Self {
        Self {
            account_type,
            statement: Statement::empty(account_type),
            summary: Summary::default(),
            stats: ExtractionStats::default(),
            extraction_error: Some(error.to_string()),
        }
    }

    /// True when the document could not be read and the empty table does
    /// not mean "no transactions".
    pub fn is_degraded(&self) -> bool {
        self.extraction_error.is_some()
    }

    /// Recompute [`summary`](Self::summary) after the statement was edited.
    pub fn refresh_summary(&mut self) {
        self.summary = self.statement.summarize();
    }
}
