//! Summary statistics derived from a statement table.
//!
//! A summary is a read-only view: it is computed from whatever the table
//! holds right now, so recomputing after a user edit reflects the edit and
//! recomputing an unchanged table gives the same answer.

use crate::dates::{format_summary_date, parse_statement_date, NO_DATE};
use crate::table::{Record, StatementTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed-key statistics for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "Transactions")]
    pub transactions: usize,
    /// `DD-MM-YYYY`, or `-` when no date parses.
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "Total Debit")]
    pub total_debit: f64,
    #[serde(rename = "Total Credit")]
    pub total_credit: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            transactions: 0,
            start_date: NO_DATE.to_string(),
            end_date: NO_DATE.to_string(),
            total_debit: 0.0,
            total_credit: 0.0,
        }
    }
}

impl Summary {
    /// Compute the summary of a table of either layout.
    ///
    /// Dates that do not parse and amounts that are empty or not numbers are
    /// left out of the range and the totals rather than treated as zero.
    pub fn from_table<R: Record>(table: &StatementTable<R>) -> Self {
        let records = table.records();

        let dates: Vec<NaiveDate> = records
            .iter()
            .filter_map(|r| parse_statement_date(r.primary_date()))
            .collect();
        let start = dates.iter().min().copied();
        let end = dates.iter().max().copied();

        Self {
            transactions: records.len(),
            start_date: start.map_or_else(|| NO_DATE.to_string(), format_summary_date),
            end_date: end.map_or_else(|| NO_DATE.to_string(), format_summary_date),
            total_debit: records.iter().filter_map(|r| parse_amount(r.debit())).sum(),
            total_credit: records.iter().filter_map(|r| parse_amount(r.credit())).sum(),
        }
    }
}

/// Parse a money cell: thousands separators removed, surrounding whitespace
/// ignored. Empty, non-numeric and non-finite values yield `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
