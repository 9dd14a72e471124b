//! Row normalization: one raw table line in, one canonical record or a
//! [`RowRejection`] out.
//!
//! Statements routinely mix decorative rows, repeated headers and wrapped
//! descriptions in with transactions. Each normalizer decides per row, so a
//! bad line never costs more than itself.

use crate::dates::is_valid_date;
use crate::error::RowRejection;
use crate::table::{CreditCardRecord, CurrentAccountRecord, RawRow};

/// First-cell text that marks a current-account column header.
const HEADER_TOKEN: &str = "Date";

/// Balance suffix marking a credit balance; dropped without changing sign.
const CREDIT_BALANCE_MARKER: &str = " Cr";

/// Amount marker for card credits (refunds, payments).
const CREDIT_AMOUNT_MARKER: &str = "CR";

/// Normalize one row of a ruled current-account table.
///
/// ```rust
/// use stmtparse::normalize::normalize_current_account;
///
/// let row = vec![
///     Some("01/02/2024".to_string()),
///     Some("Rent\nPayment".to_string()),
///     Some("100-".to_string()),
///     Some("-".to_string()),
///     Some("900 Cr".to_string()),
/// ];
/// let record = normalize_current_account(&row).unwrap();
/// assert_eq!(record.description, "Rent Payment");
/// assert_eq!(record.debit, "100");
/// assert_eq!(record.credit, "");
/// assert_eq!(record.balance, "900");
/// ```
pub fn normalize_current_account(row: &RawRow) -> Result<CurrentAccountRecord, RowRejection> {
    let first = match row.first() {
        None => return Err(RowRejection::Empty),
        Some(cell) => cell.as_deref().unwrap_or(""),
    };
    if first.is_empty() {
        return Err(RowRejection::BlankLeadingCell);
    }
    if first == HEADER_TOKEN {
        return Err(RowRejection::Header);
    }

    Ok(CurrentAccountRecord {
        date: first.to_string(),
        description: collapse_newlines(cell(row, 1)?),
        debit: strip_placeholder(cell(row, 2)?),
        credit: strip_placeholder(cell(row, 3)?),
        balance: cell(row, 4)?.replace(CREDIT_BALANCE_MARKER, ""),
    })
}

/// Normalize one data row (header already skipped) of a 4-column card table.
pub fn normalize_credit_card(row: &RawRow) -> Result<CreditCardRecord, RowRejection> {
    let first = match row.first() {
        None => return Err(RowRejection::Empty),
        Some(cell) => cell.as_deref().unwrap_or(""),
    };
    if first.is_empty() {
        return Err(RowRejection::BlankLeadingCell);
    }
    if !is_valid_date(first) {
        return Err(RowRejection::InvalidDate(first.to_string()));
    }

    let amount = cell(row, 3)?;
    let (debit, credit) = if amount.contains(CREDIT_AMOUNT_MARKER) {
        (
            String::new(),
            amount.replace(CREDIT_AMOUNT_MARKER, "").trim().to_string(),
        )
    } else {
        (amount.trim().to_string(), String::new())
    };
    if debit.is_empty() && credit.is_empty() {
        return Err(RowRejection::MissingAmount);
    }

    Ok(CreditCardRecord {
        transaction_date: first.to_string(),
        posting_date: cell(row, 1)?.to_string(),
        description: collapse_newlines(cell(row, 2)?),
        debit,
        credit,
    })
}

fn cell(row: &RawRow, index: usize) -> Result<&str, RowRejection> {
    row.get(index)
        .and_then(|c| c.as_deref())
        .ok_or(RowRejection::MissingCell { index })
}

fn collapse_newlines(text: &str) -> String {
    text.replace('\n', " ")
}

/// Hyphens stand in for "no value" in debit/credit columns.
fn strip_placeholder(text: &str) -> String {
    text.replace('-', "")
}
