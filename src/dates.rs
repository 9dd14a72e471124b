//! Statement date handling.
//!
//! Two very different jobs live here:
//!
//! * [`is_valid_date`] is a strict gate. Credit-card tables interleave real
//!   transaction lines with wrapped descriptions and page footers, and the
//!   only reliable marker of a transaction line is a `DD/MM/YYYY` date in the
//!   first cell.
//! * [`parse_statement_date`] is lenient. The summary has to cope with values
//!   a user typed into the grid, so it accepts the common day-first spellings.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder used in summaries when no date could be derived.
pub const NO_DATE: &str = "-";

static RE_DMY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());

/// Formats tried by [`parse_statement_date`], day-first before year-first.
///
/// Two-digit years come first: `%Y` happily reads `24` as the year 24.
const LENIENT_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d-%m-%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%d %b %Y",
    "%d-%b-%Y", "%d %B %Y",
];

/// True iff `text` is exactly `DD/MM/YYYY` and names a real calendar day.
///
/// ```rust
/// use stmtparse::dates::is_valid_date;
///
/// assert!(is_valid_date("29/02/2024"));
/// assert!(!is_valid_date("31/04/2024"));
/// assert!(!is_valid_date("5/3/2024"));
/// ```
pub fn is_valid_date(text: &str) -> bool {
    RE_DMY.is_match(text) && NaiveDate::parse_from_str(text, "%d/%m/%Y").is_ok()
}

/// Parse a date cell for summarisation, or `None` when it is not a date.
pub fn parse_statement_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    LENIENT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Render a date the way summaries show it: `DD-MM-YYYY`.
pub fn format_summary_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dates() {
        assert!(is_valid_date("01/02/2024"));
        assert!(is_valid_date("29/02/2024"));
        assert!(is_valid_date("31/12/1999"));
    }

    #[test]
    fn test_impossible_dates_rejected() {
        assert!(!is_valid_date("31/04/2024"));
        assert!(!is_valid_date("29/02/2023"));
        assert!(!is_valid_date("00/01/2024"));
        assert!(!is_valid_date("12/13/2024"));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(!is_valid_date(""));
        assert!(!is_valid_date("1/2/2024"));
        assert!(!is_valid_date("01/02/24"));
        assert!(!is_valid_date("01-02-2024"));
        assert!(!is_valid_date(" 01/02/2024"));
        assert!(!is_valid_date("01/02/2024 "));
        assert!(!is_valid_date("Transaction Date"));
    }

    #[test]
    fn test_lenient_parse_is_day_first() {
        let d = parse_statement_date("01/02/2024").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(format_summary_date(d), "01-02-2024");
    }

    #[test]
    fn test_lenient_parse_accepts_common_spellings() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_statement_date(" 05/03/2024 "), expected);
        assert_eq!(parse_statement_date("05-03-2024"), expected);
        assert_eq!(parse_statement_date("05.03.2024"), expected);
        assert_eq!(parse_statement_date("2024-03-05"), expected);
        assert_eq!(parse_statement_date("05 Mar 2024"), expected);
        assert_eq!(parse_statement_date("05/03/24"), expected);
    }

    #[test]
    fn test_lenient_parse_rejects_noise() {
        assert_eq!(parse_statement_date(""), None);
        assert_eq!(parse_statement_date("Opening balance"), None);
        assert_eq!(parse_statement_date("31/04/2024"), None);
    }
}
