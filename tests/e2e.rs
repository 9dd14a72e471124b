//! End-to-end tests over real statement PDFs in `./test_cases/`.
//!
//! They need a pdfium library and sample statements, so they are gated
//! behind the `E2E_ENABLED` environment variable and skip when a file is
//! missing.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture
//!
//! Expected files:
//!   test_cases/current_account.pdf   ruled current-account statement
//!   test_cases/credit_card.pdf       whitespace-aligned card statement

use std::path::PathBuf;
use stmtparse::{
    is_valid_date, parse_file, parse_to_csv, read_csv, AccountType, PageSelection, ParseConfig,
    Statement, StatementError,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn config() -> ParseConfig {
    let mut builder = ParseConfig::builder();
    if let Ok(lib) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_library(lib);
    }
    builder.build().unwrap()
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

// ── Error paths (no pdfium needed) ───────────────────────────────────────────

#[test]
fn test_parse_nonexistent_file() {
    let err = parse_file(
        "/definitely/not/here.pdf",
        AccountType::CurrentAccount,
        &ParseConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, StatementError::FileNotFound { .. }));
}

#[test]
fn test_parse_non_pdf_file() {
    let tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    std::fs::write(tmp.path(), b"date,description\n").unwrap();
    let err = parse_file(tmp.path(), AccountType::CreditCard, &ParseConfig::default()).unwrap_err();
    assert!(matches!(err, StatementError::NotAPdf { .. }));
}

// ── Real statements ──────────────────────────────────────────────────────────

#[test]
fn test_current_account_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("current_account.pdf"));
    let output = parse_file(&path, AccountType::CurrentAccount, &config()).unwrap();

    assert!(output.extraction_error.is_none(), "{:?}", output.extraction_error);
    assert!(output.summary.transactions > 0, "no transactions found");
    assert_ne!(output.summary.start_date, "-");
    let Statement::CurrentAccount(table) = &output.statement else {
        panic!("wrong layout");
    };
    for record in table.records() {
        assert_ne!(record.date, "Date");
        assert!(!record.date.is_empty());
        assert!(!record.description.contains('\n'));
        assert!(!record.balance.contains(" Cr"));
    }
    println!(
        "{} transactions, {} → {}, debit {:.2}, credit {:.2}",
        output.summary.transactions,
        output.summary.start_date,
        output.summary.end_date,
        output.summary.total_debit,
        output.summary.total_credit
    );
}

#[test]
fn test_credit_card_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("credit_card.pdf"));
    let output = parse_file(&path, AccountType::CreditCard, &config()).unwrap();

    assert!(output.extraction_error.is_none(), "{:?}", output.extraction_error);
    let Statement::CreditCard(table) = &output.statement else {
        panic!("wrong layout");
    };
    for record in table.records() {
        assert!(is_valid_date(&record.transaction_date));
        assert!(record.debit.is_empty() != record.credit.is_empty());
        assert!(!record.credit.contains("CR"));
    }
}

#[test]
fn test_first_page_only() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("current_account.pdf"));
    let all = parse_file(&path, AccountType::CurrentAccount, &config()).unwrap();

    let mut first_only = config();
    first_only.pages = PageSelection::Single(1);
    let first = parse_file(&path, AccountType::CurrentAccount, &first_only).unwrap();

    assert_eq!(first.stats.pages, 1);
    assert!(first.summary.transactions <= all.summary.transactions);
}

#[test]
fn test_csv_written_and_readable() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("credit_card.pdf"));
    let out_dir = tempfile::tempdir().unwrap();
    let csv_path = out_dir.path().join("credit_card_parsed.csv");

    let output = parse_to_csv(&path, AccountType::CreditCard, &csv_path, &config()).unwrap();
    let file = std::fs::File::open(&csv_path).unwrap();
    let statement = read_csv(AccountType::CreditCard, file).unwrap();

    assert_eq!(statement, output.statement);
    assert_eq!(statement.summarize(), output.summary);
}

#[test]
fn test_json_serialisable() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("current_account.pdf"));
    let output = parse_file(&path, AccountType::CurrentAccount, &config()).unwrap();
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["account_type"], "Current Account");
    assert!(json["summary"]["Transactions"].is_u64());
}
