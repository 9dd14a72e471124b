//! Integration tests over hand-built page geometry.
//!
//! A fake [`PageSource`] stands in for pdfium, so these run everywhere and
//! exercise the whole path: detection, normalization, assembly, summary
//! and CSV export/import.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use stmtparse::{
    parse_statement, read_csv, write_csv, AccountType, CreditCardRecord, CurrentAccountRecord,
    PageLayout, PageSelection, PageSource, ParseConfig, Record, Statement, StatementDocument,
    StatementError,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs to the test harness; `RUST_LOG=stmtparse=trace` shows
/// every dropped row.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serves prepared pages. Records every scratch path it is handed and
/// whether that file existed at call time.
#[derive(Default)]
struct FakeEngine {
    pages: Vec<PageLayout>,
    fail_with: Option<fn(&str) -> StatementError>,
    seen_files: RefCell<Vec<(PathBuf, bool)>>,
}

impl FakeEngine {
    fn serving(pages: Vec<PageLayout>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    fn failing(make: fn(&str) -> StatementError) -> Self {
        Self {
            fail_with: Some(make),
            ..Self::default()
        }
    }

    fn selected(&self, name: &str, config: &ParseConfig) -> Result<Vec<PageLayout>, StatementError> {
        if let Some(make) = self.fail_with {
            return Err(make(name));
        }
        let indices = config.pages.to_indices(self.pages.len());
        Ok(indices.into_iter().map(|i| self.pages[i].clone()).collect())
    }
}

impl PageSource for FakeEngine {
    fn pages_from_bytes(
        &self,
        name: &str,
        _bytes: &[u8],
        config: &ParseConfig,
    ) -> Result<Vec<PageLayout>, StatementError> {
        self.selected(name, config)
    }

    fn pages_from_file(
        &self,
        name: &str,
        path: &Path,
        config: &ParseConfig,
    ) -> Result<Vec<PageLayout>, StatementError> {
        self.seen_files
            .borrow_mut()
            .push((path.to_path_buf(), path.exists()));
        self.selected(name, config)
    }
}

fn document() -> StatementDocument {
    StatementDocument::from_bytes("statement.pdf", b"%PDF-1.7\n%%EOF\n".to_vec()).unwrap()
}

const COLUMNS_X: [f32; 6] = [20.0, 100.0, 260.0, 330.0, 400.0, 480.0];

/// A current-account page: a ruled 5-column grid with one line per entry.
fn ruled_page(page_num: usize, rows: &[[&str; 5]]) -> PageLayout {
    let mut page = PageLayout::new(page_num, 595.0, 842.0);
    let ys: Vec<f32> = (0..=rows.len()).map(|i| 60.0 + 30.0 * i as f32).collect();
    let (top, bottom) = (ys[0], ys[ys.len() - 1]);

    for &y in &ys {
        page.push_ruling(COLUMNS_X[0], y - 0.4, COLUMNS_X[5], y + 0.4);
    }
    for &x in &COLUMNS_X {
        page.push_ruling(x - 0.4, top, x + 0.4, bottom);
    }
    for (row, &y) in rows.iter().zip(&ys) {
        for (cell, &x) in row.iter().zip(&COLUMNS_X) {
            page.push_text(cell, x + 2.0, y + 4.0, 4.0, 8.0);
        }
    }
    page
}

const CARD_X: [f32; 4] = [30.0, 120.0, 210.0, 470.0];

/// A credit-card page: unruled lines with columns at fixed offsets. Empty
/// strings leave the slot blank.
fn card_page(page_num: usize, header: &[&str], lines: &[[&str; 4]]) -> PageLayout {
    let mut page = PageLayout::new(page_num, 595.0, 842.0);
    // A letterhead block well above the table.
    for (i, text) in header.iter().enumerate() {
        page.push_text(text, 30.0, 40.0 + 12.0 * i as f32, 5.0, 9.0);
    }
    for (i, line) in lines.iter().enumerate() {
        let top = 200.0 + 13.0 * i as f32;
        for (cell, &x) in line.iter().zip(&CARD_X) {
            page.push_text(cell, x, top, 5.0, 9.0);
        }
    }
    page
}

// ── Current account ──────────────────────────────────────────────────────────

#[test]
fn test_current_account_statement() {
    init_tracing();
    let engine = FakeEngine::serving(vec![
        ruled_page(
            1,
            &[
                ["Date", "Description", "Debit", "Credit", "Balance"],
                ["01/02/2024", "Rent\nPayment", "100-", "-", "900 Cr"],
                ["03/02/2024", "Salary", "-", "1,234.50", "2,134.50 Cr"],
            ],
        ),
        ruled_page(
            2,
            &[
                ["Date", "Description", "Debit", "Credit", "Balance"],
                ["", "Brought forward", "", "", "2,134.50"],
                ["28/02/2024", "Card fee", "4.50-", "-", "2,130.00"],
            ],
        ),
    ]);
    let config = ParseConfig::default();
    let output = parse_statement(AccountType::CurrentAccount, &document(), &engine, &config);

    assert!(output.extraction_error.is_none());
    let Statement::CurrentAccount(table) = &output.statement else {
        panic!("wrong layout: {:?}", output.statement.account_type());
    };
    assert_eq!(
        table.records()[0],
        CurrentAccountRecord {
            date: "01/02/2024".into(),
            description: "Rent Payment".into(),
            debit: "100".into(),
            credit: "".into(),
            balance: "900".into(),
        }
    );
    let dates: Vec<&str> = table.records().iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["01/02/2024", "03/02/2024", "28/02/2024"]);

    assert_eq!(output.summary.transactions, 3);
    assert_eq!(output.summary.start_date, "01-02-2024");
    assert_eq!(output.summary.end_date, "28-02-2024");
    assert!((output.summary.total_debit - 104.5).abs() < 1e-9);
    assert!((output.summary.total_credit - 1234.5).abs() < 1e-9);

    assert_eq!(output.stats.pages, 2);
    assert_eq!(output.stats.tables_found, 2);
    assert_eq!(output.stats.rows_seen, 6);
    assert_eq!(output.stats.rows_rejected, 3);
    assert!(engine.seen_files.borrow().is_empty());
}

#[test]
fn test_current_account_page_selection() {
    let engine = FakeEngine::serving(vec![
        ruled_page(1, &[["01/01/2024", "a", "1", "", "1"]]),
        ruled_page(2, &[["02/01/2024", "b", "2", "", "2"]]),
    ]);
    let config = ParseConfig::builder()
        .pages(PageSelection::Single(2))
        .build()
        .unwrap();
    let output = parse_statement(AccountType::CurrentAccount, &document(), &engine, &config);
    assert_eq!(output.statement.rows(), vec![vec!["02/01/2024", "b", "2", "", "2"]]);
}

#[test]
fn test_current_account_without_tables() {
    let mut page = PageLayout::new(1, 595.0, 842.0);
    page.push_text("No transactions this period", 30.0, 100.0, 5.0, 9.0);
    let engine = FakeEngine::serving(vec![page]);
    let output = parse_statement(
        AccountType::CurrentAccount,
        &document(),
        &engine,
        &ParseConfig::default(),
    );

    assert!(output.extraction_error.is_none());
    assert!(output.statement.is_empty());
    assert_eq!(output.statement.columns(), CurrentAccountRecord::COLUMNS);
    assert_eq!(output.summary.start_date, "-");
    assert_eq!(output.summary.total_debit, 0.0);
}

// ── Credit card ──────────────────────────────────────────────────────────────

#[test]
fn test_credit_card_with_foreign_currency_lines() {
    let engine = FakeEngine::serving(vec![card_page(
        1,
        &["Travel Card"],
        &[
            ["Txn Date", "Post Date", "Description", "Amount"],
            ["05/03/2024", "06/03/2024", "Hotel Boston", "120.40"],
            ["", "", "USD 130.00", ""],
            ["", "", "Rate 1.08", ""],
            ["07/03/2024", "08/03/2024", "Museum Shop", "31.02"],
            ["", "", "USD 33.50", ""],
            ["", "", "Rate 1.08", ""],
            ["09/03/2024", "10/03/2024", "Rail Refund", "55.80CR"],
            ["", "", "USD 60.26", ""],
            ["", "", "Rate 1.08", ""],
        ],
    )]);
    let output = parse_statement(
        AccountType::CreditCard,
        &document(),
        &engine,
        &ParseConfig::default(),
    );

    assert!(output.extraction_error.is_none());
    assert_eq!(output.stats.tables_skipped, 0);
    assert_eq!(output.summary.transactions, 3);
    let descriptions: Vec<String> = output
        .statement
        .rows()
        .into_iter()
        .map(|r| r[2].clone())
        .collect();
    assert_eq!(descriptions, vec!["Hotel Boston", "Museum Shop", "Rail Refund"]);
    assert!((output.summary.total_debit - 151.42).abs() < 1e-9);
    assert!((output.summary.total_credit - 55.8).abs() < 1e-9);
}

#[test]
fn test_credit_card_statement() {
    init_tracing();
    let engine = FakeEngine::serving(vec![card_page(
        1,
        &["Platinum Card", "Statement period March 2024"],
        &[
            ["Txn Date", "Post Date", "Description", "Amount"],
            ["05/03/2024", "06/03/2024", "Refund Store", "50.00CR"],
            ["07/03/2024", "08/03/2024", "Coffee House", "4.10"],
            ["", "", "Foreign fee", ""],
            ["31/04/2024", "01/05/2024", "Bad date", "9.99"],
            ["12/03/2024", "13/03/2024", "Airline", "1,204.10"],
        ],
    )]);
    let config = ParseConfig::default();
    let output = parse_statement(AccountType::CreditCard, &document(), &engine, &config);

    assert!(output.extraction_error.is_none());
    let Statement::CreditCard(table) = &output.statement else {
        panic!("wrong layout: {:?}", output.statement.account_type());
    };
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.records()[0],
        CreditCardRecord {
            transaction_date: "05/03/2024".into(),
            posting_date: "06/03/2024".into(),
            description: "Refund Store".into(),
            debit: "".into(),
            credit: "50.00".into(),
        }
    );
    for record in table.records() {
        assert!(record.debit.is_empty() != record.credit.is_empty());
    }

    assert_eq!(output.summary.transactions, 3);
    assert_eq!(output.summary.start_date, "05-03-2024");
    assert_eq!(output.summary.end_date, "12-03-2024");
    assert!((output.summary.total_debit - 1208.2).abs() < 1e-9);
    assert!((output.summary.total_credit - 50.0).abs() < 1e-9);

    // The letterhead block is a 1-column table and is skipped.
    assert_eq!(output.stats.tables_found, 2);
    assert_eq!(output.stats.tables_skipped, 1);
    assert_eq!(output.stats.rows_seen, 5);
}

#[test]
fn test_credit_card_scratch_file_lifecycle() {
    let engine = FakeEngine::serving(vec![card_page(1, &[], &[])]);
    let output = parse_statement(
        AccountType::CreditCard,
        &document(),
        &engine,
        &ParseConfig::default(),
    );
    assert!(output.statement.is_empty());

    let seen = engine.seen_files.borrow();
    assert_eq!(seen.len(), 1);
    let (path, existed) = &seen[0];
    assert!(existed, "scratch file must exist during the engine call");
    assert!(!path.exists(), "scratch file must be removed afterwards");
}

#[test]
fn test_credit_card_scratch_file_removed_on_failure() {
    let engine = FakeEngine::failing(|name| StatementError::WrongPassword {
        name: name.to_string(),
    });
    let output = parse_statement(
        AccountType::CreditCard,
        &document(),
        &engine,
        &ParseConfig::default(),
    );
    assert!(output.is_degraded());

    let seen = engine.seen_files.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].1);
    assert!(!seen[0].0.exists());
}

// ── Degraded documents ───────────────────────────────────────────────────────

#[test]
fn test_unreadable_document_degrades_for_both_layouts() {
    init_tracing();
    let engine = FakeEngine::failing(|name| StatementError::CorruptPdf {
        name: name.to_string(),
        detail: "trailer not found".into(),
    });

    for account_type in AccountType::ALL {
        let output = parse_statement(account_type, &document(), &engine, &ParseConfig::default());
        assert_eq!(output.account_type, account_type);
        assert!(output.statement.is_empty());
        assert_eq!(output.summary.transactions, 0);
        assert_eq!(output.summary.end_date, "-");
        let reason = output.extraction_error.expect("error recorded");
        assert!(reason.contains("trailer not found"), "{reason}");
    }
}

// ── Edit and re-summarise ────────────────────────────────────────────────────

#[test]
fn test_csv_round_trip_with_edits() {
    let engine = FakeEngine::serving(vec![ruled_page(
        1,
        &[
            ["01/02/2024", "Rent", "100-", "-", "900 Cr"],
            ["03/02/2024", "Salary", "-", "1,234.50", "2,134.50 Cr"],
        ],
    )]);
    let mut output = parse_statement(
        AccountType::CurrentAccount,
        &document(),
        &engine,
        &ParseConfig::default(),
    );

    let mut csv = Vec::new();
    write_csv(&output.statement, &mut csv).unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert!(text.starts_with("date,description,debit,credit,balance\n"));

    // The user removes the salary line and fixes the rent amount.
    let edited: String = text
        .lines()
        .filter(|l| !l.contains("Salary"))
        .map(|l| l.replace(",100,", ",110,") + "\n")
        .collect();
    let statement = read_csv(AccountType::CurrentAccount, edited.as_bytes()).unwrap();
    let summary = statement.summarize();
    assert_eq!(summary.transactions, 1);
    assert_eq!(summary.total_debit, 110.0);
    assert_eq!(summary.total_credit, 0.0);

    output.statement = statement;
    output.refresh_summary();
    assert_eq!(output.summary, summary);
}
