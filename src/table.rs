//! Canonical records and the tables that hold them.
//!
//! Every field is kept as text. Statements are shown to people who may edit
//! them, and a value like `1,234.50` or `900` must survive a round trip
//! through a grid unchanged; numbers and dates are only interpreted when a
//! [`crate::summary::Summary`] is computed.

use crate::account::AccountType;
use crate::summary::Summary;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One raw table line as emitted by table detection. `None` marks a cell
/// the detector could not place.
pub type RawRow = Vec<Option<String>>;

/// A detected table: rows top-to-bottom as found on the page(s).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// 1-indexed page the table (or its first row) was found on.
    pub page_num: usize,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(page_num: usize, rows: Vec<RawRow>) -> Self {
        Self { page_num, rows }
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A normalized transaction of one statement layout.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Layout this record belongs to.
    const LAYOUT: AccountType;
    /// Column names, in display order. Matches the serde field names.
    const COLUMNS: &'static [&'static str];

    /// The column the summary's date range is computed from.
    fn primary_date(&self) -> &str;
    fn debit(&self) -> &str;
    fn credit(&self) -> &str;
    /// Field values in [`Record::COLUMNS`] order.
    fn cells(&self) -> Vec<&str>;
}

/// Current-account transaction line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAccountRecord {
    pub date: String,
    pub description: String,
    pub debit: String,
    pub credit: String,
    pub balance: String,
}

impl Record for CurrentAccountRecord {
    const LAYOUT: AccountType = AccountType::CurrentAccount;
    const COLUMNS: &'static [&'static str] = &["date", "description", "debit", "credit", "balance"];

    fn primary_date(&self) -> &str {
        &self.date
    }

    fn debit(&self) -> &str {
        &self.debit
    }

    fn credit(&self) -> &str {
        &self.credit
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.date.as_str(),
            self.description.as_str(),
            self.debit.as_str(),
            self.credit.as_str(),
            self.balance.as_str(),
        ]
    }
}

/// Credit-card transaction line. Exactly one of `debit` and `credit` is
/// non-empty when produced by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardRecord {
    pub transaction_date: String,
    pub posting_date: String,
    pub description: String,
    pub debit: String,
    pub credit: String,
}

impl Record for CreditCardRecord {
    const LAYOUT: AccountType = AccountType::CreditCard;
    const COLUMNS: &'static [&'static str] = &[
        "transaction_date",
        "posting_date",
        "description",
        "debit",
        "credit",
    ];

    fn primary_date(&self) -> &str {
        &self.transaction_date
    }

    fn debit(&self) -> &str {
        &self.debit
    }

    fn credit(&self) -> &str {
        &self.credit
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.transaction_date.as_str(),
            self.posting_date.as_str(),
            self.description.as_str(),
            self.debit.as_str(),
            self.credit.as_str(),
        ]
    }
}

/// Records of one layout in encounter order.
///
/// An empty table still reports its layout's [`columns`](Self::columns), so
/// a grid can always be drawn with the right headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementTable<R> {
    records: Vec<R>,
}

impl<R> Default for StatementTable<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> StatementTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Mutable access for caller-driven edits (add, remove, modify rows).
    pub fn records_mut(&mut self) -> &mut Vec<R> {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The table as a text grid, one row per record in column order.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|r| r.cells().into_iter().map(str::to_string).collect())
            .collect()
    }
}

impl<R: Record> FromIterator<R> for StatementTable<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// A table of either layout, for consumers that only need a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", content = "records", rename_all = "snake_case")]
pub enum Statement {
    CurrentAccount(StatementTable<CurrentAccountRecord>),
    CreditCard(StatementTable<CreditCardRecord>),
}

impl Statement {
    /// An empty table of the given layout.
    pub fn empty(account_type: AccountType) -> Self {
        match account_type {
            AccountType::CurrentAccount => Statement::CurrentAccount(StatementTable::new()),
            AccountType::CreditCard => Statement::CreditCard(StatementTable::new()),
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self {
            Statement::CurrentAccount(_) => AccountType::CurrentAccount,
            Statement::CreditCard(_) => AccountType::CreditCard,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Statement::CurrentAccount(t) => t.columns(),
            Statement::CreditCard(t) => t.columns(),
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            Statement::CurrentAccount(t) => t.rows(),
            Statement::CreditCard(t) => t.rows(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Statement::CurrentAccount(t) => t.len(),
            Statement::CreditCard(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute the summary from the current contents.
    pub fn summarize(&self) -> Summary {
        match self {
            Statement::CurrentAccount(t) => Summary::from_table(t),
            Statement::CreditCard(t) => Summary::from_table(t),
        }
    }
}

impl From<StatementTable<CurrentAccountRecord>> for Statement {
    fn from(table: StatementTable<CurrentAccountRecord>) -> Self {
        Statement::CurrentAccount(table)
    }
}

impl From<StatementTable<CreditCardRecord>> for Statement {
    fn from(table: StatementTable<CreditCardRecord>) -> Self {
        Statement::CreditCard(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rent() -> CurrentAccountRecord {
        CurrentAccountRecord {
            date: "01/02/2024".into(),
            description: "Rent Payment".into(),
            debit: "100".into(),
            credit: String::new(),
            balance: "900".into(),
        }
    }

    #[test]
    fn test_empty_table_keeps_columns() {
        let table: StatementTable<CreditCardRecord> = StatementTable::new();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 5);
        assert_eq!(table.columns()[0], "transaction_date");
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_rows_follow_column_order() {
        let table: StatementTable<_> = vec![rent()].into_iter().collect();
        assert_eq!(
            table.rows(),
            vec![vec!["01/02/2024", "Rent Payment", "100", "", "900"]]
        );
    }

    #[test]
    fn test_cells_match_columns_for_both_layouts() {
        assert_eq!(rent().cells().len(), CurrentAccountRecord::COLUMNS.len());
        assert_eq!(
            CreditCardRecord::default().cells().len(),
            CreditCardRecord::COLUMNS.len()
        );
    }

    #[test]
    fn test_serde_field_names_match_columns() {
        let json = serde_json::to_value(rent()).unwrap();
        let object = json.as_object().unwrap();
        for column in CurrentAccountRecord::COLUMNS {
            assert!(object.contains_key(*column), "missing {column}");
        }
    }

    #[test]
    fn test_raw_table_column_count() {
        let table = RawTable::new(
            1,
            vec![
                vec![Some("a".into())],
                vec![Some("a".into()), None, Some("c".into())],
            ],
        );
        assert_eq!(table.column_count(), 3);
        assert_eq!(RawTable::default().column_count(), 0);
    }

    #[test]
    fn test_statement_dispatch() {
        let statement = Statement::empty(AccountType::CurrentAccount);
        assert_eq!(statement.account_type(), AccountType::CurrentAccount);
        assert_eq!(statement.columns(), CurrentAccountRecord::COLUMNS);
        assert_eq!(statement.summarize().transactions, 0);
    }
}
