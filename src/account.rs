//! The account-type selector that decides which statement layout is parsed.

use crate::error::StatementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statement layout chosen by the caller. Layouts are never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Ruled tables: date, description, debit, credit, balance.
    #[serde(rename = "Current Account")]
    CurrentAccount,
    /// Whitespace-aligned tables: transaction date, posting date,
    /// description, signed amount.
    #[serde(rename = "Credit Card")]
    CreditCard,
}

impl AccountType {
    pub const ALL: [AccountType; 2] = [AccountType::CurrentAccount, AccountType::CreditCard];

    /// The label shown to users and accepted by [`FromStr`].
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::CurrentAccount => "Current Account",
            AccountType::CreditCard => "Credit Card",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccountType {
    type Err = StatementError;

    /// Accepts the display labels plus their kebab/snake spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', '_'], " ");
        match key.as_str() {
            "current account" | "current" => Ok(AccountType::CurrentAccount),
            "credit card" | "card" => Ok(AccountType::CreditCard),
            _ => Err(StatementError::UnknownAccountType(s.to_string())),
        }
    }
}
