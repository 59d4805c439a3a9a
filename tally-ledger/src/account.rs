use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chart-of-accounts record. Account codes are 4-character strings and unique
/// across the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MainAccount {
    pub account: String,
    pub description: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default)]
    pub record_id: i64,
}

impl MainAccount {
    pub fn new(
        account: impl Into<String>,
        description: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            account_type,
            category: None,
            company_id: None,
            record_id: 0,
        }
    }
}

/// Classification of a main account.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
            AccountType::Equity => "Equity",
            AccountType::Revenue => "Revenue",
            AccountType::Expense => "Expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Asset" => Ok(AccountType::Asset),
            "Liability" => Ok(AccountType::Liability),
            "Equity" => Ok(AccountType::Equity),
            "Revenue" => Ok(AccountType::Revenue),
            "Expense" => Ok(AccountType::Expense),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Outcome of an account insert. A duplicate code is an expected outcome, not
/// an error, so it gets its own variant rather than a nullable return.
#[derive(Clone, Debug)]
pub enum AccountInsert {
    Created(MainAccount),
    Duplicate,
}

impl AccountInsert {
    pub fn created(self) -> Option<MainAccount> {
        match self {
            AccountInsert::Created(account) => Some(account),
            AccountInsert::Duplicate => None,
        }
    }
}
