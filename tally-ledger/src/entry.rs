use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A posted ledger line. Immutable once created; only the trial balance
/// reads these in this scope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlEntry {
    pub id: Uuid,
    pub journal_date: NaiveDate,
    pub account_number: String,
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub currency: String,
    #[serde(default)]
    pub financial_dimensions: BTreeMap<String, String>,
    pub reference: String,
    pub description: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub posted_by: String,
}

impl GlEntry {
    pub fn new(
        journal_date: NaiveDate,
        account_number: impl Into<String>,
        account_name: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            journal_date,
            account_number: account_number.into(),
            account_name: account_name.into(),
            debit,
            credit,
            currency: "USD".to_string(),
            financial_dimensions: BTreeMap::new(),
            reference: String::new(),
            description: String::new(),
            source: String::new(),
            created_at: Utc::now(),
            posted_by: String::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Per-account rollup produced by the trial balance. Derived on every query,
/// never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account: String,
    pub name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}
