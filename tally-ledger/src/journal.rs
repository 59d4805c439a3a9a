use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Header record for a general journal document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalHeader {
    pub journal_id: String,
    pub document_date: NaiveDate,
    pub journal_type: String,
    pub description: String,
    pub status: JournalStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub company_id: Option<String>,
    /// Internal insertion-order key, assigned by the store. Also the
    /// keyset-pagination ordering key.
    pub record_id: i64,
}

impl JournalHeader {
    /// Creates a draft header with a zero record id; the store assigns the
    /// real record id on insert.
    pub fn draft(
        journal_id: impl Into<String>,
        document_date: NaiveDate,
        journal_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            journal_id: journal_id.into(),
            document_date,
            journal_type: journal_type.into(),
            description: description.into(),
            status: JournalStatus::Draft,
            posted_at: None,
            company_id: None,
            record_id: 0,
        }
    }

    pub fn with_record(mut self, record_id: i64) -> Self {
        self.record_id = record_id;
        self
    }
}

/// Lifecycle state of a journal. The only legal transition is draft -> posted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalStatus {
    Draft,
    Posted,
}

impl JournalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JournalStatus::Draft => "draft",
            JournalStatus::Posted => "posted",
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(JournalStatus::Draft),
            "posted" => Ok(JournalStatus::Posted),
            other => Err(format!("unknown journal status: {other}")),
        }
    }
}

/// A single debit/credit line belonging to one journal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalLine {
    pub line_id: String,
    pub journal_id: String,
    pub account: String,
    pub description: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Incoming line payload for the upsert-by-diff operation. A `line_id`
/// matching a stored line updates it in place; anything else gets a freshly
/// minted id.
#[derive(Clone, Debug, Deserialize)]
pub struct LineInput {
    pub line_id: Option<String>,
    pub account: String,
    pub description: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Next id to mint for a journal: one past the largest purely-numeric line id.
/// Caller-supplied composite ids are ignored by the max computation.
pub fn next_line_number(existing: &[JournalLine]) -> u64 {
    existing
        .iter()
        .filter_map(|line| line.line_id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

/// Full-replacement reconciliation: the returned set is exactly
/// {updated lines} ∪ {newly inserted lines}. Stored lines whose id is not
/// retained by `incoming` are dropped. Line ids stay unique within the
/// result: a payload repeating the same retained id collapses to the last
/// occurrence.
pub fn reconcile_lines(
    journal_id: &str,
    existing: &[JournalLine],
    incoming: Vec<LineInput>,
) -> Vec<JournalLine> {
    let by_id: HashMap<&str, &JournalLine> = existing
        .iter()
        .map(|line| (line.line_id.as_str(), line))
        .collect();
    let mut next_number = next_line_number(existing);

    let mut result: Vec<JournalLine> = Vec::with_capacity(incoming.len());
    let mut slot_by_id: HashMap<String, usize> = HashMap::new();
    for input in incoming {
        let line_id = match input.line_id.as_deref().and_then(|id| by_id.get(id)) {
            Some(stored) => stored.line_id.clone(),
            None => {
                // Minted ids exceed every numeric id in `existing`, so they
                // cannot collide with a retained one.
                let line_id = next_number.to_string();
                next_number += 1;
                line_id
            }
        };
        let line = JournalLine {
            line_id,
            journal_id: journal_id.to_string(),
            account: input.account,
            description: input.description,
            debit: input.debit,
            credit: input.credit,
        };
        match slot_by_id.get(&line.line_id) {
            Some(&slot) => result[slot] = line,
            None => {
                slot_by_id.insert(line.line_id.clone(), result.len());
                result.push(line);
            }
        }
    }
    result
}

/// Stable line ordering: purely-numeric ids sort numerically and come before
/// caller-supplied composite ids, which sort lexicographically.
pub fn sort_lines(lines: &mut [JournalLine]) {
    lines.sort_by(|a, b| compare_line_ids(&a.line_id, &b.line_id));
}

fn compare_line_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
