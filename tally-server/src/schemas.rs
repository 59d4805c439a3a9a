//! Wire DTOs. Field names follow the original API contract (`journalID`,
//! `lineID`, `type`), so the serde renames here are deliberate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_ledger::{
    AccountType, JournalHeader, JournalLine, JournalStatus, LineInput, MainAccount, Page,
};

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub document_date: NaiveDate,
    #[serde(rename = "type")]
    pub journal_type: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct JournalBody {
    #[serde(rename = "journalID")]
    pub journal_id: String,
    pub document_date: NaiveDate,
    #[serde(rename = "type")]
    pub journal_type: String,
    pub description: String,
    pub status: JournalStatus,
}

impl From<JournalHeader> for JournalBody {
    fn from(header: JournalHeader) -> Self {
        Self {
            journal_id: header.journal_id,
            document_date: header.document_date,
            journal_type: header.journal_type,
            description: header.description,
            status: header.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJournalsQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JournalPageBody {
    pub items: Vec<JournalBody>,
    pub has_next: bool,
    pub next_cursor: Option<String>,
    pub limit: usize,
}

impl From<Page<JournalHeader>> for JournalPageBody {
    fn from(page: Page<JournalHeader>) -> Self {
        Self {
            items: page.items.into_iter().map(JournalBody::from).collect(),
            has_next: page.has_next,
            next_cursor: page.next_cursor,
            limit: page.limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineBody {
    #[serde(rename = "lineID")]
    pub line_id: String,
    #[serde(rename = "journalID")]
    pub journal_id: String,
    pub account: String,
    pub description: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl From<JournalLine> for LineBody {
    fn from(line: JournalLine) -> Self {
        Self {
            line_id: line.line_id,
            journal_id: line.journal_id,
            account: line.account,
            description: line.description,
            debit: line.debit,
            credit: line.credit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LineUpsertBody {
    #[serde(rename = "lineID")]
    pub line_id: Option<String>,
    pub account: String,
    pub description: Option<String>,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

impl From<LineUpsertBody> for LineInput {
    fn from(body: LineUpsertBody) -> Self {
        Self {
            line_id: body.line_id,
            account: body.account,
            description: body.description,
            debit: body.debit,
            credit: body.credit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account: String,
    pub description: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub category: Option<String>,
}

impl From<CreateAccountRequest> for MainAccount {
    fn from(body: CreateAccountRequest) -> Self {
        let mut account = MainAccount::new(body.account, body.description, body.account_type);
        account.category = body.category;
        account
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountsRequest {
    pub accounts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedBody {
    pub deleted: usize,
}
