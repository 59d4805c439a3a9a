use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    balance, journal, AccountCombination, AccountInsert, AccountStore, AccountType,
    DimensionStore, DimensionValue, EntryStore, FinancialDimension, GlEntry, JournalHeader,
    JournalLine, JournalPage, JournalStatus, JournalStore, LedgerError, LedgerResult, LineInput,
    MainAccount,
};

const LEDGER_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS general_journal_header (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    journal_id TEXT NOT NULL UNIQUE,
    document_date TEXT NOT NULL,
    journal_type TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    posted_at TEXT,
    company_id TEXT
);
CREATE TABLE IF NOT EXISTS general_journal_lines (
    journal_id TEXT NOT NULL,
    line_id TEXT NOT NULL,
    account TEXT NOT NULL,
    description TEXT,
    debit TEXT NOT NULL,
    credit TEXT NOT NULL,
    PRIMARY KEY (journal_id, line_id)
);
CREATE TABLE IF NOT EXISTS main_accounts (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    account TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    account_type TEXT NOT NULL,
    category TEXT,
    company_id TEXT
);
CREATE TABLE IF NOT EXISTS financial_dimensions (
    dimension_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    in_use INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS dimension_values (
    dimension_id INTEGER NOT NULL,
    code TEXT NOT NULL,
    description TEXT NOT NULL,
    PRIMARY KEY (dimension_id, code)
);
CREATE TABLE IF NOT EXISTS account_combinations (
    account TEXT NOT NULL,
    dimensions TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS gl_entries (
    entry_id TEXT PRIMARY KEY,
    journal_date TEXT NOT NULL,
    account_number TEXT NOT NULL,
    account_name TEXT NOT NULL,
    debit TEXT NOT NULL,
    credit TEXT NOT NULL,
    currency TEXT NOT NULL,
    financial_dimensions TEXT,
    reference TEXT NOT NULL,
    description TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT NOT NULL,
    posted_by TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS gl_entries_idx_journal_date
    ON gl_entries(journal_date);
"#;

const HEADER_COLUMNS: &str =
    "record_id, journal_id, document_date, journal_type, description, status, posted_at, company_id";

/// SQLite-backed ledger store. Opens one connection per operation; dates are
/// stored as ISO-8601 text (which sorts correctly) and money as decimal text.
#[derive(Clone, Debug)]
pub struct SqliteLedgerStore {
    path: PathBuf,
}

impl SqliteLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let store = Self { path: path.into() };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> LedgerResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(LEDGER_SCHEMA)?;
        Ok(())
    }

    fn connect(&self) -> LedgerResult<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        Ok(conn)
    }
}

impl JournalStore for SqliteLedgerStore {
    fn insert_journal(&self, header: JournalHeader) -> LedgerResult<JournalHeader> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO general_journal_header (
                journal_id, document_date, journal_type, description, status, posted_at, company_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                header.journal_id,
                header.document_date.to_string(),
                header.journal_type,
                header.description,
                header.status.as_str(),
                header.posted_at.map(|ts| ts.to_rfc3339()),
                header.company_id,
            ],
        )?;
        let record_id = conn.last_insert_rowid();
        Ok(header.with_record(record_id))
    }

    fn journal(&self, journal_id: &str) -> LedgerResult<Option<JournalHeader>> {
        let conn = self.connect()?;
        select_header(&conn, journal_id)
    }

    fn journal_page(&self, limit: usize, after_record: Option<i64>) -> LedgerResult<JournalPage> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {HEADER_COLUMNS}
             FROM general_journal_header
             WHERE (?1 IS NULL OR record_id < ?1)
             ORDER BY record_id DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![after_record, (limit + 1) as i64])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(row_to_header(row)?);
        }
        let has_next = items.len() > limit;
        items.truncate(limit);
        Ok(JournalPage { items, has_next })
    }

    fn post_journal(&self, journal_id: &str) -> LedgerResult<JournalHeader> {
        let mut conn = self.connect()?;
        // Lookup, validation, and the status write share one transaction so a
        // concurrent delete cannot slip between them.
        let tx = conn.transaction()?;
        let Some(mut header) = select_header(&tx, journal_id)? else {
            return Err(LedgerError::not_found("journal", journal_id));
        };
        let lines = select_lines(&tx, journal_id)?;
        balance::validate_balanced(journal_id, &lines)?;
        let posted_at = Utc::now();
        tx.execute(
            "UPDATE general_journal_header SET status = ?1, posted_at = ?2 WHERE journal_id = ?3",
            params![
                JournalStatus::Posted.as_str(),
                posted_at.to_rfc3339(),
                journal_id
            ],
        )?;
        tx.commit()?;
        header.status = JournalStatus::Posted;
        header.posted_at = Some(posted_at);
        Ok(header)
    }

    fn latest_journal_number(&self, prefix: &str) -> LedgerResult<Option<u64>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT journal_id FROM general_journal_header WHERE journal_id LIKE ?1 || '-%'",
        )?;
        let mut rows = stmt.query(params![prefix])?;
        let tag = format!("{prefix}-");
        let mut latest = None;
        while let Some(row) = rows.next()? {
            let journal_id: String = row.get(0)?;
            if let Some(number) = journal_id
                .strip_prefix(&tag)
                .and_then(|suffix| suffix.parse::<u64>().ok())
            {
                latest = latest.max(Some(number));
            }
        }
        Ok(latest)
    }

    fn lines(&self, journal_id: &str) -> LedgerResult<Vec<JournalLine>> {
        let conn = self.connect()?;
        select_lines(&conn, journal_id)
    }

    fn upsert_lines(
        &self,
        journal_id: &str,
        incoming: Vec<LineInput>,
    ) -> LedgerResult<Vec<JournalLine>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let existing = select_lines(&tx, journal_id)?;
        let result = journal::reconcile_lines(journal_id, &existing, incoming);
        // Full replacement: anything not re-sent is dropped, so clearing the
        // journal's lines and re-inserting the reconciled set is exact.
        tx.execute(
            "DELETE FROM general_journal_lines WHERE journal_id = ?1",
            params![journal_id],
        )?;
        for line in &result {
            tx.execute(
                "INSERT INTO general_journal_lines (
                    journal_id, line_id, account, description, debit, credit
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    line.journal_id,
                    line.line_id,
                    line.account,
                    line.description,
                    line.debit.to_string(),
                    line.credit.to_string(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(result)
    }

    fn replace_lines(&self, journal_id: &str, lines: Vec<JournalLine>) -> LedgerResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM general_journal_lines WHERE journal_id = ?1",
            params![journal_id],
        )?;
        for line in &lines {
            tx.execute(
                "INSERT INTO general_journal_lines (
                    journal_id, line_id, account, description, debit, credit
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    journal_id,
                    line.line_id,
                    line.account,
                    line.description,
                    line.debit.to_string(),
                    line.credit.to_string(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_line(&self, journal_id: &str, line_id: &str) -> LedgerResult<bool> {
        let conn = self.connect()?;
        let removed = conn.execute(
            "DELETE FROM general_journal_lines WHERE journal_id = ?1 AND line_id = ?2",
            params![journal_id, line_id],
        )?;
        Ok(removed > 0)
    }
}

impl AccountStore for SqliteLedgerStore {
    fn accounts(&self) -> LedgerResult<Vec<MainAccount>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT record_id, account, description, account_type, category, company_id
             FROM main_accounts ORDER BY record_id ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(row_to_account(row)?);
        }
        Ok(accounts)
    }

    fn insert_account(&self, account: MainAccount) -> LedgerResult<AccountInsert> {
        let conn = self.connect()?;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT record_id FROM main_accounts WHERE account = ?1",
                params![account.account],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Ok(AccountInsert::Duplicate);
        }
        conn.execute(
            "INSERT INTO main_accounts (account, description, account_type, category, company_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.account,
                account.description,
                account.account_type.as_str(),
                account.category,
                account.company_id,
            ],
        )?;
        let record_id = conn.last_insert_rowid();
        Ok(AccountInsert::Created(MainAccount {
            record_id,
            ..account
        }))
    }

    fn delete_accounts(&self, codes: &[String]) -> LedgerResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut removed = 0;
        for code in codes {
            removed += tx.execute("DELETE FROM main_accounts WHERE account = ?1", params![code])?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

impl DimensionStore for SqliteLedgerStore {
    fn dimensions(&self) -> LedgerResult<Vec<FinancialDimension>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT dimension_id, name, in_use FROM financial_dimensions ORDER BY dimension_id",
        )?;
        let mut rows = stmt.query([])?;
        let mut dimensions = Vec::new();
        while let Some(row) = rows.next()? {
            dimensions.push(FinancialDimension {
                id: row.get::<_, i64>(0)? as u32,
                name: row.get(1)?,
                in_use: row.get(2)?,
            });
        }
        Ok(dimensions)
    }

    fn insert_dimension(&self, dimension: FinancialDimension) -> LedgerResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO financial_dimensions (dimension_id, name, in_use)
             VALUES (?1, ?2, ?3)",
            params![dimension.id as i64, dimension.name, dimension.in_use],
        )?;
        Ok(())
    }

    fn update_dimension(
        &self,
        dimension: FinancialDimension,
    ) -> LedgerResult<Option<FinancialDimension>> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE financial_dimensions SET name = ?1, in_use = ?2 WHERE dimension_id = ?3",
            params![dimension.name, dimension.in_use, dimension.id as i64],
        )?;
        Ok((changed > 0).then_some(dimension))
    }

    fn dimension_values(&self, dimension_id: u32) -> LedgerResult<Vec<DimensionValue>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT code, description FROM dimension_values
             WHERE dimension_id = ?1 ORDER BY rowid ASC",
        )?;
        let mut rows = stmt.query(params![dimension_id as i64])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(DimensionValue {
                code: row.get(0)?,
                description: row.get(1)?,
            });
        }
        Ok(values)
    }

    fn insert_dimension_value(
        &self,
        dimension_id: u32,
        value: DimensionValue,
    ) -> LedgerResult<bool> {
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO dimension_values (dimension_id, code, description)
             VALUES (?1, ?2, ?3)",
            params![dimension_id as i64, value.code, value.description],
        )?;
        Ok(inserted > 0)
    }

    fn delete_dimension_value(&self, dimension_id: u32, code: &str) -> LedgerResult<bool> {
        let conn = self.connect()?;
        let removed = conn.execute(
            "DELETE FROM dimension_values WHERE dimension_id = ?1 AND code = ?2",
            params![dimension_id as i64, code],
        )?;
        Ok(removed > 0)
    }

    fn account_combinations(&self) -> LedgerResult<Vec<AccountCombination>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT account, dimensions FROM account_combinations
             ORDER BY account ASC, rowid ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut combos = Vec::new();
        while let Some(row) = rows.next()? {
            let account: String = row.get(0)?;
            let dimensions: String = row.get(1)?;
            combos.push(AccountCombination {
                account,
                dimensions: serde_json::from_str(&dimensions).map_err(|err| {
                    LedgerError::Serialization(format!("invalid combination: {err}"))
                })?,
            });
        }
        Ok(combos)
    }

    fn save_account_combinations(&self, combos: Vec<AccountCombination>) -> LedgerResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for combo in &combos {
            let dimensions = serde_json::to_string(&combo.dimensions)
                .map_err(|err| LedgerError::Serialization(err.to_string()))?;
            tx.execute(
                "INSERT INTO account_combinations (account, dimensions) VALUES (?1, ?2)",
                params![combo.account, dimensions],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl EntryStore for SqliteLedgerStore {
    fn append_entries(&self, entries: &[GlEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for entry in entries {
            let dimensions = if entry.financial_dimensions.is_empty() {
                None
            } else {
                Some(
                    serde_json::to_string(&entry.financial_dimensions)
                        .map_err(|err| LedgerError::Serialization(err.to_string()))?,
                )
            };
            tx.execute(
                "INSERT INTO gl_entries (
                    entry_id, journal_date, account_number, account_name, debit, credit,
                    currency, financial_dimensions, reference, description, source,
                    created_at, posted_by
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    entry.id.to_string(),
                    entry.journal_date.to_string(),
                    entry.account_number,
                    entry.account_name,
                    entry.debit.to_string(),
                    entry.credit.to_string(),
                    entry.currency,
                    dimensions,
                    entry.reference,
                    entry.description,
                    entry.source,
                    entry.created_at.to_rfc3339(),
                    entry.posted_by,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> LedgerResult<Vec<GlEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT entry_id, journal_date, account_number, account_name, debit, credit,
                    currency, financial_dimensions, reference, description, source,
                    created_at, posted_by
             FROM gl_entries
             WHERE journal_date >= ?1 AND journal_date <= ?2
             ORDER BY rowid ASC",
        )?;
        let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(row_to_entry(row)?);
        }
        Ok(entries)
    }
}

fn select_header(conn: &Connection, journal_id: &str) -> LedgerResult<Option<JournalHeader>> {
    let sql =
        format!("SELECT {HEADER_COLUMNS} FROM general_journal_header WHERE journal_id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![journal_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_header(row)?)),
        None => Ok(None),
    }
}

fn select_lines(conn: &Connection, journal_id: &str) -> LedgerResult<Vec<JournalLine>> {
    let mut stmt = conn.prepare(
        "SELECT journal_id, line_id, account, description, debit, credit
         FROM general_journal_lines WHERE journal_id = ?1",
    )?;
    let mut rows = stmt.query(params![journal_id])?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        lines.push(row_to_line(row)?);
    }
    journal::sort_lines(&mut lines);
    Ok(lines)
}

fn parse_decimal(raw: &str) -> LedgerResult<Decimal> {
    Decimal::from_str(raw)
        .map_err(|err| LedgerError::Serialization(format!("invalid decimal {raw}: {err}")))
}

fn parse_date(raw: &str) -> LedgerResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|err| LedgerError::Serialization(format!("invalid date {raw}: {err}")))
}

fn parse_timestamp(raw: &str) -> LedgerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| LedgerError::Serialization(format!("invalid timestamp {raw}: {err}")))
}

fn row_to_header(row: &rusqlite::Row<'_>) -> LedgerResult<JournalHeader> {
    let record_id: i64 = row.get(0)?;
    let journal_id: String = row.get(1)?;
    let document_date: String = row.get(2)?;
    let journal_type: String = row.get(3)?;
    let description: String = row.get(4)?;
    let status: String = row.get(5)?;
    let posted_at: Option<String> = row.get(6)?;
    let company_id: Option<String> = row.get(7)?;

    Ok(JournalHeader {
        journal_id,
        document_date: parse_date(&document_date)?,
        journal_type,
        description,
        status: JournalStatus::from_str(&status).map_err(LedgerError::Serialization)?,
        posted_at: posted_at.as_deref().map(parse_timestamp).transpose()?,
        company_id,
        record_id,
    })
}

fn row_to_line(row: &rusqlite::Row<'_>) -> LedgerResult<JournalLine> {
    let debit: String = row.get(4)?;
    let credit: String = row.get(5)?;
    Ok(JournalLine {
        journal_id: row.get(0)?,
        line_id: row.get(1)?,
        account: row.get(2)?,
        description: row.get(3)?,
        debit: parse_decimal(&debit)?,
        credit: parse_decimal(&credit)?,
    })
}

fn row_to_account(row: &rusqlite::Row<'_>) -> LedgerResult<MainAccount> {
    let account_type: String = row.get(3)?;
    Ok(MainAccount {
        record_id: row.get(0)?,
        account: row.get(1)?,
        description: row.get(2)?,
        account_type: AccountType::from_str(&account_type).map_err(LedgerError::Serialization)?,
        category: row.get(4)?,
        company_id: row.get(5)?,
    })
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> LedgerResult<GlEntry> {
    let entry_id: String = row.get(0)?;
    let journal_date: String = row.get(1)?;
    let debit: String = row.get(4)?;
    let credit: String = row.get(5)?;
    let dimensions: Option<String> = row.get(7)?;
    let created_at: String = row.get(11)?;

    Ok(GlEntry {
        id: Uuid::parse_str(&entry_id)
            .map_err(|err| LedgerError::Serialization(format!("invalid entry id: {err}")))?,
        journal_date: parse_date(&journal_date)?,
        account_number: row.get(2)?,
        account_name: row.get(3)?,
        debit: parse_decimal(&debit)?,
        credit: parse_decimal(&credit)?,
        currency: row.get(6)?,
        financial_dimensions: dimensions
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|err| LedgerError::Serialization(format!("invalid dimension tags: {err}")))?
            .unwrap_or_default(),
        reference: row.get(8)?,
        description: row.get(9)?,
        source: row.get(10)?,
        created_at: parse_timestamp(&created_at)?,
        posted_by: row.get(12)?,
    })
}
