use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

use crate::{
    balance, cursor, AccountCombination, AccountInsert, AccountStore, DimensionStore,
    DimensionValue, EntryStore, FinancialDimension, GlEntry, JournalHeader, JournalLine,
    JournalStore, LedgerError, LedgerResult, LedgerStore, LineInput, MainAccount, Page,
    PageCursor, SequenceGenerator, TrialBalanceRow,
};

/// Sequence prefix for general journal identifiers.
pub const JOURNAL_PREFIX: &str = "GJ";

/// Facade over a [`LedgerStore`]: owns id generation and cursor handling so
/// callers only ever see domain values and opaque tokens.
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    sequences: SequenceGenerator,
}

impl Ledger {
    /// Wraps a store, resuming the journal sequence from the highest
    /// persisted journal id.
    pub fn open(store: Arc<dyn LedgerStore>) -> LedgerResult<Self> {
        let sequences = SequenceGenerator::bootstrap(store.as_ref(), JOURNAL_PREFIX)?;
        Ok(Self { store, sequences })
    }

    pub fn with_sequences(store: Arc<dyn LedgerStore>, sequences: SequenceGenerator) -> Self {
        Self { store, sequences }
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn create_journal(
        &self,
        document_date: NaiveDate,
        journal_type: impl Into<String>,
        description: impl Into<String>,
    ) -> LedgerResult<JournalHeader> {
        let journal_id = self.sequences.next(JOURNAL_PREFIX);
        let header = self.store.insert_journal(JournalHeader::draft(
            journal_id,
            document_date,
            journal_type,
            description,
        ))?;
        info!(journal_id = %header.journal_id, "created draft journal");
        Ok(header)
    }

    pub fn journal(&self, journal_id: &str) -> LedgerResult<JournalHeader> {
        self.store
            .journal(journal_id)?
            .ok_or_else(|| LedgerError::not_found("journal", journal_id))
    }

    /// One page of headers, newest first. The cursor is opaque; a malformed
    /// one starts from the top.
    pub fn journals(&self, limit: usize, cursor: Option<&str>) -> LedgerResult<Page<JournalHeader>> {
        let position = cursor::decode_cursor(cursor);
        let page = self.store.journal_page(limit, position.after_record)?;
        let next_cursor = if page.has_next {
            page.items
                .last()
                .map(|header| cursor::encode_cursor(&PageCursor::after(header.record_id)))
        } else {
            None
        };
        Ok(Page {
            items: page.items,
            has_next: page.has_next,
            next_cursor,
            limit,
        })
    }

    pub fn post_journal(&self, journal_id: &str) -> LedgerResult<JournalHeader> {
        let header = self.store.post_journal(journal_id)?;
        info!(journal_id, "posted journal");
        Ok(header)
    }

    pub fn lines(&self, journal_id: &str) -> LedgerResult<Vec<JournalLine>> {
        self.store.lines(journal_id)
    }

    /// Replace-by-diff over an existing journal's lines. Fails with
    /// `NotFound` when the journal header does not exist.
    pub fn upsert_lines(
        &self,
        journal_id: &str,
        incoming: Vec<LineInput>,
    ) -> LedgerResult<Vec<JournalLine>> {
        self.journal(journal_id)?;
        let result = self.store.upsert_lines(journal_id, incoming)?;
        debug!(journal_id, lines = result.len(), "reconciled journal lines");
        Ok(result)
    }

    pub fn delete_line(&self, journal_id: &str, line_id: &str) -> LedgerResult<bool> {
        self.store.delete_line(journal_id, line_id)
    }

    /// Checks whether a journal would post, without mutating anything.
    pub fn validate_journal(&self, journal_id: &str) -> LedgerResult<()> {
        self.journal(journal_id)?;
        let lines = self.store.lines(journal_id)?;
        balance::validate_balanced(journal_id, &lines)
    }

    /// Trial balance over `[from, to]` inclusive. `from` defaults to January
    /// 1 of the current year, `to` to today.
    pub fn trial_balance(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<TrialBalanceRow>> {
        let today = Utc::now().date_naive();
        let from = from
            .or_else(|| NaiveDate::from_ymd_opt(today.year(), 1, 1))
            .unwrap_or(today);
        let to = to.unwrap_or(today);
        let entries = self.store.entries_between(from, to)?;
        Ok(balance::trial_balance(&entries))
    }

    pub fn record_entries(&self, entries: &[GlEntry]) -> LedgerResult<()> {
        self.store.append_entries(entries)
    }

    pub fn accounts(&self) -> LedgerResult<Vec<MainAccount>> {
        self.store.accounts()
    }

    pub fn create_account(&self, account: MainAccount) -> LedgerResult<AccountInsert> {
        self.store.insert_account(account)
    }

    pub fn delete_accounts(&self, codes: &[String]) -> LedgerResult<usize> {
        self.store.delete_accounts(codes)
    }

    pub fn dimensions(&self) -> LedgerResult<Vec<FinancialDimension>> {
        self.store.dimensions()
    }

    pub fn update_dimension(
        &self,
        dimension: FinancialDimension,
    ) -> LedgerResult<FinancialDimension> {
        let id = dimension.id;
        self.store
            .update_dimension(dimension)?
            .ok_or_else(|| LedgerError::not_found("financial dimension", id.to_string()))
    }

    pub fn dimension_values(&self, dimension_id: u32) -> LedgerResult<Vec<DimensionValue>> {
        self.store.dimension_values(dimension_id)
    }

    pub fn add_dimension_value(
        &self,
        dimension_id: u32,
        value: DimensionValue,
    ) -> LedgerResult<()> {
        let code = value.code.clone();
        if self.store.insert_dimension_value(dimension_id, value)? {
            Ok(())
        } else {
            Err(LedgerError::DuplicateKey {
                entity: "dimension value",
                key: code,
            })
        }
    }

    pub fn delete_dimension_value(&self, dimension_id: u32, code: &str) -> LedgerResult<bool> {
        self.store.delete_dimension_value(dimension_id, code)
    }

    pub fn account_combinations(&self) -> LedgerResult<Vec<AccountCombination>> {
        self.store.account_combinations()
    }

    pub fn save_account_combinations(
        &self,
        combos: Vec<AccountCombination>,
    ) -> LedgerResult<()> {
        let count = combos.len();
        self.store.save_account_combinations(combos)?;
        debug!(count, "saved account combinations");
        Ok(())
    }
}
