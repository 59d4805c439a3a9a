use chrono::NaiveDate;

use crate::{
    AccountCombination, AccountInsert, DimensionValue, FinancialDimension, GlEntry, JournalHeader,
    JournalLine, LedgerResult, LineInput, MainAccount,
};

/// One fetched page of journal headers, before cursor encoding. The store
/// fetches `limit + 1` rows and trims the extra one to learn `has_next`
/// without a separate count query.
#[derive(Clone, Debug)]
pub struct JournalPage {
    pub items: Vec<JournalHeader>,
    pub has_next: bool,
}

/// Journal header + line storage.
pub trait JournalStore: Send + Sync {
    /// Persists a header, assigning its record id. The journal id must be
    /// unique; the sequence generator guarantees that for generated ids.
    fn insert_journal(&self, header: JournalHeader) -> LedgerResult<JournalHeader>;

    /// Absent is `None`, distinct from "exists with no lines".
    fn journal(&self, journal_id: &str) -> LedgerResult<Option<JournalHeader>>;

    /// Keyset page ordered by record id descending (newest first). With
    /// `after_record` set, only rows with a strictly smaller record id
    /// qualify.
    fn journal_page(&self, limit: usize, after_record: Option<i64>) -> LedgerResult<JournalPage>;

    /// Validates and posts in one atomic step: lookup, balance check, and the
    /// status write all happen under a single lock or transaction.
    fn post_journal(&self, journal_id: &str) -> LedgerResult<JournalHeader>;

    /// Largest numeric suffix among journal ids carrying `prefix`, used to
    /// re-seed the sequence generator on startup.
    fn latest_journal_number(&self, prefix: &str) -> LedgerResult<Option<u64>>;

    /// All lines for a journal, ordered by line id ascending.
    fn lines(&self, journal_id: &str) -> LedgerResult<Vec<JournalLine>>;

    /// Replace-by-diff: see [`crate::reconcile_lines`] for the contract.
    fn upsert_lines(
        &self,
        journal_id: &str,
        incoming: Vec<LineInput>,
    ) -> LedgerResult<Vec<JournalLine>>;

    /// Low-level full-set write used by fixtures and imports; line ids are
    /// stored verbatim, no reconciliation.
    fn replace_lines(&self, journal_id: &str, lines: Vec<JournalLine>) -> LedgerResult<()>;

    /// Removes one line; `false` when nothing matched.
    fn delete_line(&self, journal_id: &str, line_id: &str) -> LedgerResult<bool>;
}

/// Chart-of-accounts storage.
pub trait AccountStore: Send + Sync {
    fn accounts(&self) -> LedgerResult<Vec<MainAccount>>;

    /// Duplicate codes come back as [`AccountInsert::Duplicate`], leaving the
    /// store untouched.
    fn insert_account(&self, account: MainAccount) -> LedgerResult<AccountInsert>;

    /// Removes every account whose code appears in `codes`; returns how many
    /// were removed.
    fn delete_accounts(&self, codes: &[String]) -> LedgerResult<usize>;
}

/// Financial dimension + dimension value storage.
pub trait DimensionStore: Send + Sync {
    fn dimensions(&self) -> LedgerResult<Vec<FinancialDimension>>;

    /// Creates or overwrites a dimension slot. The update path below only
    /// touches slots that already exist.
    fn insert_dimension(&self, dimension: FinancialDimension) -> LedgerResult<()>;

    /// Replaces the slot with a matching id; `None` when the id is unknown.
    fn update_dimension(
        &self,
        dimension: FinancialDimension,
    ) -> LedgerResult<Option<FinancialDimension>>;

    fn dimension_values(&self, dimension_id: u32) -> LedgerResult<Vec<DimensionValue>>;

    /// `false` when the code already exists within the dimension.
    fn insert_dimension_value(
        &self,
        dimension_id: u32,
        value: DimensionValue,
    ) -> LedgerResult<bool>;

    fn delete_dimension_value(&self, dimension_id: u32, code: &str) -> LedgerResult<bool>;

    /// Every stored combination, grouped by account.
    fn account_combinations(&self) -> LedgerResult<Vec<AccountCombination>>;

    /// Appends combinations under their accounts; existing ones are kept.
    fn save_account_combinations(&self, combos: Vec<AccountCombination>) -> LedgerResult<()>;
}

/// Append-only GL entry storage feeding the trial balance.
pub trait EntryStore: Send + Sync {
    /// Persist a single entry.
    fn append_entry(&self, entry: &GlEntry) -> LedgerResult<()> {
        self.append_entries(std::slice::from_ref(entry))
    }

    /// Persist a group of entries atomically.
    fn append_entries(&self, entries: &[GlEntry]) -> LedgerResult<()>;

    /// Entries with `journal_date` in the inclusive range `[from, to]`, in
    /// insertion order.
    fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> LedgerResult<Vec<GlEntry>>;
}

/// Everything the ledger facade needs from a backend.
pub trait LedgerStore: JournalStore + AccountStore + DimensionStore + EntryStore {}

impl<T: JournalStore + AccountStore + DimensionStore + EntryStore> LedgerStore for T {}
