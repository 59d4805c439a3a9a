use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;

use crate::{
    balance, journal, AccountCombination, AccountInsert, AccountStore, DimensionStore,
    DimensionValue, EntryStore, FinancialDimension, GlEntry, JournalHeader, JournalLine,
    JournalPage, JournalStatus, JournalStore, LedgerError, LedgerResult, LineInput, MainAccount,
};

#[derive(Default)]
struct Inner {
    journals: Vec<JournalHeader>,
    lines: HashMap<String, Vec<JournalLine>>,
    accounts: Vec<MainAccount>,
    dimensions: Vec<FinancialDimension>,
    dimension_values: BTreeMap<u32, Vec<DimensionValue>>,
    account_combinations: BTreeMap<String, Vec<AccountCombination>>,
    entries: Vec<GlEntry>,
    next_record: i64,
}

/// In-memory backend. A single `RwLock` guards all collections, which also
/// makes the read-validate-write posting sequence atomic.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: RwLock<Inner>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JournalStore for MemoryLedgerStore {
    fn insert_journal(&self, header: JournalHeader) -> LedgerResult<JournalHeader> {
        let mut inner = self.inner.write();
        inner.next_record += 1;
        let header = header.with_record(inner.next_record);
        inner.journals.push(header.clone());
        Ok(header)
    }

    fn journal(&self, journal_id: &str) -> LedgerResult<Option<JournalHeader>> {
        let inner = self.inner.read();
        Ok(inner
            .journals
            .iter()
            .find(|header| header.journal_id == journal_id)
            .cloned())
    }

    fn journal_page(&self, limit: usize, after_record: Option<i64>) -> LedgerResult<JournalPage> {
        let inner = self.inner.read();
        // Journals are held in insertion order, so record ids ascend; walk
        // backwards for the newest-first ordering.
        let mut items: Vec<JournalHeader> = inner
            .journals
            .iter()
            .rev()
            .filter(|header| after_record.map_or(true, |after| header.record_id < after))
            .take(limit + 1)
            .cloned()
            .collect();
        let has_next = items.len() > limit;
        items.truncate(limit);
        Ok(JournalPage { items, has_next })
    }

    fn post_journal(&self, journal_id: &str) -> LedgerResult<JournalHeader> {
        let mut inner = self.inner.write();
        let lines = inner.lines.get(journal_id).cloned().unwrap_or_default();
        let header = inner
            .journals
            .iter_mut()
            .find(|header| header.journal_id == journal_id)
            .ok_or_else(|| LedgerError::not_found("journal", journal_id))?;
        balance::validate_balanced(journal_id, &lines)?;
        header.status = JournalStatus::Posted;
        header.posted_at = Some(Utc::now());
        Ok(header.clone())
    }

    fn latest_journal_number(&self, prefix: &str) -> LedgerResult<Option<u64>> {
        let inner = self.inner.read();
        let tag = format!("{prefix}-");
        Ok(inner
            .journals
            .iter()
            .filter_map(|header| header.journal_id.strip_prefix(&tag))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max())
    }

    fn lines(&self, journal_id: &str) -> LedgerResult<Vec<JournalLine>> {
        let inner = self.inner.read();
        let mut lines = inner.lines.get(journal_id).cloned().unwrap_or_default();
        journal::sort_lines(&mut lines);
        Ok(lines)
    }

    fn upsert_lines(
        &self,
        journal_id: &str,
        incoming: Vec<LineInput>,
    ) -> LedgerResult<Vec<JournalLine>> {
        let mut inner = self.inner.write();
        let existing = inner.lines.get(journal_id).cloned().unwrap_or_default();
        let result = journal::reconcile_lines(journal_id, &existing, incoming);
        inner.lines.insert(journal_id.to_string(), result.clone());
        Ok(result)
    }

    fn replace_lines(&self, journal_id: &str, lines: Vec<JournalLine>) -> LedgerResult<()> {
        self.inner
            .write()
            .lines
            .insert(journal_id.to_string(), lines);
        Ok(())
    }

    fn delete_line(&self, journal_id: &str, line_id: &str) -> LedgerResult<bool> {
        let mut inner = self.inner.write();
        let Some(lines) = inner.lines.get_mut(journal_id) else {
            return Ok(false);
        };
        let before = lines.len();
        lines.retain(|line| line.line_id != line_id);
        Ok(lines.len() < before)
    }
}

impl AccountStore for MemoryLedgerStore {
    fn accounts(&self) -> LedgerResult<Vec<MainAccount>> {
        Ok(self.inner.read().accounts.clone())
    }

    fn insert_account(&self, account: MainAccount) -> LedgerResult<AccountInsert> {
        let mut inner = self.inner.write();
        if inner.accounts.iter().any(|a| a.account == account.account) {
            return Ok(AccountInsert::Duplicate);
        }
        inner.next_record += 1;
        let account = MainAccount {
            record_id: inner.next_record,
            ..account
        };
        inner.accounts.push(account.clone());
        Ok(AccountInsert::Created(account))
    }

    fn delete_accounts(&self, codes: &[String]) -> LedgerResult<usize> {
        let mut inner = self.inner.write();
        let before = inner.accounts.len();
        inner
            .accounts
            .retain(|account| !codes.contains(&account.account));
        Ok(before - inner.accounts.len())
    }
}

impl DimensionStore for MemoryLedgerStore {
    fn dimensions(&self) -> LedgerResult<Vec<FinancialDimension>> {
        Ok(self.inner.read().dimensions.clone())
    }

    fn insert_dimension(&self, dimension: FinancialDimension) -> LedgerResult<()> {
        let mut inner = self.inner.write();
        match inner.dimensions.iter_mut().find(|d| d.id == dimension.id) {
            Some(slot) => *slot = dimension,
            None => inner.dimensions.push(dimension),
        }
        Ok(())
    }

    fn update_dimension(
        &self,
        dimension: FinancialDimension,
    ) -> LedgerResult<Option<FinancialDimension>> {
        let mut inner = self.inner.write();
        match inner.dimensions.iter_mut().find(|d| d.id == dimension.id) {
            Some(slot) => {
                *slot = dimension.clone();
                Ok(Some(dimension))
            }
            None => Ok(None),
        }
    }

    fn dimension_values(&self, dimension_id: u32) -> LedgerResult<Vec<DimensionValue>> {
        let inner = self.inner.read();
        Ok(inner
            .dimension_values
            .get(&dimension_id)
            .cloned()
            .unwrap_or_default())
    }

    fn insert_dimension_value(
        &self,
        dimension_id: u32,
        value: DimensionValue,
    ) -> LedgerResult<bool> {
        let mut inner = self.inner.write();
        let values = inner.dimension_values.entry(dimension_id).or_default();
        if values.iter().any(|v| v.code == value.code) {
            return Ok(false);
        }
        values.push(value);
        Ok(true)
    }

    fn delete_dimension_value(&self, dimension_id: u32, code: &str) -> LedgerResult<bool> {
        let mut inner = self.inner.write();
        let Some(values) = inner.dimension_values.get_mut(&dimension_id) else {
            return Ok(false);
        };
        let before = values.len();
        values.retain(|value| value.code != code);
        Ok(values.len() < before)
    }

    fn account_combinations(&self) -> LedgerResult<Vec<AccountCombination>> {
        let inner = self.inner.read();
        Ok(inner
            .account_combinations
            .values()
            .flatten()
            .cloned()
            .collect())
    }

    fn save_account_combinations(&self, combos: Vec<AccountCombination>) -> LedgerResult<()> {
        let mut inner = self.inner.write();
        for combo in combos {
            inner
                .account_combinations
                .entry(combo.account.clone())
                .or_default()
                .push(combo);
        }
        Ok(())
    }
}

impl EntryStore for MemoryLedgerStore {
    fn append_entries(&self, entries: &[GlEntry]) -> LedgerResult<()> {
        self.inner.write().entries.extend_from_slice(entries);
        Ok(())
    }

    fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> LedgerResult<Vec<GlEntry>> {
        let inner = self.inner.read();
        Ok(inner
            .entries
            .iter()
            .filter(|entry| entry.journal_date >= from && entry.journal_date <= to)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountType;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with_journals(count: usize) -> MemoryLedgerStore {
        let store = MemoryLedgerStore::new();
        for i in 0..count {
            store
                .insert_journal(JournalHeader::draft(
                    format!("GJ-{:06}", i + 1),
                    date(2025, 1, 1),
                    "Accrual",
                    "test",
                ))
                .unwrap();
        }
        store
    }

    fn balanced_input(amount: rust_decimal::Decimal) -> Vec<LineInput> {
        vec![
            LineInput {
                line_id: None,
                account: "5000".to_string(),
                description: None,
                debit: amount,
                credit: dec!(0),
            },
            LineInput {
                line_id: None,
                account: "2000".to_string(),
                description: None,
                debit: dec!(0),
                credit: amount,
            },
        ]
    }

    #[test]
    fn page_of_two_over_four_has_next_then_ends() {
        let store = store_with_journals(4);

        let first = store.journal_page(2, None).unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_next);
        assert_eq!(first.items[0].journal_id, "GJ-000004");

        let after = first.items.last().unwrap().record_id;
        let second = store.journal_page(2, Some(after)).unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(!second.has_next);
        assert_eq!(second.items[1].journal_id, "GJ-000001");
    }

    #[test]
    fn posting_balanced_journal_transitions_to_posted() {
        let store = store_with_journals(1);
        store
            .upsert_lines("GJ-000001", balanced_input(dec!(3000.00)))
            .unwrap();
        let posted = store.post_journal("GJ-000001").unwrap();
        assert_eq!(posted.status, JournalStatus::Posted);
        assert!(posted.posted_at.is_some());
    }

    #[test]
    fn posting_unbalanced_journal_leaves_status_unchanged() {
        let store = store_with_journals(1);
        store
            .upsert_lines(
                "GJ-000001",
                vec![LineInput {
                    line_id: None,
                    account: "1000".to_string(),
                    description: None,
                    debit: dec!(100),
                    credit: dec!(0),
                }],
            )
            .unwrap();
        assert!(store.post_journal("GJ-000001").is_err());
        let header = store.journal("GJ-000001").unwrap().unwrap();
        assert_eq!(header.status, JournalStatus::Draft);
    }

    #[test]
    fn posting_missing_journal_is_not_found() {
        let store = MemoryLedgerStore::new();
        let err = store.post_journal("GJ-999999").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn delete_line_reports_whether_anything_matched() {
        let store = store_with_journals(1);
        store
            .upsert_lines("GJ-000001", balanced_input(dec!(50)))
            .unwrap();
        assert!(store.delete_line("GJ-000001", "1").unwrap());
        assert!(!store.delete_line("GJ-000001", "1").unwrap());
        assert!(!store.delete_line("GJ-000404", "1").unwrap());
    }

    #[test]
    fn upsert_with_repeated_id_stores_a_single_line() {
        let store = store_with_journals(1);
        store
            .upsert_lines("GJ-000001", balanced_input(dec!(100)))
            .unwrap();
        store
            .upsert_lines(
                "GJ-000001",
                vec![
                    LineInput {
                        line_id: Some("1".to_string()),
                        account: "5000".to_string(),
                        description: None,
                        debit: dec!(100),
                        credit: dec!(0),
                    },
                    LineInput {
                        line_id: Some("1".to_string()),
                        account: "5000".to_string(),
                        description: None,
                        debit: dec!(250),
                        credit: dec!(0),
                    },
                ],
            )
            .unwrap();
        let lines = store.lines("GJ-000001").unwrap();
        let ids: Vec<&str> = lines.iter().map(|l| l.line_id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(lines[0].debit, dec!(250));
    }

    #[test]
    fn duplicate_account_leaves_count_unchanged() {
        let store = MemoryLedgerStore::new();
        let cash = MainAccount::new("1000", "Cash", AccountType::Asset);
        assert!(matches!(
            store.insert_account(cash.clone()).unwrap(),
            AccountInsert::Created(_)
        ));
        assert!(matches!(
            store.insert_account(cash).unwrap(),
            AccountInsert::Duplicate
        ));
        assert_eq!(store.accounts().unwrap().len(), 1);
    }

    #[test]
    fn dimension_value_codes_are_unique_per_dimension() {
        let store = MemoryLedgerStore::new();
        let value = DimensionValue {
            code: "01".to_string(),
            description: "Marketing".to_string(),
        };
        assert!(store.insert_dimension_value(1, value.clone()).unwrap());
        assert!(!store.insert_dimension_value(1, value.clone()).unwrap());
        // The same code under another dimension is fine.
        assert!(store.insert_dimension_value(8, value).unwrap());
    }

    #[test]
    fn account_combinations_append_under_their_account() {
        let store = MemoryLedgerStore::new();
        let combo = |account: &str, code: &str| AccountCombination {
            account: account.to_string(),
            dimensions: [("FD_1".to_string(), Some(code.to_string()))]
                .into_iter()
                .collect(),
        };
        store
            .save_account_combinations(vec![combo("5000", "02"), combo("4000", "01")])
            .unwrap();
        store
            .save_account_combinations(vec![combo("4000", "02")])
            .unwrap();

        let combos = store.account_combinations().unwrap();
        let accounts: Vec<&str> = combos.iter().map(|c| c.account.as_str()).collect();
        assert_eq!(accounts, vec!["4000", "4000", "5000"]);
        assert_eq!(combos[1].dimensions["FD_1"], Some("02".to_string()));
    }

    #[test]
    fn latest_journal_number_ignores_other_prefixes() {
        let store = store_with_journals(3);
        store
            .insert_journal(JournalHeader::draft(
                "PO-000009",
                date(2025, 2, 1),
                "Purchase",
                "other prefix",
            ))
            .unwrap();
        assert_eq!(store.latest_journal_number("GJ").unwrap(), Some(3));
        assert_eq!(store.latest_journal_number("INV").unwrap(), None);
    }

    #[test]
    fn entries_between_is_inclusive() {
        let store = MemoryLedgerStore::new();
        let entries = vec![
            GlEntry::new(date(2025, 1, 1), "1000", "Cash", dec!(1), dec!(0)),
            GlEntry::new(date(2025, 6, 15), "1000", "Cash", dec!(2), dec!(0)),
            GlEntry::new(date(2024, 12, 31), "1000", "Cash", dec!(4), dec!(0)),
        ];
        store.append_entries(&entries).unwrap();
        let hits = store
            .entries_between(date(2025, 1, 1), date(2025, 6, 15))
            .unwrap();
        assert_eq!(hits.len(), 2);
    }
}
