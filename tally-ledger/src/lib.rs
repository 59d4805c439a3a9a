//! General-ledger primitives and storage backends used by the Tally backend.

mod account;
mod balance;
mod cursor;
mod dimension;
mod entry;
mod error;
mod journal;
mod memory;
mod repository;
mod sequence;
mod service;
mod sqlite;

pub use account::{AccountInsert, AccountType, MainAccount};
pub use balance::{trial_balance, validate_balanced};
pub use cursor::{decode_cursor, encode_cursor, Page, PageCursor};
pub use dimension::{AccountCombination, DimensionValue, FinancialDimension};
pub use entry::{GlEntry, TrialBalanceRow};
pub use error::{LedgerError, LedgerResult};
pub use journal::{
    next_line_number, reconcile_lines, sort_lines, JournalHeader, JournalLine, JournalStatus,
    LineInput,
};
pub use memory::MemoryLedgerStore;
pub use repository::{
    AccountStore, DimensionStore, EntryStore, JournalPage, JournalStore, LedgerStore,
};
pub use sequence::{SequenceGenerator, DEFAULT_SEQUENCE_WIDTH};
pub use service::{Ledger, JOURNAL_PREFIX};
pub use sqlite::SqliteLedgerStore;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn draft_to_posted_end_to_end() {
        let ledger = Ledger::open(Arc::new(MemoryLedgerStore::new())).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let header = ledger
            .create_journal(date, "Accrual", "Accrual for utilities")
            .unwrap();
        assert_eq!(header.journal_id, "GJ-000001");
        assert_eq!(header.status, JournalStatus::Draft);

        // Unbalanced: posting must fail and carry both totals.
        ledger
            .upsert_lines(
                &header.journal_id,
                vec![
                    LineInput {
                        line_id: None,
                        account: "5000".to_string(),
                        description: Some("Utilities expense".to_string()),
                        debit: dec!(10000.00),
                        credit: dec!(0),
                    },
                    LineInput {
                        line_id: None,
                        account: "2000".to_string(),
                        description: Some("Accrued utilities payable".to_string()),
                        debit: dec!(0),
                        credit: dec!(9999.99),
                    },
                ],
            )
            .unwrap();
        match ledger.post_journal(&header.journal_id).unwrap_err() {
            LedgerError::Unbalanced {
                debits, credits, ..
            } => {
                assert_eq!(debits, dec!(10000.00));
                assert_eq!(credits, dec!(9999.99));
            }
            other => panic!("expected Unbalanced, got {other:?}"),
        }

        // Fix the credit line and post.
        let lines = ledger.lines(&header.journal_id).unwrap();
        let inputs: Vec<LineInput> = lines
            .iter()
            .map(|line| LineInput {
                line_id: Some(line.line_id.clone()),
                account: line.account.clone(),
                description: line.description.clone(),
                debit: line.debit,
                credit: if line.credit.is_zero() {
                    line.credit
                } else {
                    dec!(10000.00)
                },
            })
            .collect();
        ledger.upsert_lines(&header.journal_id, inputs).unwrap();

        let posted = ledger.post_journal(&header.journal_id).unwrap();
        assert_eq!(posted.status, JournalStatus::Posted);
    }
}
