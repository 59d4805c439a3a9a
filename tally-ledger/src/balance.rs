use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{GlEntry, JournalLine, LedgerError, LedgerResult, TrialBalanceRow};

/// Checks that a journal's lines exist and balance. Pure read: no mutation
/// happens here, posting only proceeds when this returns `Ok`.
pub fn validate_balanced(journal_id: &str, lines: &[JournalLine]) -> LedgerResult<()> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyJournal {
            journal_id: journal_id.to_string(),
        });
    }
    let debits: Decimal = lines.iter().map(|line| line.debit).sum();
    let credits: Decimal = lines.iter().map(|line| line.credit).sum();
    if debits != credits {
        return Err(LedgerError::Unbalanced {
            journal_id: journal_id.to_string(),
            debits,
            credits,
        });
    }
    Ok(())
}

/// Rolls up GL entries into per-account debit/credit/balance totals.
/// Output preserves the order in which accounts first appear in `entries`;
/// the account name is taken from the first entry seen for that account.
pub fn trial_balance(entries: &[GlEntry]) -> Vec<TrialBalanceRow> {
    let mut rows: Vec<TrialBalanceRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let slot = match index.get(entry.account_number.as_str()) {
            Some(&slot) => slot,
            None => {
                rows.push(TrialBalanceRow {
                    account: entry.account_number.clone(),
                    name: entry.account_name.clone(),
                    debit: Decimal::ZERO,
                    credit: Decimal::ZERO,
                    balance: Decimal::ZERO,
                });
                index.insert(entry.account_number.as_str(), rows.len() - 1);
                rows.len() - 1
            }
        };
        let row = &mut rows[slot];
        row.debit += entry.debit;
        row.credit += entry.credit;
        row.balance += entry.debit - entry.credit;
    }

    rows
}
