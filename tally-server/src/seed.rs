//! Demo fixtures: a small chart of accounts, the eight dimension slots, and
//! a year of sample activity. Applied only to an empty store when
//! `store.seed_demo` is enabled.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_ledger::{
    AccountCombination, AccountStore, AccountType, DimensionStore, DimensionValue, EntryStore,
    FinancialDimension, GlEntry, JournalHeader, JournalLine, JournalStatus, JournalStore,
    LedgerResult, LedgerStore, MainAccount,
};

/// Number of journals the demo creates; the journal sequence resumes after
/// this via the normal bootstrap scan.
pub const DEMO_JOURNAL_COUNT: u64 = 4;

pub fn apply(store: &dyn LedgerStore) -> LedgerResult<()> {
    seed_accounts(store)?;
    seed_dimensions(store)?;
    seed_combinations(store)?;
    seed_entries(store)?;
    seed_journals(store)?;
    Ok(())
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // All demo dates are valid literals.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn seed_accounts(store: &dyn LedgerStore) -> LedgerResult<()> {
    let accounts = [
        ("1000", "Cash", AccountType::Asset),
        ("2000", "Accounts Payable", AccountType::Liability),
        ("3000", "Retained Earnings", AccountType::Equity),
        ("4000", "Sales Revenue", AccountType::Revenue),
        ("5000", "Cost of Goods Sold", AccountType::Expense),
    ];
    for (code, description, account_type) in accounts {
        store.insert_account(MainAccount::new(code, description, account_type))?;
    }
    Ok(())
}

fn seed_dimensions(store: &dyn LedgerStore) -> LedgerResult<()> {
    let slots = [
        (1, "Department", true),
        (2, "Cost Center", true),
        (3, "", false),
        (4, "Project", true),
        (5, "", false),
        (6, "", false),
        (7, "", false),
        (8, "Region", true),
    ];
    for (id, name, in_use) in slots {
        store.insert_dimension(FinancialDimension {
            id,
            name: name.to_string(),
            in_use,
        })?;
    }
    let values = [
        (1, "01", "Marketing"),
        (1, "02", "Finance"),
        (2, "100", "West Coast"),
        (2, "200", "East Coast"),
        (8, "01", "Northwest"),
        (8, "02", "Southwest"),
    ];
    for (dimension_id, code, description) in values {
        store.insert_dimension_value(
            dimension_id,
            DimensionValue {
                code: code.to_string(),
                description: description.to_string(),
            },
        )?;
    }
    Ok(())
}

fn seed_combinations(store: &dyn LedgerStore) -> LedgerResult<()> {
    let combos = vec![
        combination("4000", &[(1, "01"), (2, "100"), (8, "01")]),
        combination("5000", &[(1, "02"), (2, "200"), (8, "02")]),
    ];
    store.save_account_combinations(combos)
}

/// Builds a combination covering all eight slots; slots absent from `tags`
/// stay empty.
fn combination(account: &str, tags: &[(u32, &str)]) -> AccountCombination {
    let dimensions = (1..=8u32)
        .map(|slot| {
            let code = tags
                .iter()
                .find(|(id, _)| *id == slot)
                .map(|(_, code)| (*code).to_string());
            (format!("FD_{slot}"), code)
        })
        .collect();
    AccountCombination {
        account: account.to_string(),
        dimensions,
    }
}

fn seed_entries(store: &dyn LedgerStore) -> LedgerResult<()> {
    let entries = vec![
        gl(date(2025, 7, 14), "1000", "Cash", money(10_000_00), money(0), "AR-001", "Customer payment received", "Accounts Receivable"),
        gl(date(2025, 7, 14), "4000", "Sales Revenue", money(0), money(10_000_00), "AR-001", "Revenue from sale", "Accounts Receivable"),
        gl(date(2025, 7, 15), "5000", "Cost of Goods Sold", money(4_000_00), money(0), "COGS-2025-01", "Cost of sold inventory", "Inventory"),
        gl(date(2025, 1, 15), "1000", "Cash", money(0), money(4_000_00), "COGS-2025-01", "Inventory purchase payment", "Inventory"),
        gl(date(2024, 12, 30), "1000", "Cash", money(8_000_00), money(0), "AR-2024-001", "End-of-year payment", "Accounts Receivable"),
        gl(date(2024, 12, 30), "4000", "Sales Revenue", money(0), money(8_000_00), "AR-2024-001", "End-of-year revenue", "Accounts Receivable"),
        gl(date(2024, 11, 15), "2000", "Accounts Payable", money(0), money(5_000_00), "AP-2024-015", "Vendor invoice", "Accounts Payable"),
        gl(date(2024, 11, 15), "5000", "Cost of Goods Sold", money(5_000_00), money(0), "AP-2024-015", "Inventory expense", "Accounts Payable"),
    ];
    store.append_entries(&entries)
}

#[allow(clippy::too_many_arguments)]
fn gl(
    journal_date: NaiveDate,
    account: &str,
    name: &str,
    debit: Decimal,
    credit: Decimal,
    reference: &str,
    description: &str,
    source: &str,
) -> GlEntry {
    let mut entry = GlEntry::new(journal_date, account, name, debit, credit)
        .with_reference(reference)
        .with_source(source);
    entry.description = description.to_string();
    entry.posted_by = "admin".to_string();
    entry
}

fn seed_journals(store: &dyn LedgerStore) -> LedgerResult<()> {
    let journals = [
        ("GJ-000001", date(2025, 1, 1), "Opening", "Opening balances for new fiscal year", JournalStatus::Posted),
        ("GJ-000002", date(2025, 1, 15), "Accrual", "Accrual for utilities", JournalStatus::Posted),
        ("GJ-000003", date(2025, 2, 1), "Payroll", "January payroll expenses", JournalStatus::Draft),
        ("GJ-000004", date(2025, 2, 10), "Adjustment", "Reclassify office supply expenses", JournalStatus::Posted),
    ];
    for (journal_id, document_date, journal_type, description, status) in journals {
        let mut header = JournalHeader::draft(journal_id, document_date, journal_type, description);
        header.status = status;
        store.insert_journal(header)?;
    }

    let lines = [
        ("GJ-000001", "JL-000001-01", "1000", "Opening cash balance", money(50_000_00), money(0)),
        ("GJ-000001", "JL-000001-02", "3000", "Opening retained earnings", money(0), money(50_000_00)),
        ("GJ-000002", "JL-000002-01", "5000", "Utilities expense", money(3_000_00), money(0)),
        ("GJ-000002", "JL-000002-02", "2000", "Accrued utilities payable", money(0), money(3_000_00)),
        ("GJ-000003", "JL-000003-01", "5000", "Payroll expense", money(10_000_00), money(0)),
        ("GJ-000003", "JL-000003-02", "1000", "Payroll disbursement", money(0), money(10_000_00)),
        ("GJ-000004", "JL-000004-01", "5000", "Reclassify supply expense", money(1_200_00), money(0)),
        ("GJ-000004", "JL-000004-02", "1000", "Adjust cash for reclass", money(0), money(1_200_00)),
    ];
    for (journal_id, _, _, _, _) in journals {
        let journal_lines: Vec<JournalLine> = lines
            .iter()
            .filter(|(owner, ..)| *owner == journal_id)
            .map(|(owner, line_id, account, description, debit, credit)| JournalLine {
                line_id: (*line_id).to_string(),
                journal_id: (*owner).to_string(),
                account: (*account).to_string(),
                description: Some((*description).to_string()),
                debit: *debit,
                credit: *credit,
            })
            .collect();
        store.replace_lines(journal_id, journal_lines)?;
    }
    Ok(())
}
