// ═══════════════════════════════════════════════════════════════════
// Model Tests — signed effect rule, transfer direction, filters
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use pocketledger_core::models::account::Account;
use pocketledger_core::models::summary::{AccountRef, CategoryRef, LedgerTotals};
use pocketledger_core::models::transaction::{
    Recurrence, RecurringFrequency, Transaction, TransactionFilter, TransactionKind,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn transaction(kind: TransactionKind) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        amount: dec!(25.00),
        kind,
        date: date(2025, 2, 14),
        is_deleted: false,
        linked_leg: None,
        recurrence: None,
        created_at: now,
        updated_at: now,
    }
}

// ── Signed effect ───────────────────────────────────────────────────

#[test]
fn income_adds_to_the_owning_account() {
    assert_eq!(transaction(TransactionKind::Income).signed_effect(), dec!(25.00));
}

#[test]
fn expense_subtracts_from_the_owning_account() {
    assert_eq!(transaction(TransactionKind::Expense).signed_effect(), dec!(-25.00));
}

#[test]
fn transfer_out_leg_subtracts_money_leaving() {
    let tx = transaction(TransactionKind::TransferOut { to_account: Uuid::new_v4() });
    assert_eq!(tx.signed_effect(), dec!(-25.00));
}

#[test]
fn transfer_in_leg_adds_money_arriving() {
    let tx = transaction(TransactionKind::TransferIn { from_account: Uuid::new_v4() });
    assert_eq!(tx.signed_effect(), dec!(25.00));
}

#[test]
fn transfer_legs_of_one_pair_cancel_out() {
    let out_leg = transaction(TransactionKind::TransferOut { to_account: Uuid::new_v4() });
    let in_leg = transaction(TransactionKind::TransferIn { from_account: Uuid::new_v4() });
    assert_eq!(out_leg.signed_effect() + in_leg.signed_effect(), dec!(0));
}

// ── Transfer direction is structural ────────────────────────────────

#[test]
fn counterpart_account_comes_from_the_variant() {
    let other = Uuid::new_v4();
    let out_leg = transaction(TransactionKind::TransferOut { to_account: other });
    let in_leg = transaction(TransactionKind::TransferIn { from_account: other });
    assert_eq!(out_leg.counterpart_account(), Some(other));
    assert_eq!(in_leg.counterpart_account(), Some(other));
    assert_eq!(transaction(TransactionKind::Income).counterpart_account(), None);
    assert_eq!(transaction(TransactionKind::Expense).counterpart_account(), None);
}

#[test]
fn is_transfer_only_matches_transfer_variants() {
    assert!(TransactionKind::TransferOut { to_account: Uuid::new_v4() }.is_transfer());
    assert!(TransactionKind::TransferIn { from_account: Uuid::new_v4() }.is_transfer());
    assert!(!TransactionKind::Income.is_transfer());
    assert!(!TransactionKind::Expense.is_transfer());
}

// ── Filter semantics ────────────────────────────────────────────────

#[test]
fn default_filter_excludes_tombstones() {
    let mut tx = transaction(TransactionKind::Expense);
    assert!(TransactionFilter::default().matches(&tx));
    tx.is_deleted = true;
    assert!(!TransactionFilter::default().matches(&tx));

    let include = TransactionFilter { include_deleted: true, ..TransactionFilter::default() };
    assert!(include.matches(&tx));
}

#[test]
fn filter_date_range_is_inclusive_on_both_ends() {
    let tx = transaction(TransactionKind::Income);
    let exact = TransactionFilter {
        from: Some(tx.date),
        to: Some(tx.date),
        ..TransactionFilter::default()
    };
    assert!(exact.matches(&tx));

    let before = TransactionFilter { to: Some(date(2025, 2, 13)), ..TransactionFilter::default() };
    assert!(!before.matches(&tx));
    let after = TransactionFilter { from: Some(date(2025, 2, 15)), ..TransactionFilter::default() };
    assert!(!after.matches(&tx));
}

#[test]
fn filter_pins_account_and_category() {
    let tx = transaction(TransactionKind::Expense);
    let same = TransactionFilter { account_id: Some(tx.account_id), ..TransactionFilter::default() };
    assert!(same.matches(&tx));
    let other = TransactionFilter { account_id: Some(Uuid::new_v4()), ..TransactionFilter::default() };
    assert!(!other.matches(&tx));
    let wrong_category =
        TransactionFilter { category_id: Some(Uuid::new_v4()), ..TransactionFilter::default() };
    assert!(!wrong_category.matches(&tx));
}

#[test]
fn filter_kind_matches_on_variant_alone() {
    let expense = transaction(TransactionKind::Expense);
    let same =
        TransactionFilter { kind: Some(TransactionKind::Expense), ..TransactionFilter::default() };
    assert!(same.matches(&expense));
    let other =
        TransactionFilter { kind: Some(TransactionKind::Income), ..TransactionFilter::default() };
    assert!(!other.matches(&expense));

    // Transfer payloads are not compared: any out-leg filter matches any
    // out leg.
    let leg = transaction(TransactionKind::TransferOut { to_account: Uuid::new_v4() });
    let any_out = TransactionFilter {
        kind: Some(TransactionKind::TransferOut { to_account: Uuid::new_v4() }),
        ..TransactionFilter::default()
    };
    assert!(any_out.matches(&leg));
}

// ── Month bucketing ─────────────────────────────────────────────────

#[test]
fn month_bucket_extracts_year_and_month() {
    let mut tx = transaction(TransactionKind::Income);
    tx.date = date(2024, 12, 31);
    assert_eq!(tx.month_bucket(), (2024, 12));
    tx.date = date(2025, 1, 1);
    assert_eq!(tx.month_bucket(), (2025, 1));
}

// ── Misc model behavior ─────────────────────────────────────────────

#[test]
fn new_account_starts_at_its_initial_balance() {
    let account = Account::new("Wallet", dec!(12.34));
    assert_eq!(account.balance, dec!(12.34));
    assert_eq!(account.initial_balance, dec!(12.34));
    assert!(account.is_active);
}

#[test]
fn empty_totals_are_all_zero() {
    let totals = LedgerTotals::empty();
    assert_eq!(totals.count, 0);
    assert_eq!(totals.income_total, dec!(0));
    assert_eq!(totals.expense_total, dec!(0));
    assert_eq!(totals.transfer_total, dec!(0));
    assert_eq!(totals.net, dec!(0));
}

#[test]
fn unknown_refs_are_marked_unresolved() {
    let id = Uuid::new_v4();
    let account = AccountRef::unknown(id);
    assert_eq!(account.id, id);
    assert!(!account.resolved);
    let category = CategoryRef::unknown(id);
    assert!(!category.resolved);
}

#[test]
fn recurrence_round_trips_through_serde() {
    let recurrence = Recurrence {
        frequency: RecurringFrequency::Monthly,
        end_date: Some(date(2026, 1, 1)),
    };
    let mut tx = transaction(TransactionKind::Expense);
    tx.recurrence = Some(recurrence);

    let json = serde_json::to_string(&tx).unwrap();
    let back: Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(back.recurrence, Some(recurrence));
    assert_eq!(back.kind, TransactionKind::Expense);
}

#[test]
fn transaction_kind_displays_without_payload() {
    assert_eq!(TransactionKind::Income.to_string(), "Income");
    assert_eq!(
        TransactionKind::TransferOut { to_account: Uuid::new_v4() }.to_string(),
        "TransferOut"
    );
}
