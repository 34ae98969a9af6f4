use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::Transaction;

/// Rollup over a set of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Number of transactions in scope
    pub count: usize,

    /// Sum of Income amounts
    pub income_total: Decimal,

    /// Sum of Expense amounts
    pub expense_total: Decimal,

    /// Transfer volume. Only outgoing legs are summed, so each transfer
    /// contributes exactly once even though it is stored as two records.
    pub transfer_total: Decimal,

    /// income_total - expense_total
    pub net: Decimal,
}

impl LedgerTotals {
    /// All-zero totals, returned for empty data instead of an error.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            count: 0,
            income_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            transfer_total: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }
}

/// Which side of the ledger a ranking or rollup aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    Income,
    Expense,
}

/// One entry in a top-N category ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category_id: Uuid,

    /// Resolved category name, or the unknown placeholder
    pub category_name: String,

    /// Sum of amounts for this category
    pub total: Decimal,

    /// total / sum-over-all-categories × 100; zero when the overall
    /// total is zero (never NaN, never a division fault)
    pub percentage: Decimal,
}

/// Per-calendar-month rollup, ordered most-recent-first in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    pub year: i32,
    pub month: u32,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    /// income_total - expense_total for this month
    pub net: Decimal,
    pub count: usize,
}

/// Lightweight account reference for reporting views.
///
/// When a transaction points at an account that no longer exists, the
/// joiner substitutes [`AccountRef::unknown`] so views stay renderable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: Uuid,
    pub name: String,
    /// False when the underlying account could not be resolved
    pub resolved: bool,
}

impl AccountRef {
    /// Placeholder for a dangling account reference.
    #[must_use]
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: "(unknown account)".to_string(),
            resolved: false,
        }
    }
}

/// Lightweight category reference for reporting views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    /// False when the underlying category could not be resolved
    pub resolved: bool,
}

impl CategoryRef {
    /// Placeholder for a dangling category reference.
    #[must_use]
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: "(unknown category)".to_string(),
            resolved: false,
        }
    }
}

/// A transaction denormalized with its account and category detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub account: AccountRef,
    pub category: CategoryRef,
    /// The other side of a transfer, `None` for non-transfers
    pub counterpart_account: Option<AccountRef>,
}
