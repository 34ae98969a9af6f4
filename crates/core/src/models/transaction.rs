use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a transaction does to its owning account's balance.
///
/// Transfer direction is structural: the out leg and the in leg are two
/// distinct variants, each carrying the account on the *other* side of the
/// movement. Direction is never inferred from field presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money entering the account
    Income,
    /// Money leaving the account
    Expense,
    /// Outgoing leg of a transfer; money leaves the owning account
    TransferOut {
        /// The account receiving the money
        to_account: Uuid,
    },
    /// Incoming leg of a transfer; money arrives in the owning account
    TransferIn {
        /// The account the money came from
        from_account: Uuid,
    },
}

impl TransactionKind {
    /// Whether this kind is one leg of a transfer pair.
    #[must_use]
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            TransactionKind::TransferOut { .. } | TransactionKind::TransferIn { .. }
        )
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "Income"),
            TransactionKind::Expense => write!(f, "Expense"),
            TransactionKind::TransferOut { .. } => write!(f, "TransferOut"),
            TransactionKind::TransferIn { .. } => write!(f, "TransferIn"),
        }
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Scheduling metadata carried on a transaction. The engine stores it
/// verbatim; materializing future occurrences is a caller concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurringFrequency,
    /// Last date the schedule applies, `None` for open-ended.
    pub end_date: Option<NaiveDate>,
}

/// A single financial event in the ledger.
///
/// Records are append-mostly: user-facing deletion tombstones the record
/// (`is_deleted = true`) rather than removing it, so the log stays auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, assigned on creation
    pub id: Uuid,

    /// The account whose balance this record moves
    pub account_id: Uuid,

    /// Classification label (read-only from the engine's perspective)
    pub category_id: Uuid,

    /// Magnitude of the movement — always non-negative; the sign comes
    /// from `kind` via [`Transaction::signed_effect`]
    pub amount: Decimal,

    /// Income, Expense, or one leg of a transfer
    pub kind: TransactionKind,

    /// Date of the event (no time component — daily granularity)
    pub date: NaiveDate,

    /// Tombstone flag; deleted records keep no balance effect
    #[serde(default)]
    pub is_deleted: bool,

    /// The paired record of a transfer. `Some` exactly when `kind` is a
    /// transfer variant, so neither leg can be orphaned.
    #[serde(default)]
    pub linked_leg: Option<Uuid>,

    /// Optional scheduling metadata
    #[serde(default)]
    pub recurrence: Option<Recurrence>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// The balance delta this record contributes to its owning account.
    ///
    /// Income and the incoming transfer leg add money; Expense and the
    /// outgoing transfer leg remove it. Each leg affects only the account
    /// that owns it — the counterpart account is moved by the other leg.
    #[must_use]
    pub fn signed_effect(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income | TransactionKind::TransferIn { .. } => self.amount,
            TransactionKind::Expense | TransactionKind::TransferOut { .. } => -self.amount,
        }
    }

    /// The account on the other side of a transfer, `None` otherwise.
    #[must_use]
    pub fn counterpart_account(&self) -> Option<Uuid> {
        match self.kind {
            TransactionKind::TransferOut { to_account } => Some(to_account),
            TransactionKind::TransferIn { from_account } => Some(from_account),
            _ => None,
        }
    }

    /// The (year, month) bucket this record falls into, for rollups.
    #[must_use]
    pub fn month_bucket(&self) -> (i32, u32) {
        use chrono::Datelike;
        (self.date.year(), self.date.month())
    }
}

/// Input for creating a non-transfer transaction. The engine assigns the
/// id and timestamps; transfers are created through `create_transfer`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub recurrence: Option<Recurrence>,
}

/// Changes applied by `update`. `None` fields keep the old value.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// Move the record to a different account
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    /// Switch between Income and Expense (transfer kinds are rejected)
    pub kind: Option<TransactionKind>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the schedule
    pub recurrence: Option<Option<Recurrence>>,
}

/// Filter for listing and aggregating transactions.
/// The default matches every non-deleted record.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only records owned by this account
    pub account_id: Option<Uuid>,
    /// Only records with this category
    pub category_id: Option<Uuid>,
    /// Only records of this kind. Matched on the variant alone, so a
    /// transfer filter matches every leg in that direction regardless
    /// of which account sits on the other side.
    pub kind: Option<TransactionKind>,
    /// Inclusive start date
    pub from: Option<NaiveDate>,
    /// Inclusive end date
    pub to: Option<NaiveDate>,
    /// Include tombstoned records (administrative views only)
    pub include_deleted: bool,
}

impl TransactionFilter {
    /// Whether a record passes this filter.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        if tx.is_deleted && !self.include_deleted {
            return false;
        }
        if let Some(account_id) = self.account_id {
            if tx.account_id != account_id {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if tx.category_id != category_id {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if std::mem::discriminant(&tx.kind) != std::mem::discriminant(&kind) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if tx.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if tx.date > to {
                return false;
            }
        }
        true
    }
}
