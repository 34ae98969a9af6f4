use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account owning a running balance.
///
/// The core contract the mutation engine upholds:
/// `balance == initial_balance + Σ signed_effect(t)` over all non-deleted
/// transactions owned by the account. The engine never sets `balance`
/// directly — it only asks the store for relative adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Current balance
    pub balance: Decimal,

    /// Balance at account creation, before any ledger activity
    pub initial_balance: Decimal,

    /// Deactivated accounts reject further balance adjustments
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create an active account starting at `initial_balance`.
    #[must_use]
    pub fn new(name: impl Into<String>, initial_balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            balance: initial_balance,
            initial_balance,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
