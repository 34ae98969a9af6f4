use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::account::Account;
use crate::models::category::Category;
use crate::models::transaction::{Transaction, TransactionFilter};

/// Contract for the external account store.
///
/// The mutation engine never reads a balance, computes a new value and
/// writes it back — it only issues relative adjustments. Implementations
/// must make `adjust_balance` atomic (a single `balance = balance + delta`
/// against a relational store, or one lock acquisition in memory) so that
/// concurrent adjustments never lose updates.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Account>, LedgerError>;

    async fn get_all(&self) -> Result<Vec<Account>, LedgerError>;

    /// Atomically add a signed delta to an account's balance.
    ///
    /// Fails with `AccountNotFound` for a missing id and `Consistency`
    /// for a deactivated account; on failure the balance is untouched.
    async fn adjust_balance(
        &self,
        id: Uuid,
        delta: Decimal,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError>;

    /// Insert or replace an account record.
    async fn save(&self, account: Account) -> Result<(), LedgerError>;
}

/// Contract for the external category store. Read-only from the engine.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Category>, LedgerError>;

    async fn get_all(&self) -> Result<Vec<Category>, LedgerError>;
}

/// Contract for the persisted transaction table.
///
/// A relational implementation is expected to index account_id,
/// category_id, date and the deleted flag for the query patterns the
/// aggregator issues.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Transaction>, LedgerError>;

    /// Persist a new record. Fails with `Conflict` if the id exists.
    async fn insert(&self, tx: Transaction) -> Result<(), LedgerError>;

    /// Replace an existing record in place.
    /// Fails with `TransactionNotFound` for an unknown id.
    async fn update(&self, tx: Transaction) -> Result<(), LedgerError>;

    /// All records passing the filter, ordered by date ascending then
    /// creation time ascending.
    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError>;

    /// Physically remove a record. Administrative/test-only path; the
    /// user-facing deletion is the engine's tombstone.
    async fn remove(&self, id: Uuid) -> Result<(), LedgerError>;
}
