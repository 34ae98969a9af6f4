use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::account::Account;
use crate::models::category::Category;
use crate::models::transaction::{Transaction, TransactionFilter};
use crate::stores::traits::{AccountStore, CategoryStore, TransactionStore};

/// In-memory account store.
///
/// `adjust_balance` does its read-modify-write under a single lock
/// acquisition with no await points in between, which is what makes the
/// adjustment atomic and immune to lost updates.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing accounts (test setup convenience).
    pub async fn with_accounts(accounts: Vec<Account>) -> Self {
        let store = Self::new();
        {
            let mut map = store.accounts.lock().await;
            for account in accounts {
                map.insert(account.id, account);
            }
        }
        store
    }

    /// Remove an account, leaving any transactions that reference it
    /// dangling. Used to exercise the joiner's placeholder path.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.accounts.lock().await.remove(&id).is_some()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Account>, LedgerError> {
        Ok(self.accounts.lock().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.accounts.lock().await.values().cloned().collect())
    }

    async fn adjust_balance(
        &self,
        id: Uuid,
        delta: Decimal,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        if !account.is_active {
            return Err(LedgerError::Consistency(format!(
                "account '{}' is deactivated and cannot accept balance adjustments",
                account.name
            )));
        }
        account.balance += delta;
        account.updated_at = at;
        tracing::debug!(account = %id, %delta, balance = %account.balance, "balance adjusted");
        Ok(())
    }

    async fn save(&self, account: Account) -> Result<(), LedgerError> {
        self.accounts.lock().await.insert(account.id, account);
        Ok(())
    }
}

/// In-memory category store. The engine only ever reads from it.
#[derive(Debug, Default)]
pub struct MemoryCategoryStore {
    categories: Mutex<HashMap<Uuid, Category>>,
}

impl MemoryCategoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_categories(categories: Vec<Category>) -> Self {
        let store = Self::new();
        {
            let mut map = store.categories.lock().await;
            for category in categories {
                map.insert(category.id, category);
            }
        }
        store
    }

    /// Remove a category, leaving any transactions that reference it
    /// dangling. Used to exercise the joiner's placeholder path.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.categories.lock().await.remove(&id).is_some()
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Category>, LedgerError> {
        Ok(self.categories.lock().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Category>, LedgerError> {
        Ok(self.categories.lock().await.values().cloned().collect())
    }
}

/// In-memory transaction table.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    transactions: Mutex<HashMap<Uuid, Transaction>>,
}

impl MemoryTransactionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.transactions.lock().await.get(&id).cloned())
    }

    async fn insert(&self, tx: Transaction) -> Result<(), LedgerError> {
        let mut transactions = self.transactions.lock().await;
        if transactions.contains_key(&tx.id) {
            return Err(LedgerError::Conflict(format!(
                "transaction {} already exists",
                tx.id
            )));
        }
        transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn update(&self, tx: Transaction) -> Result<(), LedgerError> {
        let mut transactions = self.transactions.lock().await;
        if !transactions.contains_key(&tx.id) {
            return Err(LedgerError::TransactionNotFound(tx.id));
        }
        transactions.insert(tx.id, tx);
        Ok(())
    }

    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        let transactions = self.transactions.lock().await;
        let mut matching: Vec<Transaction> = transactions
            .values()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(matching)
    }

    async fn remove(&self, id: Uuid) -> Result<(), LedgerError> {
        self.transactions
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::TransactionNotFound(id))
    }
}
