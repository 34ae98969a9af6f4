use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::summary::{AccountRef, CategoryRef, TransactionDetail};
use crate::models::transaction::Transaction;
use crate::stores::traits::{AccountStore, CategoryStore};

/// Resolves a transaction's account and category references into a
/// denormalized view for reporting.
///
/// Dangling references (account or category deleted out from under the
/// log) are substituted with explicit "unknown" placeholders instead of
/// failing, so reporting views always stay renderable.
pub struct DetailService {
    accounts: Arc<dyn AccountStore>,
    categories: Arc<dyn CategoryStore>,
}

impl DetailService {
    pub fn new(accounts: Arc<dyn AccountStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            accounts,
            categories,
        }
    }

    /// Join one transaction with its account and category detail.
    pub async fn resolve(&self, tx: &Transaction) -> Result<TransactionDetail, LedgerError> {
        let account = self.resolve_account(tx.account_id).await?;
        let category = self.resolve_category(tx.category_id).await?;
        let counterpart_account = match tx.counterpart_account() {
            Some(id) => Some(self.resolve_account(id).await?),
            None => None,
        };

        Ok(TransactionDetail {
            transaction: tx.clone(),
            account,
            category,
            counterpart_account,
        })
    }

    /// Join a batch of transactions, preserving order.
    pub async fn resolve_many(
        &self,
        records: &[Transaction],
    ) -> Result<Vec<TransactionDetail>, LedgerError> {
        let mut details = Vec::with_capacity(records.len());
        for tx in records {
            details.push(self.resolve(tx).await?);
        }
        Ok(details)
    }

    async fn resolve_account(&self, id: Uuid) -> Result<AccountRef, LedgerError> {
        match self.accounts.get_by_id(id).await? {
            Some(account) => Ok(AccountRef {
                id: account.id,
                name: account.name,
                resolved: true,
            }),
            None => {
                warn!(account = %id, "dangling account reference in transaction log");
                Ok(AccountRef::unknown(id))
            }
        }
    }

    async fn resolve_category(&self, id: Uuid) -> Result<CategoryRef, LedgerError> {
        match self.categories.get_by_id(id).await? {
            Some(category) => Ok(CategoryRef {
                id: category.id,
                name: category.name,
                resolved: true,
            }),
            None => {
                warn!(category = %id, "dangling category reference in transaction log");
                Ok(CategoryRef::unknown(id))
            }
        }
    }
}
