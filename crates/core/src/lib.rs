pub mod errors;
pub mod models;
pub mod services;
pub mod stores;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use errors::LedgerError;
use models::account::Account;
use models::category::Category;
use models::summary::{CategoryShare, FlowKind, LedgerTotals, MonthlyRollup, TransactionDetail};
use models::transaction::{NewTransaction, Transaction, TransactionFilter, TransactionPatch};
use services::detail_service::DetailService;
use services::ledger_service::LedgerService;
use services::summary_service::SummaryService;
use stores::memory::{MemoryAccountStore, MemoryCategoryStore, MemoryTransactionStore};
use stores::traits::{AccountStore, CategoryStore, TransactionStore};

/// Main entry point for the PocketLedger core library.
///
/// Holds references to the three external stores and the services that
/// operate on them. Stores are injected through the constructor — there is
/// no global state — so callers can plug in any backend that implements
/// the store traits.
pub struct PocketLedger {
    accounts: Arc<dyn AccountStore>,
    categories: Arc<dyn CategoryStore>,
    ledger_service: LedgerService,
    summary_service: SummaryService,
    detail_service: DetailService,
}

impl std::fmt::Debug for PocketLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PocketLedger").finish_non_exhaustive()
    }
}

impl PocketLedger {
    /// Build the engine over caller-provided stores.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        categories: Arc<dyn CategoryStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        let ledger_service = LedgerService::new(
            Arc::clone(&accounts),
            Arc::clone(&categories),
            Arc::clone(&transactions),
        );
        let detail_service = DetailService::new(Arc::clone(&accounts), Arc::clone(&categories));
        let summary_service = SummaryService::new(
            Arc::clone(&categories),
            Arc::clone(&transactions),
            DetailService::new(Arc::clone(&accounts), Arc::clone(&categories)),
        );
        Self {
            accounts,
            categories,
            ledger_service,
            summary_service,
            detail_service,
        }
    }

    /// Convenience constructor over empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryCategoryStore::new()),
            Arc::new(MemoryTransactionStore::new()),
        )
    }

    // ── Ledger Writes ───────────────────────────────────────────────

    /// Insert an Income or Expense transaction; returns the assigned id.
    pub async fn insert_transaction(&self, input: NewTransaction) -> Result<Uuid, LedgerError> {
        self.ledger_service.insert(input).await
    }

    /// Apply a patch to an existing Income/Expense transaction.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<Transaction, LedgerError> {
        self.ledger_service.update(id, patch).await
    }

    /// Tombstone a transaction (cascading across transfer legs).
    pub async fn delete_transaction(&self, id: Uuid) -> Result<(), LedgerError> {
        self.ledger_service.delete(id).await
    }

    /// Move money between two accounts as a linked pair of transfer legs.
    /// Returns `(out_leg_id, in_leg_id)`.
    pub async fn create_transfer(
        &self,
        from_account: Uuid,
        to_account: Uuid,
        amount: Decimal,
        category_id: Uuid,
        date: NaiveDate,
    ) -> Result<(Uuid, Uuid), LedgerError> {
        self.ledger_service
            .create_transfer(from_account, to_account, amount, category_id, date)
            .await
    }

    /// Physically purge a tombstoned record (administrative/test-only).
    pub async fn hard_delete_transaction(&self, id: Uuid) -> Result<(), LedgerError> {
        self.ledger_service.hard_delete(id).await
    }

    // ── Ledger Reads ────────────────────────────────────────────────

    pub async fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>, LedgerError> {
        self.ledger_service.get(id).await
    }

    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.ledger_service.list(filter).await
    }

    /// One transaction joined with account/category detail.
    pub async fn transaction_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<TransactionDetail>, LedgerError> {
        match self.ledger_service.get(id).await? {
            Some(tx) => Ok(Some(self.detail_service.resolve(&tx).await?)),
            None => Ok(None),
        }
    }

    // ── Summaries ───────────────────────────────────────────────────

    pub async fn totals(&self, filter: &TransactionFilter) -> Result<LedgerTotals, LedgerError> {
        self.summary_service.totals(filter).await
    }

    pub async fn top_categories(
        &self,
        flow: FlowKind,
        n: usize,
        filter: &TransactionFilter,
    ) -> Result<Vec<CategoryShare>, LedgerError> {
        self.summary_service.top_categories(flow, n, filter).await
    }

    pub async fn monthly_rollups(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<MonthlyRollup>, LedgerError> {
        self.summary_service.monthly_rollups(filter).await
    }

    /// The `n` most recent non-deleted transactions with full detail.
    pub async fn recent_transactions(
        &self,
        n: usize,
    ) -> Result<Vec<TransactionDetail>, LedgerError> {
        self.summary_service.recent(n).await
    }

    // ── Accounts & Categories ───────────────────────────────────────

    pub async fn get_account(&self, id: Uuid) -> Result<Option<Account>, LedgerError> {
        self.accounts.get_by_id(id).await
    }

    pub async fn get_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.accounts.get_all().await
    }

    /// Insert or replace an account record in the backing store.
    pub async fn save_account(&self, account: Account) -> Result<(), LedgerError> {
        self.accounts.save(account).await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, LedgerError> {
        self.categories.get_all().await
    }

    /// Audit one account: recompute its balance from the log and compare
    /// to the stored value. Returns the recomputed balance.
    pub async fn verify_account(&self, id: Uuid) -> Result<Decimal, LedgerError> {
        self.ledger_service.verify_account(id).await
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the full transaction log (tombstones included) as JSON.
    pub async fn export_transactions_to_json(&self) -> Result<String, LedgerError> {
        let filter = TransactionFilter {
            include_deleted: true,
            ..TransactionFilter::default()
        };
        let records = self.ledger_service.list(&filter).await?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Import transactions from a JSON export, re-applying every live
    /// record's balance effect so the account invariant holds afterwards.
    ///
    /// All-or-nothing: the whole batch is validated first, and a failure
    /// while applying rolls back everything already applied. Returns the
    /// number of records imported.
    pub async fn import_transactions_from_json(&self, json: &str) -> Result<usize, LedgerError> {
        let records: Vec<Transaction> = serde_json::from_str(json)?;

        // Phase 1: validate the whole batch before touching any store.
        let by_id: HashMap<Uuid, &Transaction> = records.iter().map(|tx| (tx.id, tx)).collect();
        for tx in &records {
            if tx.amount < Decimal::ZERO {
                return Err(LedgerError::Validation(format!(
                    "imported transaction {} has a negative amount",
                    tx.id
                )));
            }
            if tx.kind.is_transfer() != tx.linked_leg.is_some() {
                return Err(LedgerError::Validation(format!(
                    "imported transaction {} has inconsistent transfer linkage",
                    tx.id
                )));
            }
            if self.accounts.get_by_id(tx.account_id).await?.is_none() {
                return Err(LedgerError::AccountNotFound(tx.account_id));
            }
            // Transfer legs must arrive as complete pairs: the counterpart
            // exists (in the batch or already in the store) and links back.
            if let Some(peer_id) = tx.linked_leg {
                let peer_links_back = match by_id.get(&peer_id) {
                    Some(peer) => peer.linked_leg == Some(tx.id),
                    None => match self.ledger_service.get(peer_id).await? {
                        Some(peer) => peer.linked_leg == Some(tx.id),
                        None => {
                            return Err(LedgerError::Validation(format!(
                                "imported transfer leg {} points at missing counterpart {}",
                                tx.id, peer_id
                            )));
                        }
                    },
                };
                if !peer_links_back {
                    return Err(LedgerError::Validation(format!(
                        "imported transfer leg {} is not linked back by its counterpart {}",
                        tx.id, peer_id
                    )));
                }
            }
        }

        // Phase 2: insert and apply, compensating on any failure.
        let mut applied: Vec<&Transaction> = Vec::new();
        for tx in &records {
            let outcome = self.apply_imported(tx).await;
            if let Err(e) = outcome {
                for done in applied.into_iter().rev() {
                    if !done.is_deleted {
                        self.ledger_service.compensate(
                            self.accounts
                                .adjust_balance(
                                    done.account_id,
                                    -done.signed_effect(),
                                    chrono::Utc::now(),
                                )
                                .await,
                            "revert imported effect",
                        )?;
                    }
                    self.ledger_service.compensate(
                        self.ledger_service.hard_delete_raw(done.id).await,
                        "remove imported record",
                    )?;
                }
                return Err(e);
            }
            applied.push(tx);
        }
        Ok(records.len())
    }

    async fn apply_imported(&self, tx: &Transaction) -> Result<(), LedgerError> {
        self.ledger_service.insert_raw(tx.clone()).await?;
        if !tx.is_deleted {
            if let Err(e) = self
                .accounts
                .adjust_balance(tx.account_id, tx.signed_effect(), chrono::Utc::now())
                .await
            {
                let _ = self.ledger_service.hard_delete_raw(tx.id).await;
                return Err(e);
            }
        }
        Ok(())
    }
}
