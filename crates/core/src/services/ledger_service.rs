use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::account::Account;
use crate::models::transaction::{
    NewTransaction, Transaction, TransactionFilter, TransactionKind, TransactionPatch,
};
use crate::stores::traits::{AccountStore, CategoryStore, TransactionStore};

/// The Ledger Mutation Engine.
///
/// Every write validates its inputs before touching any store (fail fast,
/// no side effects on rejection), then runs its ledger write and balance
/// adjustment(s) as one unit of work: any step that fails triggers
/// compensating reversal of the steps that already succeeded, so a partial
/// effect is never a terminal state.
///
/// Balance mutation is always a relative adjustment delegated to
/// [`AccountStore::adjust_balance`]; the engine never reads a balance into
/// memory to write a computed value back.
pub struct LedgerService {
    accounts: Arc<dyn AccountStore>,
    categories: Arc<dyn CategoryStore>,
    transactions: Arc<dyn TransactionStore>,
}

impl LedgerService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        categories: Arc<dyn CategoryStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            accounts,
            categories,
            transactions,
        }
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Insert an Income or Expense transaction and apply its effect to
    /// the owning account. Returns the assigned id.
    ///
    /// Transfers are created through [`LedgerService::create_transfer`];
    /// passing a transfer kind here is a validation error. A missing
    /// account fails the whole operation — nothing is persisted.
    pub async fn insert(&self, input: NewTransaction) -> Result<Uuid, LedgerError> {
        if input.kind.is_transfer() {
            return Err(LedgerError::Validation(
                "transfer legs cannot be inserted directly — use create_transfer".into(),
            ));
        }
        Self::validate_amount(input.amount)?;
        self.require_active_account(input.account_id).await?;
        self.require_category(input.category_id).await?;

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            account_id: input.account_id,
            category_id: input.category_id,
            amount: input.amount,
            kind: input.kind,
            date: input.date,
            is_deleted: false,
            linked_leg: None,
            recurrence: input.recurrence,
            created_at: now,
            updated_at: now,
        };
        let id = tx.id;
        let effect = tx.signed_effect();

        self.transactions.insert(tx).await?;
        if let Err(e) = self.accounts.adjust_balance(input.account_id, effect, now).await {
            // Unit of work: the record must not survive a failed adjustment.
            self.compensate(self.transactions.remove(id).await, "remove inserted record")?;
            return Err(e);
        }

        info!(transaction = %id, account = %input.account_id, kind = %input.kind, "transaction inserted");
        Ok(id)
    }

    /// Update an Income/Expense transaction in place.
    ///
    /// Reverts the old record's effect from its account, applies the new
    /// effect to the (possibly different) new account, then persists the
    /// new record. Transfer legs cannot be edited in place — delete the
    /// transfer and recreate it instead.
    pub async fn update(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<Transaction, LedgerError> {
        let old = self.require_transaction(id).await?;
        if old.is_deleted {
            return Err(LedgerError::Validation(
                "cannot update a deleted transaction".into(),
            ));
        }
        if old.kind.is_transfer() {
            return Err(LedgerError::Validation(
                "transfer legs cannot be updated in place — delete and recreate the transfer"
                    .into(),
            ));
        }
        if let Some(kind) = patch.kind {
            if kind.is_transfer() {
                return Err(LedgerError::Validation(
                    "a transaction cannot be turned into a transfer leg".into(),
                ));
            }
        }

        let new = Transaction {
            id: old.id,
            account_id: patch.account_id.unwrap_or(old.account_id),
            category_id: patch.category_id.unwrap_or(old.category_id),
            amount: patch.amount.unwrap_or(old.amount),
            kind: patch.kind.unwrap_or(old.kind),
            date: patch.date.unwrap_or(old.date),
            is_deleted: false,
            linked_leg: None,
            recurrence: patch.recurrence.unwrap_or(old.recurrence),
            created_at: old.created_at,
            updated_at: Utc::now(),
        };
        Self::validate_amount(new.amount)?;
        if new.account_id != old.account_id {
            self.require_active_account(new.account_id).await?;
        }
        if new.category_id != old.category_id {
            self.require_category(new.category_id).await?;
        }

        let now = new.updated_at;
        let old_effect = old.signed_effect();
        let new_effect = new.signed_effect();

        // Revert old effect, apply new effect, persist — compensating on
        // every failure so no partial adjustment survives.
        self.accounts
            .adjust_balance(old.account_id, -old_effect, now)
            .await?;
        if let Err(e) = self
            .accounts
            .adjust_balance(new.account_id, new_effect, now)
            .await
        {
            self.compensate(
                self.accounts
                    .adjust_balance(old.account_id, old_effect, now)
                    .await,
                "re-apply reverted effect",
            )?;
            return Err(e);
        }
        if let Err(e) = self.transactions.update(new.clone()).await {
            self.compensate(
                self.accounts
                    .adjust_balance(new.account_id, -new_effect, now)
                    .await,
                "revert new effect",
            )?;
            self.compensate(
                self.accounts
                    .adjust_balance(old.account_id, old_effect, now)
                    .await,
                "re-apply reverted effect",
            )?;
            return Err(e);
        }

        info!(transaction = %id, "transaction updated");
        Ok(new)
    }

    /// Tombstone a transaction and revert its effect.
    ///
    /// Deleting one leg of a transfer cascades to its linked leg: both
    /// effects are reverted and both records tombstoned, so the ledger
    /// never holds an orphaned leg. Deleting an already-deleted record
    /// is a no-op.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let tx = self.require_transaction(id).await?;
        if tx.is_deleted {
            return Ok(());
        }

        // Resolve the counterpart before mutating anything, so a broken
        // link aborts with no effect applied.
        let peer = match tx.linked_leg {
            Some(peer_id) => match self.transactions.get_by_id(peer_id).await? {
                Some(p) if !p.is_deleted => Some(p),
                Some(_) => {
                    info!(transaction = %id, peer = %peer_id, "linked leg already deleted");
                    None
                }
                None => {
                    return Err(LedgerError::Consistency(format!(
                        "transfer leg {id} points at missing counterpart {peer_id}"
                    )));
                }
            },
            None => None,
        };

        self.tombstone(&tx).await?;
        if let Some(peer) = peer {
            if let Err(e) = self.tombstone(&peer).await {
                // Roll the first leg back so the pair stays symmetric.
                self.compensate(self.restore(&tx).await, "restore first transfer leg")?;
                return Err(e);
            }
        }

        info!(transaction = %id, "transaction deleted");
        Ok(())
    }

    /// Create a transfer between two accounts as a linked pair of legs.
    ///
    /// The combined balance of the two accounts is unchanged: `from`
    /// decreases by `amount`, `to` increases by `amount`. Both inserts
    /// and both adjustments form one unit of work.
    pub async fn create_transfer(
        &self,
        from_account: Uuid,
        to_account: Uuid,
        amount: Decimal,
        category_id: Uuid,
        date: NaiveDate,
    ) -> Result<(Uuid, Uuid), LedgerError> {
        if from_account == to_account {
            return Err(LedgerError::Validation(
                "cannot transfer between an account and itself".into(),
            ));
        }
        Self::validate_amount(amount)?;
        self.require_active_account(from_account).await?;
        self.require_active_account(to_account).await?;
        self.require_category(category_id).await?;

        let now = Utc::now();
        let out_id = Uuid::new_v4();
        let in_id = Uuid::new_v4();
        let out_leg = Transaction {
            id: out_id,
            account_id: from_account,
            category_id,
            amount,
            kind: TransactionKind::TransferOut { to_account },
            date,
            is_deleted: false,
            linked_leg: Some(in_id),
            recurrence: None,
            created_at: now,
            updated_at: now,
        };
        let in_leg = Transaction {
            id: in_id,
            account_id: to_account,
            category_id,
            amount,
            kind: TransactionKind::TransferIn { from_account },
            date,
            is_deleted: false,
            linked_leg: Some(out_id),
            recurrence: None,
            created_at: now,
            updated_at: now,
        };

        self.transactions.insert(out_leg).await?;
        if let Err(e) = self.accounts.adjust_balance(from_account, -amount, now).await {
            self.compensate(self.transactions.remove(out_id).await, "remove out leg")?;
            return Err(e);
        }
        if let Err(e) = self.transactions.insert(in_leg).await {
            self.compensate(
                self.accounts.adjust_balance(from_account, amount, now).await,
                "revert out-leg adjustment",
            )?;
            self.compensate(self.transactions.remove(out_id).await, "remove out leg")?;
            return Err(e);
        }
        if let Err(e) = self.accounts.adjust_balance(to_account, amount, now).await {
            self.compensate(self.transactions.remove(in_id).await, "remove in leg")?;
            self.compensate(
                self.accounts.adjust_balance(from_account, amount, now).await,
                "revert out-leg adjustment",
            )?;
            self.compensate(self.transactions.remove(out_id).await, "remove out leg")?;
            return Err(e);
        }

        info!(from = %from_account, to = %to_account, %amount, "transfer created");
        Ok((out_id, in_id))
    }

    /// Physically remove a tombstoned record. Administrative/test-only:
    /// refuses live records and never touches balances.
    pub async fn hard_delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let tx = self.require_transaction(id).await?;
        if !tx.is_deleted {
            return Err(LedgerError::Validation(
                "only tombstoned records can be hard-deleted".into(),
            ));
        }
        self.transactions.remove(id).await
    }

    /// Persist a record verbatim, skipping validation and balance effects.
    /// Import path only — the caller owns batch validation and rollback.
    pub(crate) async fn insert_raw(&self, tx: Transaction) -> Result<(), LedgerError> {
        self.transactions.insert(tx).await
    }

    /// Physically remove a record regardless of tombstone state.
    /// Import rollback only.
    pub(crate) async fn hard_delete_raw(&self, id: Uuid) -> Result<(), LedgerError> {
        self.transactions.remove(id).await
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn get(&self, id: Uuid) -> Result<Option<Transaction>, LedgerError> {
        self.transactions.get_by_id(id).await
    }

    pub async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        self.transactions.list(filter).await
    }

    /// Recompute an account's balance from the log and compare it to the
    /// stored value: `initial_balance + Σ signed_effect` over non-deleted
    /// records owned by the account. Returns the recomputed balance, or a
    /// `Consistency` error when it disagrees with the store.
    pub async fn verify_account(&self, account_id: Uuid) -> Result<Decimal, LedgerError> {
        let account = self
            .accounts
            .get_by_id(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let filter = TransactionFilter {
            account_id: Some(account_id),
            ..TransactionFilter::default()
        };
        let effect_sum: Decimal = self
            .transactions
            .list(&filter)
            .await?
            .iter()
            .map(Transaction::signed_effect)
            .sum();
        let expected = account.initial_balance + effect_sum;

        if expected != account.balance {
            return Err(LedgerError::Consistency(format!(
                "account '{}' balance {} disagrees with ledger-derived {}",
                account.name, account.balance, expected
            )));
        }
        Ok(expected)
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Revert one record's effect and mark it deleted, compensating the
    /// adjustment if the persist fails.
    async fn tombstone(&self, tx: &Transaction) -> Result<(), LedgerError> {
        let now = Utc::now();
        let effect = tx.signed_effect();
        self.accounts
            .adjust_balance(tx.account_id, -effect, now)
            .await?;

        let mut deleted = tx.clone();
        deleted.is_deleted = true;
        deleted.updated_at = now;
        if let Err(e) = self.transactions.update(deleted).await {
            self.compensate(
                self.accounts.adjust_balance(tx.account_id, effect, now).await,
                "re-apply reverted effect",
            )?;
            return Err(e);
        }
        Ok(())
    }

    /// Undo a tombstone: re-apply the effect and clear the flag.
    async fn restore(&self, tx: &Transaction) -> Result<(), LedgerError> {
        let now = Utc::now();
        self.accounts
            .adjust_balance(tx.account_id, tx.signed_effect(), now)
            .await?;
        let mut live = tx.clone();
        live.is_deleted = false;
        live.updated_at = now;
        self.transactions.update(live).await
    }

    /// Check the outcome of a compensating step. Compensation failing
    /// means the rollback itself could not complete; surface that as a
    /// consistency violation rather than silently swallowing it.
    pub(crate) fn compensate(
        &self,
        outcome: Result<(), LedgerError>,
        step: &str,
    ) -> Result<(), LedgerError> {
        if let Err(e) = outcome {
            error!(%step, error = %e, "compensating rollback failed");
            return Err(LedgerError::Consistency(format!(
                "rollback step '{step}' failed: {e}"
            )));
        }
        Ok(())
    }

    fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "transaction amount must be positive".into(),
            ));
        }
        Ok(())
    }

    async fn require_transaction(&self, id: Uuid) -> Result<Transaction, LedgerError> {
        self.transactions
            .get_by_id(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    async fn require_active_account(&self, id: Uuid) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .get_by_id(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        if !account.is_active {
            return Err(LedgerError::Consistency(format!(
                "account '{}' is deactivated",
                account.name
            )));
        }
        Ok(account)
    }

    async fn require_category(&self, id: Uuid) -> Result<(), LedgerError> {
        self.categories
            .get_by_id(id)
            .await?
            .map(|_| ())
            .ok_or(LedgerError::CategoryNotFound(id))
    }
}
