use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::summary::{CategoryShare, FlowKind, LedgerTotals, MonthlyRollup, TransactionDetail};
use crate::models::transaction::{Transaction, TransactionFilter, TransactionKind};
use crate::services::detail_service::DetailService;
use crate::stores::traits::{CategoryStore, TransactionStore};

/// Computes derived aggregates over the transaction log: totals, top-N
/// category rankings, monthly rollups, recent-transaction views.
///
/// Strictly read-only and side-effect free. Empty data produces zeroed or
/// empty results, never an error.
pub struct SummaryService {
    categories: Arc<dyn CategoryStore>,
    transactions: Arc<dyn TransactionStore>,
    detail: DetailService,
}

impl SummaryService {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        transactions: Arc<dyn TransactionStore>,
        detail: DetailService,
    ) -> Self {
        Self {
            categories,
            transactions,
            detail,
        }
    }

    /// Count and per-kind sums over all records passing the filter.
    ///
    /// Transfer volume counts outgoing legs only, so a transfer stored as
    /// two records contributes its amount exactly once.
    pub async fn totals(&self, filter: &TransactionFilter) -> Result<LedgerTotals, LedgerError> {
        let records = self.transactions.list(filter).await?;

        let mut totals = LedgerTotals::empty();
        totals.count = records.len();
        for tx in &records {
            match tx.kind {
                TransactionKind::Income => totals.income_total += tx.amount,
                TransactionKind::Expense => totals.expense_total += tx.amount,
                TransactionKind::TransferOut { .. } => totals.transfer_total += tx.amount,
                TransactionKind::TransferIn { .. } => {}
            }
        }
        totals.net = totals.income_total - totals.expense_total;
        Ok(totals)
    }

    /// The top `n` categories for one flow direction, ranked by summed
    /// amount descending, each with its percentage share of the flow's
    /// overall total. A zero overall total yields zero percentages — the
    /// guard is explicit, never a division fault.
    pub async fn top_categories(
        &self,
        flow: FlowKind,
        n: usize,
        filter: &TransactionFilter,
    ) -> Result<Vec<CategoryShare>, LedgerError> {
        // The flow direction narrows the caller's filter down to one kind.
        let mut scoped = filter.clone();
        scoped.kind = Some(match flow {
            FlowKind::Income => TransactionKind::Income,
            FlowKind::Expense => TransactionKind::Expense,
        });
        let records = self.transactions.list(&scoped).await?;

        let mut per_category: HashMap<Uuid, Decimal> = HashMap::new();
        let mut flow_total = Decimal::ZERO;
        for tx in &records {
            *per_category.entry(tx.category_id).or_insert(Decimal::ZERO) += tx.amount;
            flow_total += tx.amount;
        }

        let names: HashMap<Uuid, String> = self
            .categories
            .get_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let hundred = Decimal::from(100);
        let mut shares: Vec<CategoryShare> = per_category
            .into_iter()
            .map(|(category_id, total)| {
                let percentage = if flow_total.is_zero() {
                    Decimal::ZERO
                } else {
                    total / flow_total * hundred
                };
                CategoryShare {
                    category_id,
                    category_name: names
                        .get(&category_id)
                        .cloned()
                        .unwrap_or_else(|| "(unknown category)".to_string()),
                    total,
                    percentage,
                }
            })
            .collect();

        shares.sort_by(|a, b| b.total.cmp(&a.total).then(a.category_name.cmp(&b.category_name)));
        shares.truncate(n);
        Ok(shares)
    }

    /// Per-calendar-month income/expense/net/count buckets over the
    /// filtered records, ordered most-recent-first.
    pub async fn monthly_rollups(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<MonthlyRollup>, LedgerError> {
        let records = self.transactions.list(filter).await?;

        let mut buckets: HashMap<(i32, u32), MonthlyRollup> = HashMap::new();
        for tx in &records {
            let (year, month) = tx.month_bucket();
            let bucket = buckets.entry((year, month)).or_insert(MonthlyRollup {
                year,
                month,
                income_total: Decimal::ZERO,
                expense_total: Decimal::ZERO,
                net: Decimal::ZERO,
                count: 0,
            });
            bucket.count += 1;
            match tx.kind {
                TransactionKind::Income => bucket.income_total += tx.amount,
                TransactionKind::Expense => bucket.expense_total += tx.amount,
                _ => {}
            }
        }

        let mut rollups: Vec<MonthlyRollup> = buckets
            .into_values()
            .map(|mut b| {
                b.net = b.income_total - b.expense_total;
                b
            })
            .collect();
        rollups.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        Ok(rollups)
    }

    /// The `n` most recent non-deleted transactions, newest first, joined
    /// with account and category detail.
    pub async fn recent(&self, n: usize) -> Result<Vec<TransactionDetail>, LedgerError> {
        let mut records = self
            .transactions
            .list(&TransactionFilter::default())
            .await?;
        // Store order is oldest-first; newest-first for display.
        records.sort_by(|a: &Transaction, b: &Transaction| {
            b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at))
        });
        records.truncate(n);
        self.detail.resolve_many(&records).await
    }
}
