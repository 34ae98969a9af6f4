use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the entire pocketledger-core library.
/// Every fallible public function returns `Result<T, LedgerError>`.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Validation (rejected before any store mutation) ─────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Missing references ──────────────────────────────────────────
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    // ── Ledger consistency ──────────────────────────────────────────
    /// A balance adjustment was attempted against an account that cannot
    /// accept it (e.g. deactivated). The whole unit of work is aborted.
    #[error("Consistency violation: {0}")]
    Consistency(String),

    /// A write collided with existing state, e.g. inserting a record
    /// whose id already exists, or an optimistic-concurrency failure in
    /// a backing store that detects them.
    #[error("Conflicting concurrent mutation: {0}")]
    Conflict(String),

    // ── Backing store ───────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Serialization (export/import) ───────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}
