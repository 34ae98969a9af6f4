use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A classification label for transactions.
///
/// Read-only from the engine's perspective: categories are managed by an
/// external store and only consulted for aggregation and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,
}

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
