//! The result of an update or delete.

use serde::{Deserialize, Serialize};

/// How many rows an update or delete touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowsAffected {
    /// The number of rows that were changed.
    pub affected: usize,
}

impl RowsAffected {
    /// Wrap a row count returned by the database.
    pub fn new(affected: usize) -> Self {
        Self { affected }
    }
}
