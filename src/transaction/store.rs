//! Defines the transaction store trait.

use crate::{
    Error, RowsAffected, UserID,
    transaction::{NewTransaction, Transaction, TransactionId, TransactionKind, UpdateTransaction},
};

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store, or `None` if there is no such
    /// transaction.
    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, Error>;

    /// Retrieve all of a user's transactions, newest first.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error>;

    /// Retrieve up to `limit` of a user's transactions, newest first, after
    /// skipping the first `offset`.
    fn get_page(&self, user_id: UserID, limit: u64, offset: u64)
    -> Result<Vec<Transaction>, Error>;

    /// The total amount of a user's transactions of the given kind.
    fn sum_by_kind(&self, user_id: UserID, kind: TransactionKind) -> Result<f64, Error>;

    /// Apply `changes` to the transaction with `id`.
    fn update(&self, id: TransactionId, changes: UpdateTransaction)
    -> Result<RowsAffected, Error>;

    /// Delete the transaction with `id`.
    fn delete(&self, id: TransactionId) -> Result<RowsAffected, Error>;
}
