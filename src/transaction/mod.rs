//! Income and expense records, optionally filed under a category.

mod db;
mod domain;
mod service;
mod store;

pub use db::{SQLiteTransactionStore, create_transaction_table};
pub(crate) use db::{TRANSACTION_COLUMNS, map_transaction_row};
pub use domain::{
    CreateTransactionData, NewTransaction, Transaction, TransactionId, TransactionKind,
    TransactionTitle, UpdateTransaction, UpdateTransactionData,
};
pub use service::TransactionService;
pub use store::TransactionStore;
