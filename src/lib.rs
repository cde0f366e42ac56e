//! A backend for tracking personal finances.
//!
//! Users own categories (e.g., 'Groceries', 'Salary') and transactions. The
//! services in this crate check that records exist before writing to them,
//! delegate persistence to a store trait, and report missing or duplicate
//! records as errors that map onto HTTP status codes.

#![warn(missing_docs)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

mod category;
mod db;
mod error_response;
mod rows_affected;
mod transaction;
mod user;

pub use category::{
    Category, CategoryId, CategoryService, CategoryStore, CategoryTitle, CategoryWithTransactions,
    CreateCategoryData, NewCategory, SQLiteCategoryStore, UpdateCategory, UpdateCategoryData,
};
pub use db::initialize as initialize_db;
pub use error_response::ErrorBody;
pub use rows_affected::RowsAffected;
pub use transaction::{
    CreateTransactionData, NewTransaction, SQLiteTransactionStore, Transaction, TransactionId,
    TransactionKind, TransactionService, TransactionStore, TransactionTitle, UpdateTransaction,
    UpdateTransactionData,
};
pub use user::{User, UserID, create_user, get_user_by_id};

use crate::error_response::render_error;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category title.
    #[error("Category title cannot be empty")]
    EmptyCategoryTitle,

    /// An empty string was used to create a transaction title.
    #[error("Transaction title cannot be empty")]
    EmptyTransactionTitle,

    /// The user already has a category with the same title.
    #[error("This category already exists!")]
    DuplicateCategory,

    /// No category has the requested ID.
    #[error("Category not found")]
    CategoryNotFound,

    /// No transaction has the requested ID.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// The category ID given for a transaction does not refer to one of the
    /// user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// A transaction amount was negative, NaN or infinite.
    ///
    /// Whether money is spent or earned is recorded by the transaction kind,
    /// so amounts are always non-negative.
    #[error("{0} is not a valid transaction amount")]
    InvalidAmount(f64),

    /// A page number or page size of zero was requested.
    #[error("page and limit must both be greater than zero")]
    InvalidPagination,

    /// The user ID does not refer to a registered user.
    #[error("the user ID does not refer to a valid user")]
    InvalidUser,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidUser
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code a client should receive for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyCategoryTitle
            | Error::EmptyTransactionTitle
            | Error::DuplicateCategory
            | Error::InvalidCategory
            | Error::InvalidAmount(_)
            | Error::InvalidPagination
            | Error::InvalidUser => StatusCode::BAD_REQUEST,
            Error::CategoryNotFound | Error::TransactionNotFound | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::DatabaseLockError | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // Any errors that are not handled above are not intended to be shown to the client.
            Error::DatabaseLockError | Error::SqlError(_) => {
                tracing::error!("An unexpected error occurred: {}", self);
                render_error(status, "Internal server error")
            }
            error => render_error(status, &error.to_string()),
        }
    }
}
