//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, ToSql, params_from_iter};
use time::OffsetDateTime;

use crate::{
    Error, RowsAffected, UserID,
    transaction::{
        NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStore,
        TransactionTitle, UpdateTransaction,
    },
};

/// The columns read by [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, kind, amount, category_id, user_id, created_at, updated_at";

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction depends on the [User](crate::User) and
/// [Category](crate::Category) models, their tables must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if `category_id` does not refer to a valid category,
    /// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let now = OffsetDateTime::now_utc();
        let connection = self.lock()?;

        let result = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\"
                 (title, kind, amount, category_id, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    new_transaction.title.as_ref(),
                    new_transaction.kind,
                    new_transaction.amount,
                    new_transaction.category_id,
                    new_transaction.user_id.as_i64(),
                    now,
                ),
                map_transaction_row,
            );

        match result {
            Ok(transaction) => Ok(transaction),
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            Err(rusqlite::Error::SqliteFailure(error, Some(_))) if error.extended_code == 787 => {
                Err(missing_reference_error(new_transaction.user_id, &connection)?)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        self.lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)
            .optional()
            .map_err(|error| error.into())
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?
            .query_map([user_id.as_i64()], map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }

    /// # Errors
    /// This function will return an [Error::InvalidPagination] if `limit` or
    /// `offset` do not fit in a SQLite integer.
    fn get_page(
        &self,
        user_id: UserID,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Transaction>, Error> {
        let limit = i64::try_from(limit).map_err(|_| Error::InvalidPagination)?;
        let offset = i64::try_from(offset).map_err(|_| Error::InvalidPagination)?;

        self.lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?
            .query_map((user_id.as_i64(), limit, offset), map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }

    fn sum_by_kind(&self, user_id: UserID, kind: TransactionKind) -> Result<f64, Error> {
        self.lock()?
            .query_row(
                "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\"
                 WHERE user_id = ?1 AND kind = ?2",
                (user_id.as_i64(), kind),
                |row| row.get(0),
            )
            .map_err(|error| error.into())
    }

    /// Update the fields of a transaction that are set in `changes`.
    ///
    /// `updated_at` is always set to the current time.
    fn update(
        &self,
        id: TransactionId,
        changes: UpdateTransaction,
    ) -> Result<RowsAffected, Error> {
        let mut set_clause_parts = vec![];
        let mut query_parameters: Vec<Box<dyn ToSql>> = vec![];

        if let Some(title) = changes.title {
            query_parameters.push(Box::new(title.as_ref().to_owned()));
            set_clause_parts.push(format!("title = ?{}", query_parameters.len()));
        }

        if let Some(kind) = changes.kind {
            query_parameters.push(Box::new(kind));
            set_clause_parts.push(format!("kind = ?{}", query_parameters.len()));
        }

        if let Some(amount) = changes.amount {
            query_parameters.push(Box::new(amount));
            set_clause_parts.push(format!("amount = ?{}", query_parameters.len()));
        }

        if let Some(category_id) = changes.category_id {
            query_parameters.push(Box::new(category_id));
            set_clause_parts.push(format!("category_id = ?{}", query_parameters.len()));
        }

        query_parameters.push(Box::new(OffsetDateTime::now_utc()));
        set_clause_parts.push(format!("updated_at = ?{}", query_parameters.len()));

        query_parameters.push(Box::new(id));
        let query_string = format!(
            "UPDATE \"transaction\" SET {} WHERE id = ?{}",
            set_clause_parts.join(", "),
            query_parameters.len()
        );

        let rows_affected = self
            .lock()?
            .execute(&query_string, params_from_iter(query_parameters.iter()))?;

        Ok(RowsAffected::new(rows_affected))
    }

    fn delete(&self, id: TransactionId) -> Result<RowsAffected, Error> {
        let rows_affected = self
            .lock()?
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

        Ok(RowsAffected::new(rows_affected))
    }
}

/// Work out which reference of a transaction failed its foreign key check.
///
/// The user is checked first, since a missing user also makes any category
/// invalid for them.
fn missing_reference_error(user_id: UserID, connection: &Connection) -> Result<Error, Error> {
    let user_exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    if user_exists {
        Ok(Error::InvalidCategory)
    } else {
        Ok(Error::InvalidUser)
    }
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            amount REAL NOT NULL,
            category_id INTEGER,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_id ON \"transaction\"(user_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// Map a row selected with [TRANSACTION_COLUMNS] to a [Transaction].
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_title: String = row.get(1)?;

    Ok(Transaction {
        id: row.get(0)?,
        title: TransactionTitle::new_unchecked(&raw_title),
        kind: row.get(2)?,
        amount: row.get(3)?,
        category_id: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
