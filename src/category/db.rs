//! Implements a SQLite backed category store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error, RowsAffected, UserID,
    category::{
        Category, CategoryId, CategoryStore, CategoryTitle, CategoryWithTransactions, NewCategory,
        UpdateCategory,
    },
    transaction::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
};

const CATEGORY_COLUMNS: &str = "id, title, user_id, created_at, updated_at";

/// Creates, retrieves, updates and deletes categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl CategoryStore for SQLiteCategoryStore {
    fn find_by_title(
        &self,
        user_id: UserID,
        title: &CategoryTitle,
    ) -> Result<Vec<Category>, Error> {
        self.lock()?
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category WHERE user_id = ?1 AND title = ?2"
            ))?
            .query_map((user_id.as_i64(), title.as_ref()), map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    fn get(&self, category_id: CategoryId) -> Result<Option<Category>, Error> {
        let connection = self.lock()?;

        select_category(category_id, &connection)
    }

    fn get_with_transactions(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<CategoryWithTransactions>, Error> {
        let connection = self.lock()?;

        let Some(category) = select_category(category_id, &connection)? else {
            return Ok(None);
        };

        let transactions = connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE category_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?
            .query_map([category_id], map_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CategoryWithTransactions {
            category,
            transactions,
        }))
    }

    /// Retrieve a user's categories in the order they were created.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<CategoryWithTransactions>, Error> {
        let connection = self.lock()?;

        let categories = connection
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category WHERE user_id = ?1 ORDER BY id ASC"
            ))?
            .query_map([user_id.as_i64()], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut transactions_by_category: HashMap<CategoryId, Vec<Transaction>> = HashMap::new();

        connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE category_id IN (SELECT id FROM category WHERE user_id = ?1)
                 ORDER BY created_at DESC, id DESC"
            ))?
            .query_map([user_id.as_i64()], map_transaction_row)?
            .try_for_each(|maybe_transaction| {
                let transaction = maybe_transaction?;

                if let Some(category_id) = transaction.category_id {
                    transactions_by_category
                        .entry(category_id)
                        .or_default()
                        .push(transaction);
                }

                Ok::<(), rusqlite::Error>(())
            })?;

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithTransactions {
                transactions: transactions_by_category
                    .remove(&category.id)
                    .unwrap_or_default(),
                category,
            })
            .collect())
    }

    /// Create a category in the database.
    ///
    /// # Errors
    /// This function will return an [Error::InvalidUser] if `user_id` does not
    /// refer to a valid user, or an [Error::SqlError] if there is some other
    /// SQL error.
    fn create(&self, new_category: NewCategory) -> Result<Category, Error> {
        let now = OffsetDateTime::now_utc();

        self.lock()?
            .prepare(&format!(
                "INSERT INTO category (title, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 RETURNING {CATEGORY_COLUMNS}"
            ))?
            .query_row(
                (
                    new_category.title.as_ref(),
                    new_category.user_id.as_i64(),
                    now,
                ),
                map_row,
            )
            .map_err(|error| error.into())
    }

    /// Update the category's title, if given, and set `updated_at` to now.
    fn update(
        &self,
        category_id: CategoryId,
        changes: UpdateCategory,
    ) -> Result<RowsAffected, Error> {
        let now = OffsetDateTime::now_utc();
        let connection = self.lock()?;

        let rows_affected = match changes.title {
            Some(title) => connection.execute(
                "UPDATE category SET title = ?1, updated_at = ?2 WHERE id = ?3",
                (title.as_ref(), now, category_id),
            )?,
            None => connection.execute(
                "UPDATE category SET updated_at = ?1 WHERE id = ?2",
                (now, category_id),
            )?,
        };

        Ok(RowsAffected::new(rows_affected))
    }

    /// Delete a category by ID.
    ///
    /// The category's transactions are kept and no longer have a category.
    fn delete(&self, category_id: CategoryId) -> Result<RowsAffected, Error> {
        let rows_affected = self
            .lock()?
            .execute("DELETE FROM category WHERE id = ?1", [category_id])?;

        Ok(RowsAffected::new(rows_affected))
    }
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_title ON category(user_id, title);",
    )?;

    Ok(())
}

fn select_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id"
        ))?
        .query_row(&[(":id", &category_id)], map_row)
        .optional()
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_title: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        title: CategoryTitle::new_unchecked(&raw_title),
        user_id: UserID::new(row.get(2)?),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
