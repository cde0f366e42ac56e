//! Business rules for managing a user's categories.

use crate::{
    Error, RowsAffected, UserID,
    category::{
        Category, CategoryId, CategoryStore, CategoryTitle, CategoryWithTransactions,
        CreateCategoryData, NewCategory, UpdateCategory, UpdateCategoryData,
    },
};

/// Creates, queries, updates and removes the categories a user files their
/// transactions under.
///
/// Every write is preceded by a query that checks the write makes sense: a
/// user cannot have two categories with the same title, and only existing
/// categories can be updated or removed.
#[derive(Debug, Clone)]
pub struct CategoryService<C> {
    store: C,
}

impl<C> CategoryService<C>
where
    C: CategoryStore,
{
    /// Create a service backed by `store`.
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Create a category for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::EmptyCategoryTitle] if the title is blank,
    /// - [Error::DuplicateCategory] if the user already has a category with
    ///   the same title, in which case nothing is written,
    /// - or any error from the store.
    pub fn create(&self, data: CreateCategoryData, user_id: UserID) -> Result<Category, Error> {
        let title = CategoryTitle::new(&data.title)?;

        if !self.store.find_by_title(user_id, &title)?.is_empty() {
            tracing::info!("User {user_id} already has a category called \"{title}\"");
            return Err(Error::DuplicateCategory);
        }

        let category = self.store.create(NewCategory { title, user_id })?;
        tracing::debug!("Created category {} for user {user_id}", category.id);

        Ok(category)
    }

    /// Get a category and its transactions.
    ///
    /// # Errors
    ///
    /// Returns [Error::CategoryNotFound] if there is no such category.
    pub fn find_one(&self, id: CategoryId) -> Result<CategoryWithTransactions, Error> {
        self.store.get_with_transactions(id)?.ok_or_else(|| {
            tracing::info!("Category {id} not found");
            Error::CategoryNotFound
        })
    }

    /// Get all of a user's categories and their transactions.
    pub fn find_all(&self, user_id: UserID) -> Result<Vec<CategoryWithTransactions>, Error> {
        self.store.get_by_user(user_id)
    }

    /// Apply the fields set in `data` to the category with `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::CategoryNotFound] if there is no such category, in
    /// which case nothing is written, or [Error::EmptyCategoryTitle] if the
    /// new title is blank.
    pub fn update(&self, id: CategoryId, data: UpdateCategoryData) -> Result<RowsAffected, Error> {
        self.check_exists(id)?;
        let changes = UpdateCategory::try_from(data)?;

        let rows_affected = self.store.update(id, changes)?;
        tracing::debug!("Updated category {id}");

        Ok(rows_affected)
    }

    /// Delete the category with `id`.
    ///
    /// Its transactions are kept without a category.
    ///
    /// # Errors
    ///
    /// Returns [Error::CategoryNotFound] if there is no such category, in
    /// which case nothing is deleted.
    pub fn remove(&self, id: CategoryId) -> Result<RowsAffected, Error> {
        self.check_exists(id)?;

        let rows_affected = self.store.delete(id)?;
        tracing::debug!("Deleted category {id}");

        Ok(rows_affected)
    }

    fn check_exists(&self, id: CategoryId) -> Result<(), Error> {
        match self.store.get(id)? {
            Some(_) => Ok(()),
            None => {
                tracing::info!("Category {id} not found");
                Err(Error::CategoryNotFound)
            }
        }
    }
}
