//! Defines the category store trait.

use crate::{
    Error, RowsAffected, UserID,
    category::{
        Category, CategoryId, CategoryTitle, CategoryWithTransactions, NewCategory, UpdateCategory,
    },
};

/// Creates, retrieves, updates and deletes the categories that users file
/// their transactions under.
pub trait CategoryStore {
    /// Get the categories of `user_id` whose title is exactly `title`.
    fn find_by_title(&self, user_id: UserID, title: &CategoryTitle)
    -> Result<Vec<Category>, Error>;

    /// Get a category by its ID, or `None` if there is no such category.
    fn get(&self, category_id: CategoryId) -> Result<Option<Category>, Error>;

    /// Get a category by its ID along with its transactions.
    fn get_with_transactions(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<CategoryWithTransactions>, Error>;

    /// Get all categories for a given user along with their transactions.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<CategoryWithTransactions>, Error>;

    /// Create a new category and add it the store.
    fn create(&self, new_category: NewCategory) -> Result<Category, Error>;

    /// Apply `changes` to the category with `category_id`.
    fn update(&self, category_id: CategoryId, changes: UpdateCategory)
    -> Result<RowsAffected, Error>;

    /// Delete the category with `category_id`.
    fn delete(&self, category_id: CategoryId) -> Result<RowsAffected, Error>;
}
