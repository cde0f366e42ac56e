use std::sync::{Arc, Mutex};

use crate::{
    Error, RowsAffected, UserID,
    category::{
        Category, CategoryId, CategoryStore, CategoryTitle, CategoryWithTransactions, NewCategory,
        UpdateCategory,
    },
};

/// A call made to a [SpyCategoryStore].
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryStoreCall {
    FindByTitle(UserID, CategoryTitle),
    Get(CategoryId),
    GetWithTransactions(CategoryId),
    GetByUser(UserID),
    Create(NewCategory),
    Update(CategoryId, UpdateCategory),
    Delete(CategoryId),
}

/// A category store that records every call and returns canned results.
///
/// Writes return the result set with the matching `set_*` method, or a
/// default when none was set.
#[derive(Clone, Default)]
pub struct SpyCategoryStore {
    // Use Arc Mutex so that clones of the store share state with the copy
    // moved into the service under test.
    calls: Arc<Mutex<Vec<CategoryStoreCall>>>,
    find_by_title_result: Arc<Mutex<Vec<Category>>>,
    get_result: Arc<Mutex<Option<Category>>>,
    get_with_transactions_result: Arc<Mutex<Option<CategoryWithTransactions>>>,
    get_by_user_result: Arc<Mutex<Vec<CategoryWithTransactions>>>,
    create_result: Arc<Mutex<Option<Category>>>,
    rows_affected: Arc<Mutex<usize>>,
}

impl SpyCategoryStore {
    pub fn calls(&self) -> Vec<CategoryStoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_find_by_title_result(&self, categories: Vec<Category>) {
        *self.find_by_title_result.lock().unwrap() = categories;
    }

    pub fn set_get_result(&self, category: Option<Category>) {
        *self.get_result.lock().unwrap() = category;
    }

    pub fn set_get_with_transactions_result(&self, category: Option<CategoryWithTransactions>) {
        *self.get_with_transactions_result.lock().unwrap() = category;
    }

    pub fn set_get_by_user_result(&self, categories: Vec<CategoryWithTransactions>) {
        *self.get_by_user_result.lock().unwrap() = categories;
    }

    pub fn set_create_result(&self, category: Category) {
        *self.create_result.lock().unwrap() = Some(category);
    }

    pub fn set_rows_affected(&self, rows_affected: usize) {
        *self.rows_affected.lock().unwrap() = rows_affected;
    }

    fn record(&self, call: CategoryStoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CategoryStore for SpyCategoryStore {
    fn find_by_title(
        &self,
        user_id: UserID,
        title: &CategoryTitle,
    ) -> Result<Vec<Category>, Error> {
        self.record(CategoryStoreCall::FindByTitle(user_id, title.clone()));

        Ok(self.find_by_title_result.lock().unwrap().clone())
    }

    fn get(&self, category_id: CategoryId) -> Result<Option<Category>, Error> {
        self.record(CategoryStoreCall::Get(category_id));

        Ok(self.get_result.lock().unwrap().clone())
    }

    fn get_with_transactions(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<CategoryWithTransactions>, Error> {
        self.record(CategoryStoreCall::GetWithTransactions(category_id));

        Ok(self.get_with_transactions_result.lock().unwrap().clone())
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<CategoryWithTransactions>, Error> {
        self.record(CategoryStoreCall::GetByUser(user_id));

        Ok(self.get_by_user_result.lock().unwrap().clone())
    }

    fn create(&self, new_category: NewCategory) -> Result<Category, Error> {
        self.record(CategoryStoreCall::Create(new_category));

        self.create_result
            .lock()
            .unwrap()
            .clone()
            .ok_or(Error::SqlError(rusqlite::Error::InvalidQuery))
    }

    fn update(
        &self,
        category_id: CategoryId,
        changes: UpdateCategory,
    ) -> Result<RowsAffected, Error> {
        self.record(CategoryStoreCall::Update(category_id, changes));

        Ok(RowsAffected::new(*self.rows_affected.lock().unwrap()))
    }

    fn delete(&self, category_id: CategoryId) -> Result<RowsAffected, Error> {
        self.record(CategoryStoreCall::Delete(category_id));

        Ok(RowsAffected::new(*self.rows_affected.lock().unwrap()))
    }
}
