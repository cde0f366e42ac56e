//! Categories for filing transactions, e.g. 'Groceries' or 'Salary'.

mod db;
mod domain;
mod service;
mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use db::{SQLiteCategoryStore, create_category_table};
pub use domain::{
    Category, CategoryId, CategoryTitle, CategoryWithTransactions, CreateCategoryData,
    NewCategory, UpdateCategory, UpdateCategoryData,
};
pub use service::CategoryService;
pub use store::CategoryStore;
