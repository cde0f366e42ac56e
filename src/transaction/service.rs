//! Business rules for recording and querying transactions.

use crate::{
    Error, RowsAffected, UserID,
    category::{CategoryId, CategoryStore},
    transaction::{
        CreateTransactionData, NewTransaction, Transaction, TransactionId, TransactionKind,
        TransactionStore, TransactionTitle, UpdateTransaction, UpdateTransactionData,
        domain::validate_amount,
    },
};

/// Creates, queries, updates and removes a user's transactions.
///
/// Categories are consulted so that a transaction can only be filed under a
/// category owned by the same user.
#[derive(Debug, Clone)]
pub struct TransactionService<T, C> {
    transactions: T,
    categories: C,
}

impl<T, C> TransactionService<T, C>
where
    T: TransactionStore,
    C: CategoryStore,
{
    /// Create a service backed by a transaction store and a category store.
    pub fn new(transactions: T, categories: C) -> Self {
        Self {
            transactions,
            categories,
        }
    }

    /// Record a new transaction for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::EmptyTransactionTitle] if the title is blank,
    /// - [Error::InvalidAmount] if the amount is negative or not finite,
    /// - [Error::InvalidCategory] if the category does not belong to `user_id`,
    /// - or any error from the underlying stores.
    pub fn create(
        &self,
        data: CreateTransactionData,
        user_id: UserID,
    ) -> Result<Transaction, Error> {
        let title = TransactionTitle::new(&data.title)?;
        let amount = validate_amount(data.amount)?;

        if let Some(category_id) = data.category_id {
            self.check_category_owner(category_id, user_id)?;
        }

        let transaction = self.transactions.create(NewTransaction {
            title,
            kind: data.kind,
            amount,
            category_id: data.category_id,
            user_id,
        })?;

        tracing::debug!("Created transaction {} for user {user_id}", transaction.id);

        Ok(transaction)
    }

    /// All of a user's transactions, newest first.
    pub fn find_all(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.transactions.get_by_user(user_id)
    }

    /// One page of a user's transactions, newest first.
    ///
    /// `page` starts at 1.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPagination] if `page` or `limit` is zero, or if
    /// `limit` or the number of skipped rows is larger than `i64::MAX`.
    pub fn find_all_with_pagination(
        &self,
        user_id: UserID,
        page: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error> {
        if page == 0 || limit == 0 {
            return Err(Error::InvalidPagination);
        }

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or(Error::InvalidPagination)?;

        // SQLite integers are signed 64 bit.
        if limit > i64::MAX as u64 || offset > i64::MAX as u64 {
            return Err(Error::InvalidPagination);
        }

        self.transactions.get_page(user_id, limit, offset)
    }

    /// The total amount of a user's income or expenses.
    pub fn find_all_by_type(&self, user_id: UserID, kind: TransactionKind) -> Result<f64, Error> {
        self.transactions.sum_by_kind(user_id, kind)
    }

    /// Get a transaction by its ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::TransactionNotFound] if there is no such transaction.
    pub fn find_one(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.transactions.get(id)?.ok_or_else(|| {
            tracing::info!("Transaction {id} not found");
            Error::TransactionNotFound
        })
    }

    /// Apply the fields set in `data` to the transaction with `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TransactionNotFound] if there is no such transaction,
    /// in which case nothing is written. A new category must belong to the
    /// transaction's owner, otherwise [Error::InvalidCategory] is returned.
    pub fn update(
        &self,
        id: TransactionId,
        data: UpdateTransactionData,
    ) -> Result<RowsAffected, Error> {
        let transaction = self.find_one(id)?;
        let changes = UpdateTransaction::try_from(data)?;

        if let Some(category_id) = changes.category_id {
            self.check_category_owner(category_id, transaction.user_id)?;
        }

        if changes.is_empty() {
            tracing::debug!("No fields to change for transaction {id}, only touching updated_at");
        }

        let rows_affected = self.transactions.update(id, changes)?;
        tracing::debug!("Updated transaction {id}");

        Ok(rows_affected)
    }

    /// Delete the transaction with `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TransactionNotFound] if there is no such transaction,
    /// in which case nothing is deleted.
    pub fn remove(&self, id: TransactionId) -> Result<RowsAffected, Error> {
        self.find_one(id)?;

        let rows_affected = self.transactions.delete(id)?;
        tracing::debug!("Deleted transaction {id}");

        Ok(rows_affected)
    }

    fn check_category_owner(&self, category_id: CategoryId, user_id: UserID) -> Result<(), Error> {
        match self.categories.get(category_id)? {
            Some(category) if category.user_id == user_id => Ok(()),
            _ => {
                tracing::warn!(
                    "User {user_id} tried to use category {category_id}, which they do not own"
                );
                Err(Error::InvalidCategory)
            }
        }
    }
}

#[cfg(test)]
mod transaction_service_tests {
    use std::sync::{Arc, Mutex};

    use time::OffsetDateTime;

    use crate::{
        Error, RowsAffected, UserID,
        category::{Category, CategoryTitle, test_utils::SpyCategoryStore},
        transaction::{
            CreateTransactionData, NewTransaction, Transaction, TransactionId, TransactionKind,
            TransactionService, TransactionStore, TransactionTitle, UpdateTransaction,
            UpdateTransactionData,
        },
    };

    #[derive(Debug, Clone, PartialEq)]
    enum TransactionStoreCall {
        Create(NewTransaction),
        Get(TransactionId),
        GetByUser(UserID),
        GetPage {
            user_id: UserID,
            limit: u64,
            offset: u64,
        },
        SumByKind(UserID, TransactionKind),
        Update(TransactionId, UpdateTransaction),
        Delete(TransactionId),
    }

    #[derive(Clone, Default)]
    struct SpyTransactionStore {
        // Use Arc Mutex so that clones of the store share state.
        calls: Arc<Mutex<Vec<TransactionStoreCall>>>,
        transactions: Arc<Mutex<Vec<Transaction>>>,
    }

    impl SpyTransactionStore {
        fn with_transactions(transactions: Vec<Transaction>) -> Self {
            Self {
                calls: Arc::default(),
                transactions: Arc::new(Mutex::new(transactions)),
            }
        }

        fn calls(&self) -> Vec<TransactionStoreCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: TransactionStoreCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl TransactionStore for SpyTransactionStore {
        fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
            self.record(TransactionStoreCall::Create(new_transaction.clone()));

            let transaction = Transaction {
                id: 1,
                title: new_transaction.title,
                kind: new_transaction.kind,
                amount: new_transaction.amount,
                category_id: new_transaction.category_id,
                user_id: new_transaction.user_id,
                created_at: OffsetDateTime::UNIX_EPOCH,
                updated_at: OffsetDateTime::UNIX_EPOCH,
            };
            self.transactions.lock().unwrap().push(transaction.clone());

            Ok(transaction)
        }

        fn get(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
            self.record(TransactionStoreCall::Get(id));

            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .find(|transaction| transaction.id == id)
                .cloned())
        }

        fn get_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
            self.record(TransactionStoreCall::GetByUser(user_id));

            Ok(self.transactions.lock().unwrap().clone())
        }

        fn get_page(
            &self,
            user_id: UserID,
            limit: u64,
            offset: u64,
        ) -> Result<Vec<Transaction>, Error> {
            self.record(TransactionStoreCall::GetPage {
                user_id,
                limit,
                offset,
            });

            Ok(vec![])
        }

        fn sum_by_kind(&self, user_id: UserID, kind: TransactionKind) -> Result<f64, Error> {
            self.record(TransactionStoreCall::SumByKind(user_id, kind));

            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|transaction| transaction.kind == kind)
                .map(|transaction| transaction.amount)
                .sum())
        }

        fn update(
            &self,
            id: TransactionId,
            changes: UpdateTransaction,
        ) -> Result<RowsAffected, Error> {
            self.record(TransactionStoreCall::Update(id, changes));

            Ok(RowsAffected::new(1))
        }

        fn delete(&self, id: TransactionId) -> Result<RowsAffected, Error> {
            self.record(TransactionStoreCall::Delete(id));

            Ok(RowsAffected::new(1))
        }
    }

    fn transaction(id: TransactionId, kind: TransactionKind, amount: f64) -> Transaction {
        Transaction {
            id,
            title: TransactionTitle::new_unchecked("Test"),
            kind,
            amount,
            category_id: None,
            user_id: UserID::new(1),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn category(id: i64, user_id: UserID) -> Category {
        Category {
            id,
            title: CategoryTitle::new_unchecked("Food"),
            user_id,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn create_data(category_id: Option<i64>) -> CreateTransactionData {
        CreateTransactionData {
            title: "Groceries".to_owned(),
            kind: TransactionKind::Expense,
            amount: 52.3,
            category_id,
        }
    }

    #[test]
    fn create_saves_transaction_for_user() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.create(create_data(None), UserID::new(1));

        let got = got.expect("Could not create transaction");
        assert_eq!(got.amount, 52.3);
        assert_eq!(
            store.calls(),
            vec![TransactionStoreCall::Create(NewTransaction {
                title: TransactionTitle::new_unchecked("Groceries"),
                kind: TransactionKind::Expense,
                amount: 52.3,
                category_id: None,
                user_id: UserID::new(1),
            })]
        );
    }

    #[test]
    fn create_accepts_own_category() {
        let store = SpyTransactionStore::default();
        let categories = SpyCategoryStore::default();
        categories.set_get_result(Some(category(7, UserID::new(1))));
        let service = TransactionService::new(store.clone(), categories);

        let got = service.create(create_data(Some(7)), UserID::new(1));

        assert_eq!(got.map(|transaction| transaction.category_id), Ok(Some(7)));
    }

    #[test]
    fn create_rejects_other_users_category() {
        let store = SpyTransactionStore::default();
        let categories = SpyCategoryStore::default();
        categories.set_get_result(Some(category(7, UserID::new(2))));
        let service = TransactionService::new(store.clone(), categories);

        let got = service.create(create_data(Some(7)), UserID::new(1));

        assert_eq!(got, Err(Error::InvalidCategory));
        assert!(store.calls().is_empty(), "want no writes, got {:?}", store.calls());
    }

    #[test]
    fn create_rejects_missing_category() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.create(create_data(Some(7)), UserID::new(1));

        assert_eq!(got, Err(Error::InvalidCategory));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn create_rejects_negative_amount() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());
        let mut data = create_data(None);
        data.amount = -1.0;

        let got = service.create(data, UserID::new(1));

        assert_eq!(got, Err(Error::InvalidAmount(-1.0)));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn find_one_returns_transaction() {
        let want = transaction(3, TransactionKind::Income, 10.0);
        let store = SpyTransactionStore::with_transactions(vec![want.clone()]);
        let service = TransactionService::new(store, SpyCategoryStore::default());

        assert_eq!(service.find_one(3), Ok(want));
    }

    #[test]
    fn find_one_fails_when_missing() {
        let service =
            TransactionService::new(SpyTransactionStore::default(), SpyCategoryStore::default());

        assert_eq!(service.find_one(3), Err(Error::TransactionNotFound));
    }

    #[test]
    fn pagination_skips_previous_pages() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        service
            .find_all_with_pagination(UserID::new(1), 3, 10)
            .unwrap();

        assert_eq!(
            store.calls(),
            vec![TransactionStoreCall::GetPage {
                user_id: UserID::new(1),
                limit: 10,
                offset: 20,
            }]
        );
    }

    #[test]
    fn pagination_rejects_page_zero() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.find_all_with_pagination(UserID::new(1), 0, 10);

        assert_eq!(got, Err(Error::InvalidPagination));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn pagination_rejects_zero_limit() {
        let service =
            TransactionService::new(SpyTransactionStore::default(), SpyCategoryStore::default());

        let got = service.find_all_with_pagination(UserID::new(1), 1, 0);

        assert_eq!(got, Err(Error::InvalidPagination));
    }

    #[test]
    fn pagination_rejects_huge_page() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.find_all_with_pagination(UserID::new(1), u64::MAX, 1);

        assert_eq!(got, Err(Error::InvalidPagination));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn pagination_rejects_huge_limit() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.find_all_with_pagination(UserID::new(1), 1, u64::MAX);

        assert_eq!(got, Err(Error::InvalidPagination));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn pagination_accepts_largest_sqlite_offset() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.find_all_with_pagination(UserID::new(1), i64::MAX as u64 + 1, 1);

        assert_eq!(got, Ok(vec![]));
        assert_eq!(
            store.calls(),
            vec![TransactionStoreCall::GetPage {
                user_id: UserID::new(1),
                limit: 1,
                offset: i64::MAX as u64,
            }]
        );
    }

    #[test]
    fn find_all_by_type_sums_amounts() {
        let store = SpyTransactionStore::with_transactions(vec![
            transaction(1, TransactionKind::Income, 10.0),
            transaction(2, TransactionKind::Expense, 3.0),
            transaction(3, TransactionKind::Income, 5.0),
        ]);
        let service = TransactionService::new(store, SpyCategoryStore::default());

        let got = service.find_all_by_type(UserID::new(1), TransactionKind::Income);

        assert_eq!(got, Ok(15.0));
    }

    #[test]
    fn update_fails_when_missing() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.update(3, UpdateTransactionData::default());

        assert_eq!(got, Err(Error::TransactionNotFound));
        assert_eq!(store.calls(), vec![TransactionStoreCall::Get(3)]);
    }

    #[test]
    fn update_applies_changes() {
        let store = SpyTransactionStore::with_transactions(vec![transaction(
            3,
            TransactionKind::Income,
            1.0,
        )]);
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());
        let data = UpdateTransactionData {
            title: Some("Bonus".to_owned()),
            ..Default::default()
        };

        let got = service.update(3, data);

        assert_eq!(got, Ok(RowsAffected::new(1)));
        assert_eq!(
            store.calls(),
            vec![
                TransactionStoreCall::Get(3),
                TransactionStoreCall::Update(
                    3,
                    UpdateTransaction {
                        title: Some(TransactionTitle::new_unchecked("Bonus")),
                        ..Default::default()
                    }
                ),
            ]
        );
    }

    #[test]
    fn update_without_changes_still_touches_transaction() {
        let store = SpyTransactionStore::with_transactions(vec![transaction(
            3,
            TransactionKind::Income,
            1.0,
        )]);
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.update(3, UpdateTransactionData::default());

        assert_eq!(got, Ok(RowsAffected::new(1)));
        assert_eq!(
            store.calls(),
            vec![
                TransactionStoreCall::Get(3),
                TransactionStoreCall::Update(3, UpdateTransaction::default()),
            ]
        );
    }

    #[test]
    fn update_rejects_other_users_category() {
        let store = SpyTransactionStore::with_transactions(vec![transaction(
            3,
            TransactionKind::Income,
            1.0,
        )]);
        let categories = SpyCategoryStore::default();
        categories.set_get_result(Some(category(7, UserID::new(2))));
        let service = TransactionService::new(store.clone(), categories);
        let data = UpdateTransactionData {
            category_id: Some(7),
            ..Default::default()
        };

        let got = service.update(3, data);

        assert_eq!(got, Err(Error::InvalidCategory));
        assert_eq!(store.calls(), vec![TransactionStoreCall::Get(3)]);
    }

    #[test]
    fn remove_fails_when_missing() {
        let store = SpyTransactionStore::default();
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.remove(3);

        assert_eq!(got, Err(Error::TransactionNotFound));
        assert_eq!(store.calls(), vec![TransactionStoreCall::Get(3)]);
    }

    #[test]
    fn remove_deletes_existing_transaction() {
        let store = SpyTransactionStore::with_transactions(vec![transaction(
            3,
            TransactionKind::Income,
            1.0,
        )]);
        let service = TransactionService::new(store.clone(), SpyCategoryStore::default());

        let got = service.remove(3);

        assert_eq!(got, Ok(RowsAffected::new(1)));
        assert_eq!(
            store.calls(),
            vec![TransactionStoreCall::Get(3), TransactionStoreCall::Delete(3)]
        );
    }
}
