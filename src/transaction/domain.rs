//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, UserID, category::CategoryId};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money flowing into the user's accounts, e.g. wages.
    Income,
    /// Money flowing out of the user's accounts, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The lowercase name used in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction kind \"{other}\"")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A validated, non-empty transaction title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionTitle(String);

impl TransactionTitle {
    /// Create a transaction title.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTransactionTitle] if `title`
    /// is empty or only whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyTransactionTitle)
        } else {
            Ok(Self(title.to_string()))
        }
    }

    /// Create a transaction title without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for TransactionTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub title: TransactionTitle,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money spent or earned. Never negative.
    pub amount: f64,
    /// The category the transaction is filed under, if any.
    pub category_id: Option<CategoryId>,
    pub user_id: UserID,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The record handed to a [TransactionStore](crate::TransactionStore) to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub title: TransactionTitle,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: Option<CategoryId>,
    pub user_id: UserID,
}

/// The validated changes to apply to an existing transaction.
///
/// Fields set to `None` are left unchanged. A transaction cannot be moved
/// out of its category, only into another one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTransaction {
    pub title: Option<TransactionTitle>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub category_id: Option<CategoryId>,
}

impl UpdateTransaction {
    /// Whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
    }
}

/// Request body for creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionData {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(default, alias = "category")]
    pub category_id: Option<CategoryId>,
}

/// Request body for updating a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, alias = "category")]
    pub category_id: Option<CategoryId>,
}

/// Check that `amount` is a finite, non-negative number.
pub(crate) fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

impl TryFrom<UpdateTransactionData> for UpdateTransaction {
    type Error = Error;

    fn try_from(data: UpdateTransactionData) -> Result<Self, Self::Error> {
        let title = data
            .title
            .as_deref()
            .map(TransactionTitle::new)
            .transpose()?;
        let amount = data.amount.map(validate_amount).transpose()?;

        Ok(Self {
            title,
            kind: data.kind,
            amount,
            category_id: data.category_id,
        })
    }
}
