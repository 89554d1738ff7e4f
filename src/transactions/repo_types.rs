use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    categories::repo_types::Category,
    store::{postgres::PgOwned, ListFilter, Owned},
};

/// Maps to the PostgreSQL enum `transaction_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "transaction_kind", rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("type must be income or expense, got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<OffsetDateTime>,
}

/// Response shape: the transaction with its category inlined. `category` is
/// `None` once the category has been soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Option<Category>,
}

/// Inclusive bounds on the effective date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl DateRange {
    pub fn contains(&self, date: OffsetDateTime) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
    pub range: DateRange,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListFilter for TransactionFilter {
    fn limit(&self) -> Option<i64> {
        self.limit.filter(|l| *l > 0)
    }

    fn offset(&self) -> i64 {
        self.offset.filter(|o| *o > 0).unwrap_or(0)
    }
}

impl Owned for Transaction {
    type Filter = TransactionFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn deleted_at(&self) -> Option<OffsetDateTime> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: OffsetDateTime) {
        self.deleted_at = Some(at);
    }

    fn matches(&self, filter: &TransactionFilter) -> bool {
        filter.kind.map_or(true, |k| self.kind == k)
            && filter.category_id.map_or(true, |c| self.category_id == c)
            && filter.range.contains(self.date)
    }

    /// Most recent effective date first, then most recently recorded.
    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

impl PgOwned for Transaction {
    const TABLE: &'static str = "transactions";
    const COLUMNS: &'static str =
        "id, user_id, category_id, amount, kind, description, date, created_at, updated_at, deleted_at";
}

#[derive(Debug, Default, Clone)]
pub struct TransactionPatch {
    pub category_id: Option<Uuid>,
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
}

impl TransactionPatch {
    pub fn apply(self, tx: &mut Transaction) {
        if let Some(category_id) = self.category_id {
            tx.category_id = category_id;
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(description) = self.description {
            tx.description = description;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, FromRow)]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
}

impl Summary {
    pub fn new(total_income: f64, total_expense: f64) -> Self {
        Self {
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
        }
    }
}
