//! In-process stores with the same visibility rules as the PostgreSQL ones.
//! Used by `AppState::in_memory` and the service and router tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{ListFilter, Owned, ScopedRepo};
use crate::{
    auth::{repo::UserRepo, repo_types::User},
    error::{AppError, AppResult},
    transactions::{
        repo::TransactionRepo,
        repo_types::{DateRange, Summary, Transaction, TransactionKind},
    },
};

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MemoryRepo<E> {
    rows: Arc<Mutex<Vec<E>>>,
}

impl<E> Default for MemoryRepo<E> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E> Clone for MemoryRepo<E> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

fn live<E: Owned>(row: &E, user_id: Uuid) -> bool {
    row.user_id() == user_id && row.deleted_at().is_none()
}

#[async_trait]
impl<E: Owned> ScopedRepo<E> for MemoryRepo<E> {
    async fn insert(&self, entity: &E) -> AppResult<E> {
        guard(&self.rows).push(entity.clone());
        Ok(entity.clone())
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<E>> {
        Ok(guard(&self.rows)
            .iter()
            .find(|r| r.id() == id && live(*r, user_id))
            .cloned())
    }

    async fn list(&self, user_id: Uuid, filter: &E::Filter) -> AppResult<Vec<E>> {
        let mut rows: Vec<E> = guard(&self.rows)
            .iter()
            .filter(|r| live(*r, user_id) && r.matches(filter))
            .cloned()
            .collect();
        // Stable, so ties keep insertion order.
        rows.sort_by(|a, b| a.listing_order(b));

        let skip = usize::try_from(filter.offset()).unwrap_or(0);
        let take = filter
            .limit()
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).collect())
    }

    async fn update(&self, entity: &E) -> AppResult<Option<E>> {
        let mut rows = guard(&self.rows);
        let Some(slot) = rows
            .iter_mut()
            .find(|r| r.id() == entity.id() && live(&**r, entity.user_id()))
        else {
            return Ok(None);
        };
        *slot = entity.clone();
        Ok(Some(slot.clone()))
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut rows = guard(&self.rows);
        match rows.iter_mut().find(|r| r.id() == id && live(&**r, user_id)) {
            Some(row) => {
                row.mark_deleted(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TransactionRepo for MemoryRepo<Transaction> {
    async fn summary(&self, user_id: Uuid, range: &DateRange) -> AppResult<Summary> {
        let (mut income, mut expense) = (0.0, 0.0);
        for tx in guard(&self.rows)
            .iter()
            .filter(|t| live(*t, user_id) && range.contains(t.date))
        {
            match tx.kind {
                TransactionKind::Income => income += tx.amount,
                TransactionKind::Expense => expense += tx.amount,
            }
        }
        Ok(Summary::new(income, expense))
    }
}

#[derive(Clone, Default)]
pub struct MemoryUsers {
    users: Arc<Mutex<Vec<User>>>,
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(guard(&self.users)
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(guard(&self.users)
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, user: &User) -> AppResult<User> {
        let mut users = guard(&self.users);
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("user with this email already exists".into()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }
}
