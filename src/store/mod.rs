//! Ownership-scoped persistence.
//!
//! Categories and transactions share one access pattern: every read, update
//! and delete is keyed by `(id, user_id)` and ignores soft-deleted rows.
//! [`ScopedRepo`] captures that pattern once; [`postgres`] and [`memory`]
//! provide the backends.

use std::cmp::Ordering;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

/// A record that belongs to exactly one user and is soft-deleted, never removed.
pub trait Owned: Clone + Send + Sync + 'static {
    type Filter: ListFilter;

    fn id(&self) -> Uuid;
    fn user_id(&self) -> Uuid;
    fn deleted_at(&self) -> Option<OffsetDateTime>;
    fn mark_deleted(&mut self, at: OffsetDateTime);

    /// Whether the record passes the listing filter.
    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }

    /// Listing order; `Equal` keeps insertion order.
    fn listing_order(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// Pagination shared by all listing filters.
pub trait ListFilter: Send + Sync {
    fn limit(&self) -> Option<i64> {
        None
    }

    fn offset(&self) -> i64 {
        0
    }
}

impl ListFilter for () {}

#[async_trait]
pub trait ScopedRepo<E: Owned>: Send + Sync {
    async fn insert(&self, entity: &E) -> AppResult<E>;

    /// Live record with this id owned by `user_id`.
    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<E>>;

    async fn list(&self, user_id: Uuid, filter: &E::Filter) -> AppResult<Vec<E>>;

    /// Persists mutable fields; `None` when the row is gone or not owned.
    async fn update(&self, entity: &E) -> AppResult<Option<E>>;

    /// Returns whether a live row was marked deleted.
    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;
}
