use std::marker::PhantomData;

use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use super::Owned;
use crate::error::AppResult;

/// Table metadata for an [`Owned`] row stored in PostgreSQL.
pub trait PgOwned: Owned + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    /// Column list in `SELECT`/`RETURNING` order.
    const COLUMNS: &'static str;
}

/// PostgreSQL repository for `E`. The entity modules implement
/// [`ScopedRepo`](super::ScopedRepo) on top of the scoped helpers below.
pub struct PgRepo<E> {
    db: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepo<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: PgOwned> PgRepo<E> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    pub async fn fetch_scoped(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            E::COLUMNS,
            E::TABLE
        );
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    /// All live rows of `user_id` in insertion order.
    pub async fn fetch_all_scoped(&self, user_id: Uuid) -> AppResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at ASC, id ASC",
            E::COLUMNS,
            E::TABLE
        );
        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn soft_delete_scoped(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let sql = format!(
            "UPDATE {} SET deleted_at = now() WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            E::TABLE
        );
        let done = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
