use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    categories::repo_types::Category,
    error::AppResult,
    store::{
        postgres::{PgOwned, PgRepo},
        ScopedRepo,
    },
};

#[async_trait]
impl ScopedRepo<Category> for PgRepo<Category> {
    async fn insert(&self, c: &Category) -> AppResult<Category> {
        let sql = format!(
            r#"
            INSERT INTO categories (id, user_id, name, description, color, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            Category::COLUMNS
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(c.id)
            .bind(c.user_id)
            .bind(&c.name)
            .bind(&c.description)
            .bind(&c.color)
            .bind(c.created_at)
            .bind(c.updated_at)
            .fetch_one(self.db())
            .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Category>> {
        self.fetch_scoped(id, user_id).await
    }

    async fn list(&self, user_id: Uuid, _filter: &()) -> AppResult<Vec<Category>> {
        self.fetch_all_scoped(user_id).await
    }

    async fn update(&self, c: &Category) -> AppResult<Option<Category>> {
        // user_id is only a predicate here; ownership never changes.
        let sql = format!(
            r#"
            UPDATE categories
               SET name = $3, description = $4, color = $5, updated_at = $6
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING {}
            "#,
            Category::COLUMNS
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(c.id)
            .bind(c.user_id)
            .bind(&c.name)
            .bind(&c.description)
            .bind(&c.color)
            .bind(c.updated_at)
            .fetch_optional(self.db())
            .await?;
        Ok(row)
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.soft_delete_scoped(id, user_id).await
    }
}
