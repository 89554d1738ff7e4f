use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    categories::repo_types::{Category, CategoryPatch, DEFAULT_COLOR},
    error::{AppError, AppResult},
    store::ScopedRepo,
};

pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn ScopedRepo<Category>>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn ScopedRepo<Category>>) -> Self {
        Self { categories }
    }

    pub async fn create(&self, user_id: Uuid, new: NewCategory) -> AppResult<Category> {
        let now = OffsetDateTime::now_utc();
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: new.name,
            description: new.description.unwrap_or_default(),
            color: new
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let category = self.categories.insert(&category).await?;
        info!(%user_id, category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Category>> {
        self.categories.list(user_id, &()).await
    }

    /// Missing and foreign categories are both `NotFound`.
    pub async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<Category> {
        self.categories
            .find(id, user_id)
            .await?
            .ok_or(AppError::NotFound("category"))
    }

    pub async fn update(&self, id: Uuid, user_id: Uuid, patch: CategoryPatch) -> AppResult<Category> {
        let mut category = self.get(id, user_id).await?;
        patch.apply(&mut category);
        category.updated_at = OffsetDateTime::now_utc();

        let category = self
            .categories
            .update(&category)
            .await?
            .ok_or(AppError::NotFound("category"))?;
        info!(%user_id, category_id = %id, "category updated");
        Ok(category)
    }

    /// Idempotent: deleting a missing or foreign id succeeds without effect.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if self.categories.soft_delete(id, user_id).await? {
            info!(%user_id, category_id = %id, "category deleted");
        } else {
            debug!(%user_id, category_id = %id, "category delete matched no rows");
        }
        Ok(())
    }
}
