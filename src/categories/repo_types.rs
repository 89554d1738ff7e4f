use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::{postgres::PgOwned, Owned};

pub const DEFAULT_COLOR: &str = "#007bff";

/// Category record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<OffsetDateTime>,
}

impl Owned for Category {
    type Filter = ();

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
}

impl PgOwned for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static str =
        "id, user_id, name, description, color, created_at, updated_at, deleted_at";
}

/// Partial update; `None` leaves the field as stored.
#[derive(Debug, Default, Clone)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        if let Some(color) = self.color {
            category.color = color;
        }
    }
}
