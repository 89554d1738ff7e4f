use serde::{Deserialize, Serialize};

use crate::categories::{repo_types::CategoryPatch, services::NewCategory};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CreateCategoryRequest {
    pub fn into_new(self) -> AppResult<NewCategory> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }
        Ok(NewCategory {
            name: name.to_string(),
            description: self.description,
            color: self.color,
        })
    }
}

/// Absent and `null` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn into_patch(self) -> AppResult<CategoryPatch> {
        let name = match self.name {
            Some(n) if n.trim().is_empty() => {
                return Err(AppError::validation("name must not be empty"))
            }
            Some(n) => Some(n.trim().to_string()),
            None => None,
        };
        Ok(CategoryPatch {
            name,
            description: self.description,
            color: self.color,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
