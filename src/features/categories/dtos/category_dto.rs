use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryWithCount};

/// Response DTO for a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Number of letters filed under this category
    pub letters_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryWithCount> for CategoryResponseDto {
    fn from(c: CategoryWithCount) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            is_active: c.is_active,
            letters_count: c.letters_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Slim category DTO for the letter create/edit forms
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for ActiveCategoryDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
        }
    }
}

fn default_is_active() -> bool {
    true
}

/// Request DTO for creating a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Category name is required and must not exceed 255 characters"
    ))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

/// Request DTO for updating a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Category name is required and must not exceed 255 characters"
    ))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_fails_validation() {
        let dto = CreateCategoryDto {
            name: String::new(),
            description: None,
            is_active: true,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_is_active_defaults_to_true() {
        let dto: CreateCategoryDto =
            serde_json::from_str(r#"{"name": "Surat Edaran"}"#).unwrap();
        assert!(dto.is_active);
        assert!(dto.validate().is_ok());
    }
}
