use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    ActiveCategoryDto, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryWithCount};

const SELECT_WITH_COUNT: &str = r#"
SELECT
    c.id, c.name, c.description, c.is_active,
    COUNT(l.id) AS letters_count,
    c.created_at, c.updated_at
FROM letter_categories c
LEFT JOIN letters l ON l.category_id = c.id"#;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories with their letter counts, ordered by name.
    /// Returns the page rows and the total category count.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<CategoryResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM letter_categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count categories: {:?}", e);
                AppError::Database(e)
            })?;

        let sql = format!(
            "{} GROUP BY c.id ORDER BY c.name OFFSET $1 LIMIT $2",
            SELECT_WITH_COUNT
        );
        let categories = sqlx::query_as::<_, CategoryWithCount>(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((categories.into_iter().map(|c| c.into()).collect(), total))
    }

    /// List active categories, ordered by name (for letter create/edit forms)
    pub async fn list_active(&self) -> Result<Vec<ActiveCategoryDto>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM letter_categories WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list active categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get a category by id, with its letter count
    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let sql = format!("{} WHERE c.id = $1 GROUP BY c.id", SELECT_WITH_COUNT);
        let category = sqlx::query_as::<_, CategoryWithCount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch category: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO letter_categories (name, description, is_active)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::Database(e)
        })?;

        info!("Category created: id={}, name={}", category.id, category.name);

        self.get(category.id).await
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let updated = sqlx::query(
            r#"
            UPDATE letter_categories
            SET name = $2, description = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category: {:?}", e);
            AppError::Database(e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        info!("Category updated: id={}", id);

        self.get(id).await
    }

    /// Delete a category. Rejected while any letter still references it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let letters_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM letters WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count category letters: {:?}", e);
                    AppError::Database(e)
                })?;

        if letters_count > 0 {
            return Err(AppError::Conflict(
                "Category cannot be deleted because it is still used by letters".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM letter_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::Database(e)
            })?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        info!("Category deleted: id={}", id);

        Ok(())
    }
}
