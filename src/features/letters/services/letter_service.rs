use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::letters::dtos::{LetterFilter, LetterForm, LetterResponseDto};
use crate::features::letters::models::{Letter, LetterWithRelations};
use crate::modules::storage::DiskStorage;
use crate::shared::constants::LETTER_STORAGE_PREFIX;
use crate::shared::types::PaginationQuery;

const SELECT_WITH_RELATIONS: &str = r#"
SELECT
    l.id, l.type, l.number, l.letter_date, l.subject, l.sender_recipient,
    l.description, l.file_path, l.original_filename,
    l.category_id, c.name AS category_name,
    l.created_by, u.name AS creator_name,
    l.created_at, l.updated_at
FROM letters l
LEFT JOIN letter_categories c ON c.id = l.category_id
JOIN users u ON u.id = l.created_by
WHERE 1=1"#;

/// Append WHERE clauses for the given filter to a query whose letters table
/// is aliased `l` and whose clause chain is already open (`WHERE 1=1`).
///
/// Filters AND together; the search term ORs across number, subject, and
/// sender_recipient as a substring match.
pub(crate) fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LetterFilter) {
    if let Some(letter_type) = filter.letter_type {
        qb.push(" AND l.type = ").push_bind(letter_type);
    }

    if let Some(category_id) = filter.category_id {
        qb.push(" AND l.category_id = ").push_bind(category_id);
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (l.number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.subject ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.sender_recipient ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(date_from) = filter.date_from {
        qb.push(" AND l.letter_date >= ").push_bind(date_from);
    }

    if let Some(date_to) = filter.date_to {
        qb.push(" AND l.letter_date <= ").push_bind(date_to);
    }
}

/// Service for letter operations, owning the attachment lifecycle
pub struct LetterService {
    pool: PgPool,
    storage: Arc<DiskStorage>,
}

impl LetterService {
    pub fn new(pool: PgPool, storage: Arc<DiskStorage>) -> Self {
        Self { pool, storage }
    }

    /// List letters matching `filter`, newest letter_date first.
    /// Returns the page rows and the total match count.
    pub async fn list(
        &self,
        filter: &LetterFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<LetterResponseDto>, i64)> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM letters l WHERE 1=1");
        apply_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count letters: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::new(SELECT_WITH_RELATIONS);
        apply_filters(&mut qb, filter);
        qb.push(" ORDER BY l.letter_date DESC, l.created_at DESC");
        qb.push(" OFFSET ").push_bind(pagination.offset());
        qb.push(" LIMIT ").push_bind(pagination.limit());

        let letters = qb
            .build_query_as::<LetterWithRelations>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list letters: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((letters.into_iter().map(|l| l.into()).collect(), total))
    }

    /// Get a letter with its category and creator attached
    pub async fn get(&self, id: Uuid) -> Result<LetterResponseDto> {
        Ok(self.fetch_with_relations(id).await?.into())
    }

    /// Read the stored attachment for a letter, returning its bytes and the
    /// filename to serve it under.
    pub async fn download(&self, id: Uuid) -> Result<(Vec<u8>, String)> {
        let letter = self.fetch(id).await?;

        let file_path = letter
            .file_path
            .ok_or_else(|| AppError::NotFound("Letter has no attached file".to_string()))?;

        // A dangling file_path (row ahead of disk) surfaces as NotFound here
        let data = self.storage.read(&file_path).await?;

        let filename = letter
            .original_filename
            .unwrap_or_else(|| "surat.pdf".to_string());

        Ok((data, filename))
    }

    /// Create a letter from a submitted form, storing the attachment first
    /// and recording the current actor as creator.
    pub async fn create(
        &self,
        form: LetterForm,
        actor: &AuthenticatedUser,
    ) -> Result<LetterResponseDto> {
        let validated = form
            .validate()
            .map_err(|errors| AppError::Validation(errors.join("; ")))?;

        self.ensure_number_unique(&validated.number, None).await?;
        self.ensure_category_exists(validated.category_id).await?;

        let mut file_path: Option<String> = None;
        let mut original_filename: Option<String> = None;
        if let Some(file) = &validated.file {
            let key = self.storage.generate_key(LETTER_STORAGE_PREFIX, "pdf");
            self.storage.store(&key, &file.data).await?;
            file_path = Some(key);
            original_filename = Some(file.original_filename.clone());
        }

        let letter = sqlx::query_as::<_, Letter>(
            r#"
            INSERT INTO letters
                (type, number, letter_date, subject, sender_recipient,
                 description, file_path, original_filename, category_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(validated.letter_type)
        .bind(&validated.number)
        .bind(validated.letter_date)
        .bind(&validated.subject)
        .bind(&validated.sender_recipient)
        .bind(&validated.description)
        .bind(&file_path)
        .bind(&original_filename)
        .bind(validated.category_id)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_number_conflict)?;

        info!("Letter created: id={}, number={}", letter.id, letter.number);

        Ok(self.fetch_with_relations(letter.id).await?.into())
    }

    /// Update a letter. A new attachment replaces the stored one: the old
    /// object is deleted from disk before the row is updated (this ordering
    /// is not transactional; a crash in between loses the old file but keeps
    /// the stale reference until the update lands).
    pub async fn update(&self, id: Uuid, form: LetterForm) -> Result<LetterResponseDto> {
        let existing = self.fetch(id).await?;

        let validated = form
            .validate()
            .map_err(|errors| AppError::Validation(errors.join("; ")))?;

        self.ensure_number_unique(&validated.number, Some(id)).await?;
        self.ensure_category_exists(validated.category_id).await?;

        let (file_path, original_filename) = match &validated.file {
            Some(file) => {
                if let Some(old_path) = &existing.file_path {
                    self.storage.delete(old_path).await?;
                }
                let key = self.storage.generate_key(LETTER_STORAGE_PREFIX, "pdf");
                self.storage.store(&key, &file.data).await?;
                (Some(key), Some(file.original_filename.clone()))
            }
            None => (existing.file_path, existing.original_filename),
        };

        sqlx::query(
            r#"
            UPDATE letters
            SET type = $2, number = $3, letter_date = $4, subject = $5,
                sender_recipient = $6, description = $7, file_path = $8,
                original_filename = $9, category_id = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(validated.letter_type)
        .bind(&validated.number)
        .bind(validated.letter_date)
        .bind(&validated.subject)
        .bind(&validated.sender_recipient)
        .bind(&validated.description)
        .bind(&file_path)
        .bind(&original_filename)
        .bind(validated.category_id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_number_conflict)?;

        info!("Letter updated: id={}", id);

        Ok(self.fetch_with_relations(id).await?.into())
    }

    /// Delete a letter, removing its stored attachment first
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let letter = self.fetch(id).await?;

        if let Some(file_path) = &letter.file_path {
            self.storage.delete(file_path).await?;
        }

        sqlx::query("DELETE FROM letters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete letter: {:?}", e);
                AppError::Database(e)
            })?;

        info!("Letter deleted: id={}, number={}", id, letter.number);

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Letter> {
        sqlx::query_as::<_, Letter>("SELECT * FROM letters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch letter: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Letter not found".to_string()))
    }

    async fn fetch_with_relations(&self, id: Uuid) -> Result<LetterWithRelations> {
        let mut qb = QueryBuilder::new(SELECT_WITH_RELATIONS);
        qb.push(" AND l.id = ").push_bind(id);

        qb.build_query_as::<LetterWithRelations>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch letter: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Letter not found".to_string()))
    }

    async fn ensure_number_unique(&self, number: &str, exclude: Option<Uuid>) -> Result<()> {
        let in_use: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM letters
                WHERE number = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(number)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check letter number: {:?}", e);
            AppError::Database(e)
        })?;

        if in_use {
            return Err(AppError::Validation(
                "Letter number is already in use".to_string(),
            ));
        }

        Ok(())
    }

    async fn ensure_category_exists(&self, category_id: Option<Uuid>) -> Result<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM letter_categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check category: {:?}", e);
                    AppError::Database(e)
                })?;

        if !exists {
            return Err(AppError::Validation(
                "Selected category is invalid".to_string(),
            ));
        }

        Ok(())
    }

    /// A concurrent insert can still hit the unique index between the
    /// pre-check and the write; report it as the same validation failure.
    fn map_number_conflict(e: sqlx::Error) -> AppError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Validation("Letter number is already in use".to_string());
            }
        }
        tracing::error!("Failed to write letter: {:?}", e);
        AppError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::letters::models::LetterType;
    use chrono::NaiveDate;

    fn sql_for(filter: &LetterFilter) -> String {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM letters l WHERE 1=1");
        apply_filters(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_adds_no_clauses() {
        assert_eq!(
            sql_for(&LetterFilter::default()),
            "SELECT COUNT(*) FROM letters l WHERE 1=1"
        );
    }

    #[test]
    fn test_type_filter_binds_one_parameter() {
        let filter = LetterFilter {
            letter_type: Some(LetterType::Incoming),
            ..Default::default()
        };
        assert!(sql_for(&filter).ends_with(" AND l.type = $1"));
    }

    #[test]
    fn test_search_ors_across_three_columns() {
        let filter = LetterFilter {
            search: Some("undangan".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("l.number ILIKE $1"));
        assert!(sql.contains("OR l.subject ILIKE $2"));
        assert!(sql.contains("OR l.sender_recipient ILIKE $3"));
    }

    #[test]
    fn test_combined_filters_and_together() {
        let filter = LetterFilter {
            letter_type: Some(LetterType::Outgoing),
            category_id: Some(Uuid::new_v4()),
            search: Some("rapat".to_string()),
            date_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2026, 6, 30),
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("AND l.type = $1"));
        assert!(sql.contains("AND l.category_id = $2"));
        assert!(sql.contains("AND (l.number ILIKE $3"));
        assert!(sql.contains("AND l.letter_date >= $6"));
        assert!(sql.contains("AND l.letter_date <= $7"));
    }

    #[test]
    fn test_date_bounds_are_inclusive_operators() {
        let filter = LetterFilter {
            date_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2026, 1, 31),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains(">= $1"));
        assert!(sql.contains("<= $2"));
    }
}
