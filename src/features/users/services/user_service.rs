use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::models::User;

/// Service for user queries
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users ordered by name.
    /// Returns the page rows and the total user count.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<UserResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name OFFSET $1 LIMIT $2")
                .bind(offset)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list users: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok((users.into_iter().map(|u| u.into()).collect(), total))
    }
}
