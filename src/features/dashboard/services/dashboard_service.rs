use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::{
    CategoryStatDto, DashboardResponseDto, DashboardStatsDto, MonthlyStatDto,
};
use crate::features::letters::models::{LetterType, LetterWithRelations};

/// Number of trailing months covered by the monthly chart
const TRAILING_MONTHS: u32 = 12;

#[derive(Debug, FromRow)]
struct LetterCounts {
    total: i64,
    incoming: i64,
    outgoing: i64,
}

#[derive(Debug, FromRow)]
struct MonthlyCountRow {
    month: NaiveDate,
    #[sqlx(rename = "type")]
    letter_type: LetterType,
    count: i64,
}

#[derive(Debug, FromRow)]
struct CategoryCountRow {
    id: uuid::Uuid,
    name: String,
    letters_count: i64,
}

/// The (year, month) that is `back` months before `(year, month)`
fn months_back(year: i32, month: u32, back: u32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 - back as i32;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}

/// Expand grouped per-month counts into 12 trailing buckets ending at
/// `(year, month)`, oldest first, with zeros for empty months.
fn fill_monthly_buckets(
    year: i32,
    month: u32,
    rows: &[(NaiveDate, LetterType, i64)],
) -> Vec<MonthlyStatDto> {
    (0..TRAILING_MONTHS)
        .rev()
        .map(|back| {
            let (y, m) = months_back(year, month, back);
            let bucket = NaiveDate::from_ymd_opt(y, m, 1).expect("first of month is valid");

            let mut incoming = 0;
            let mut outgoing = 0;
            for (row_month, letter_type, count) in rows {
                if *row_month == bucket {
                    match letter_type {
                        LetterType::Incoming => incoming += count,
                        LetterType::Outgoing => outgoing += count,
                    }
                }
            }

            MonthlyStatDto {
                month: bucket.format("%b %Y").to_string(),
                incoming,
                outgoing,
            }
        })
        .collect()
}

/// Service for dashboard statistics
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assemble the dashboard for the given actor. User totals are admin
    /// only; category rankings are admin/staff only.
    pub async fn get_dashboard(&self, actor: &AuthenticatedUser) -> Result<DashboardResponseDto> {
        let counts = self.letter_counts().await?;

        let total_users = if actor.is_admin() {
            Some(self.user_count().await?)
        } else {
            None
        };

        let recent_letters = self.recent_letters().await?;

        let now = Utc::now().date_naive();
        let monthly_rows = self.monthly_counts(now.year(), now.month()).await?;
        let rows: Vec<(NaiveDate, LetterType, i64)> = monthly_rows
            .into_iter()
            .map(|r| (r.month, r.letter_type, r.count))
            .collect();
        let monthly_stats = fill_monthly_buckets(now.year(), now.month(), &rows);

        let category_stats = if actor.is_admin() || actor.is_staff() {
            Some(self.top_categories().await?)
        } else {
            None
        };

        Ok(DashboardResponseDto {
            stats: DashboardStatsDto {
                total_letters: counts.total,
                incoming_letters: counts.incoming,
                outgoing_letters: counts.outgoing,
                total_users,
            },
            recent_letters: recent_letters.into_iter().map(|l| l.into()).collect(),
            monthly_stats,
            category_stats,
        })
    }

    async fn letter_counts(&self) -> Result<LetterCounts> {
        sqlx::query_as::<_, LetterCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE type = 'incoming') AS incoming,
                COUNT(*) FILTER (WHERE type = 'outgoing') AS outgoing
            FROM letters
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get letter counts: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn user_count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn recent_letters(&self) -> Result<Vec<LetterWithRelations>> {
        sqlx::query_as::<_, LetterWithRelations>(
            r#"
            SELECT
                l.id, l.type, l.number, l.letter_date, l.subject, l.sender_recipient,
                l.description, l.file_path, l.original_filename,
                l.category_id, c.name AS category_name,
                l.created_by, u.name AS creator_name,
                l.created_at, l.updated_at
            FROM letters l
            LEFT JOIN letter_categories c ON c.id = l.category_id
            JOIN users u ON u.id = l.created_by
            ORDER BY l.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch recent letters: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Per-month incoming/outgoing counts for the 12 months ending at
    /// `(year, month)`, grouped by the month of letter_date.
    async fn monthly_counts(&self, year: i32, month: u32) -> Result<Vec<MonthlyCountRow>> {
        let (from_year, from_month) = months_back(year, month, TRAILING_MONTHS - 1);
        let from = NaiveDate::from_ymd_opt(from_year, from_month, 1)
            .ok_or_else(|| AppError::Internal("Invalid month window".to_string()))?;
        let (to_year, to_month) = months_back(year, month, 0);
        let to_exclusive = NaiveDate::from_ymd_opt(
            if to_month == 12 { to_year + 1 } else { to_year },
            if to_month == 12 { 1 } else { to_month + 1 },
            1,
        )
        .ok_or_else(|| AppError::Internal("Invalid month window".to_string()))?;

        sqlx::query_as::<_, MonthlyCountRow>(
            r#"
            SELECT
                date_trunc('month', letter_date)::date AS month,
                type,
                COUNT(*) AS count
            FROM letters
            WHERE letter_date >= $1 AND letter_date < $2
            GROUP BY 1, 2
            "#,
        )
        .bind(from)
        .bind(to_exclusive)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get monthly stats: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn top_categories(&self) -> Result<Vec<CategoryStatDto>> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            r#"
            SELECT c.id, c.name, COUNT(l.id) AS letters_count
            FROM letter_categories c
            LEFT JOIN letters l ON l.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY letters_count DESC, c.name
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category stats: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryStatDto {
                id: r.id,
                name: r.name,
                letters_count: r.letters_count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_back_within_year() {
        assert_eq!(months_back(2026, 8, 3), (2026, 5));
        assert_eq!(months_back(2026, 8, 0), (2026, 8));
    }

    #[test]
    fn test_months_back_crosses_year_boundary() {
        assert_eq!(months_back(2026, 3, 5), (2025, 10));
        assert_eq!(months_back(2026, 1, 1), (2025, 12));
        assert_eq!(months_back(2026, 12, 24), (2024, 12));
    }

    #[test]
    fn test_buckets_cover_twelve_months_oldest_first() {
        let stats = fill_monthly_buckets(2026, 8, &[]);
        assert_eq!(stats.len(), 12);
        assert_eq!(stats[0].month, "Sep 2025");
        assert_eq!(stats[11].month, "Aug 2026");
        assert!(stats.iter().all(|s| s.incoming == 0 && s.outgoing == 0));
    }

    #[test]
    fn test_rows_land_in_their_buckets() {
        let rows = vec![
            (ymd(2026, 8, 1), LetterType::Incoming, 4),
            (ymd(2026, 8, 1), LetterType::Outgoing, 2),
            (ymd(2025, 9, 1), LetterType::Incoming, 1),
        ];
        let stats = fill_monthly_buckets(2026, 8, &rows);

        assert_eq!(
            stats[11],
            MonthlyStatDto {
                month: "Aug 2026".to_string(),
                incoming: 4,
                outgoing: 2,
            }
        );
        assert_eq!(stats[0].incoming, 1);
        assert_eq!(stats[0].outgoing, 0);
    }

    #[test]
    fn test_bucket_sums_match_totals() {
        // incoming+outgoing per bucket must equal the letters in that month
        let rows = vec![
            (ymd(2026, 2, 1), LetterType::Incoming, 3),
            (ymd(2026, 2, 1), LetterType::Outgoing, 5),
        ];
        let stats = fill_monthly_buckets(2026, 8, &rows);
        let feb = stats.iter().find(|s| s.month == "Feb 2026").unwrap();
        assert_eq!(feb.incoming + feb.outgoing, 8);
    }
}
