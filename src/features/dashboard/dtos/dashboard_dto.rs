use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::letters::dtos::LetterResponseDto;

/// Headline letter counts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsDto {
    pub total_letters: i64,
    pub incoming_letters: i64,
    pub outgoing_letters: i64,
    /// Only populated for admins
    pub total_users: Option<i64>,
}

/// Incoming/outgoing counts for one month of the trailing year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyStatDto {
    /// Month label, e.g. "Aug 2026"
    pub month: String,
    pub incoming: i64,
    pub outgoing: i64,
}

/// A category ranked by how many letters it holds
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryStatDto {
    pub id: Uuid,
    pub name: String,
    pub letters_count: i64,
}

/// Full dashboard payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponseDto {
    pub stats: DashboardStatsDto,
    /// 5 most recently recorded letters
    pub recent_letters: Vec<LetterResponseDto>,
    /// 12 trailing months, oldest first
    pub monthly_stats: Vec<MonthlyStatDto>,
    /// Top-5 categories by letter count; admin and staff only
    pub category_stats: Option<Vec<CategoryStatDto>>,
}
