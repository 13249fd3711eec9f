use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::DashboardResponseDto;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Get the dashboard: headline counts, recent letters, 12 trailing months of
/// incoming/outgoing volumes, and top categories.
///
/// User totals appear for admins only; category rankings for admin and staff.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = ApiResponse<DashboardResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    user: AuthenticatedUser,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardResponseDto>>> {
    let dashboard = service.get_dashboard(&user).await?;
    Ok(Json(ApiResponse::success(Some(dashboard), None, None)))
}
