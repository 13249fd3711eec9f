use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::letters::{
    dtos as letters_dtos, handlers as letters_handlers, models as letters_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Letters
        letters_handlers::list_letters,
        letters_handlers::get_letter,
        letters_handlers::create_letter,
        letters_handlers::update_letter,
        letters_handlers::delete_letter,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Dashboard
        dashboard_handlers::get_dashboard,
        // Users
        users_handlers::list_users,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::model::Role,
            // Letters
            letters_models::LetterType,
            letters_dtos::LetterFilter,
            letters_dtos::CategoryRefDto,
            letters_dtos::CreatorRefDto,
            letters_dtos::LetterResponseDto,
            letters_dtos::LetterListResponseDto,
            letters_dtos::LetterMultipartDto,
            ApiResponse<letters_dtos::LetterResponseDto>,
            ApiResponse<letters_dtos::LetterListResponseDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::ActiveCategoryDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::ActiveCategoryDto>>,
            // Dashboard
            dashboard_dtos::DashboardStatsDto,
            dashboard_dtos::MonthlyStatDto,
            dashboard_dtos::CategoryStatDto,
            dashboard_dtos::DashboardResponseDto,
            ApiResponse<dashboard_dtos::DashboardResponseDto>,
            // Users
            users_dtos::UserResponseDto,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
        )
    ),
    tags(
        (name = "letters", description = "Letter records and PDF attachments"),
        (name = "categories", description = "Letter categories (management is admin only)"),
        (name = "dashboard", description = "Archive statistics for the dashboard"),
        (name = "users", description = "User listing (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Arsip Surat API",
        version = "0.1.0",
        description = "API documentation for Arsip Surat",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
