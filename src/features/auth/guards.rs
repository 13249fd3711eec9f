//! Role-based authorization guards.
//!
//! These guards extract the authenticated user from request extensions and
//! check the role policy before the handler body runs. The auth middleware
//! must have placed the user there; a missing user means the route was not
//! mounted behind it.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::Action;

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only routes (category and user administration).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.can(Action::ManageCategories) {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user))
    }
}

/// Guard for letter mutations (create/edit/delete).
///
/// Allows admin and staff; leaders are read-only.
pub struct RequireLetterWrite(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireLetterWrite
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.can(Action::WriteLetters) {
            return Err(AppError::Forbidden(
                "Letter management requires admin or staff access".to_string(),
            ));
        }

        Ok(RequireLetterWrite(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::with_auth_as;
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    async fn admin_handler(RequireAdmin(_user): RequireAdmin) -> StatusCode {
        StatusCode::OK
    }

    async fn write_handler(RequireLetterWrite(_user): RequireLetterWrite) -> StatusCode {
        StatusCode::OK
    }

    fn router() -> Router {
        Router::new()
            .route("/admin", get(admin_handler))
            .route("/write", get(write_handler))
    }

    #[tokio::test]
    async fn test_admin_guard_allows_admin() {
        let server = TestServer::new(with_auth_as(router(), Role::Admin)).unwrap();
        server.get("/admin").await.assert_status_ok();
        server.get("/write").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_staff_can_write_but_not_administer() {
        let server = TestServer::new(with_auth_as(router(), Role::Staff)).unwrap();
        server.get("/write").await.assert_status_ok();
        server
            .get("/admin")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_leader_is_read_only() {
        let server = TestServer::new(with_auth_as(router(), Role::Leader)).unwrap();
        server
            .get("/write")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/admin")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unauthenticated_is_rejected() {
        let server = TestServer::new(router()).unwrap();
        server
            .get("/write")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
