#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, Role};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
pub fn test_user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        name: format!("Test {}", role),
        role,
    }
}

/// Wrap a router with a middleware that injects an authenticated user of the
/// given role, standing in for the JWT auth middleware in tests.
#[cfg(test)]
pub fn with_auth_as(router: Router, role: Role) -> Router {
    async fn inject(mut request: Request, next: Next) -> Response {
        let role = *request
            .extensions()
            .get::<Role>()
            .expect("role extension set by layer below");
        request.extensions_mut().insert(test_user(role));
        next.run(request).await
    }

    router
        .layer(axum::middleware::from_fn(inject))
        .layer(axum::Extension(role))
}
