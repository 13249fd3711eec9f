use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::letters::handlers;
use crate::features::letters::services::LetterService;

/// Create routes for the letters feature.
///
/// All routes sit behind the auth middleware; mutations are additionally
/// gated to admin/staff by the `RequireLetterWrite` guard in the handlers.
pub fn routes(service: Arc<LetterService>) -> Router {
    Router::new()
        .route(
            "/api/letters",
            get(handlers::list_letters).post(handlers::create_letter),
        )
        .route(
            "/api/letters/{id}",
            get(handlers::get_letter)
                .put(handlers::update_letter)
                .delete(handlers::delete_letter),
        )
        .with_state(service)
}
