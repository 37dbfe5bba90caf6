//! API endpoints.

mod admin;
mod karma;
mod ratings;
mod reports;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .nest("/reports", reports::router())
        .nest("/ratings", ratings::router())
        .nest("/karma", karma::router())
}
