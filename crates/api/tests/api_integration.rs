//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    Router,
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use studycircle_api::{middleware::AppState, router as api_router};
use studycircle_core::{
    GroupService, KarmaService, ModerationService, RatingService, UserService,
};
use studycircle_db::entities::user;
use studycircle_db::repositories::{
    GroupRepository, ModerationRepository, RatingRepository, UserRepository,
};
use tower::ServiceExt;

fn moderator_user() -> user::Model {
    user::Model {
        id: "mod1".to_string(),
        username: "mod".to_string(),
        username_lower: "mod".to_string(),
        token: Some("mod-token".to_string()),
        name: None,
        study_field: None,
        karma_points: 0,
        warnings: 0,
        is_banned: false,
        suspended_until: None,
        is_admin: false,
        is_moderator: true,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

/// Create test app state around a prepared mock connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let rating_repo = RatingRepository::new(Arc::clone(&db));
    let moderation_repo = ModerationRepository::new(Arc::clone(&db));

    let karma_service = KarmaService::new(user_repo.clone());
    let user_service = UserService::new(user_repo.clone());
    let group_service = GroupService::new(
        group_repo.clone(),
        user_repo.clone(),
        karma_service.clone(),
    );
    let rating_service = RatingService::new(rating_repo, group_repo, karma_service);
    let moderation_service = ModerationService::new(moderation_repo, user_repo);

    AppState {
        user_service,
        group_service,
        moderation_service,
        rating_service,
    }
}

/// Router with the auth middleware layered, as the server builds it.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            studycircle_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_karma_preview_requires_auth() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/karma/preview")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"action":"group_creation"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_karma_preview_returns_delta() {
    // The bearer token resolves to a user; preview itself hits no tables.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[moderator_user()]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/karma/preview")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer mod-token")
                .body(Body::from(r#"{"action":"suspension","days":31}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["delta"], -40);
}

#[tokio::test]
async fn test_karma_preview_rejects_unknown_action() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[moderator_user()]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/karma/preview")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer mod-token")
                .body(Body::from(r#"{"action":"emote"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_stats_refuses_regular_user() {
    let regular = user::Model {
        id: "user1".to_string(),
        username: "plain".to_string(),
        username_lower: "plain".to_string(),
        token: Some("user-token".to_string()),
        is_moderator: false,
        ..moderator_user()
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[regular]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/stats")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer user-token")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
