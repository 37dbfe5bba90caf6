//! Abuse report endpoints for regular users.

use axum::{extract::State, routing::post, Json, Router};
use studycircle_common::AppResult;
use studycircle_core::CreateReportInput;
use serde::Deserialize;

use crate::endpoints::admin::ReportResponse;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub user_id: String,
    pub group_id: Option<String>,
    pub comment: String,
}

/// My reports request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyReportsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    25
}

/// Report another user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .moderation_service
        .create_report(
            &user.id,
            CreateReportInput {
                target_user_id: req.user_id,
                group_id: req.group_id,
                comment: req.comment,
            },
        )
        .await?;

    Ok(ApiResponse::ok(report.into()))
}

/// List reports the caller has submitted.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MyReportsRequest>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let limit = req.limit.min(100);
    let reports = state
        .moderation_service
        .get_reports_by_reporter(&user.id, limit)
        .await?;

    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Create the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/mine", post(mine))
}
