//! Group rating endpoints.

use axum::{extract::State, routing::post, Json, Router};
use studycircle_common::AppResult;
use studycircle_core::RateGroupInput;
use studycircle_db::entities::rating;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Rating response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: String,
    pub group_id: String,
    pub rater_id: String,
    pub group_score: i16,
    pub leader_score: i16,
    /// Component average rounded to one decimal for display.
    pub average: f32,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<rating::Model> for RatingResponse {
    fn from(r: rating::Model) -> Self {
        let average = (r.average() * 10.0).round() / 10.0;
        Self {
            id: r.id,
            group_id: r.group_id,
            rater_id: r.rater_id,
            group_score: r.group_score,
            leader_score: r.leader_score,
            average,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Group ratings request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRatingsRequest {
    pub group_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Group ratings response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRatingsResponse {
    pub total: u64,
    pub ratings: Vec<RatingResponse>,
}

const fn default_limit() -> u64 {
    25
}

/// Rate a group and its leader.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RateGroupInput>,
) -> AppResult<ApiResponse<RatingResponse>> {
    let rating = state.rating_service.rate_group(&user.id, input).await?;

    Ok(ApiResponse::ok(rating.into()))
}

/// List ratings for a group.
async fn group(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<GroupRatingsRequest>,
) -> AppResult<ApiResponse<GroupRatingsResponse>> {
    let limit = req.limit.min(100);
    let total = state.rating_service.count(&req.group_id).await?;
    let ratings = state
        .rating_service
        .ratings(&req.group_id, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(GroupRatingsResponse {
        total,
        ratings: ratings.into_iter().map(Into::into).collect(),
    }))
}

/// Create the ratings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/group", post(group))
}
