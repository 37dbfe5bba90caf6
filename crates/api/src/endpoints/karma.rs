//! Karma preview endpoint.

use axum::{routing::post, Json, Router};
use studycircle_common::{AppError, AppResult};
use studycircle_core::KarmaAction;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Karma preview request.
///
/// Names an action and its context; unknown action names are rejected
/// at this boundary, since the core action set is a closed enum.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KarmaPreviewRequest {
    pub action: String,
    #[serde(default)]
    pub with_attachment: bool,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub average: Option<f32>,
}

/// Karma preview response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KarmaPreviewResponse {
    pub action: String,
    pub delta: i32,
}

fn parse_action(req: &KarmaPreviewRequest) -> AppResult<KarmaAction> {
    match req.action.as_str() {
        "group_creation" => Ok(KarmaAction::GroupCreation),
        "group_join" => Ok(KarmaAction::GroupJoin),
        "message" => Ok(KarmaAction::Message {
            with_attachment: req.with_attachment,
        }),
        "meeting_creation" => Ok(KarmaAction::MeetingCreation),
        "join_approval" => Ok(KarmaAction::JoinApproval),
        "warning" => Ok(KarmaAction::Warning),
        "suspension" => {
            let days = req.days.ok_or_else(|| {
                AppError::BadRequest("Suspension preview requires days".to_string())
            })?;
            Ok(KarmaAction::Suspension { days })
        }
        "ban" => Ok(KarmaAction::Ban),
        "kick" => Ok(KarmaAction::Kick),
        "voluntary_leave" => Ok(KarmaAction::VoluntaryLeave),
        "rating" => {
            let average = req.average.ok_or_else(|| {
                AppError::BadRequest("Rating preview requires an average".to_string())
            })?;
            Ok(KarmaAction::Rating { average })
        }
        other => Err(AppError::BadRequest(format!("Unknown action: {other}"))),
    }
}

/// Preview the point value of an action without applying it.
async fn preview(
    AuthUser(_user): AuthUser,
    Json(req): Json<KarmaPreviewRequest>,
) -> AppResult<ApiResponse<KarmaPreviewResponse>> {
    let action = parse_action(&req)?;

    Ok(ApiResponse::ok(KarmaPreviewResponse {
        action: action.tag().to_string(),
        delta: action.delta(),
    }))
}

/// Create the karma router.
pub fn router() -> Router<AppState> {
    Router::new().route("/preview", post(preview))
}
