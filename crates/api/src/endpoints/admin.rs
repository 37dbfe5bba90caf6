//! Admin/Moderation endpoints.

use axum::{extract::State, routing::post, Json, Router};
use studycircle_common::{AppError, AppResult};
use studycircle_core::{
    score_state, AccountStanding, ModerationOutcome, ReportStatus, ResolveReportInput,
};
use studycircle_db::entities::{abuse_report, group, moderation_action, user};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Response Types ====================

/// Abuse report response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub reporter_id: String,
    pub target_user_id: String,
    pub group_id: Option<String>,
    pub comment: String,
    pub status: String,
    pub assignee_id: Option<String>,
    pub resolution_comment: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl From<abuse_report::Model> for ReportResponse {
    fn from(report: abuse_report::Model) -> Self {
        Self {
            id: report.id,
            reporter_id: report.reporter_id,
            target_user_id: report.target_user_id,
            group_id: report.group_id,
            comment: report.comment,
            status: match report.status {
                ReportStatus::Pending => "pending".to_string(),
                ReportStatus::Resolved => "resolved".to_string(),
                ReportStatus::Rejected => "rejected".to_string(),
            },
            assignee_id: report.assignee_id,
            resolution_comment: report.resolution_comment,
            created_at: report.created_at.to_rfc3339(),
            resolved_at: report.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Score state after a sanction or reversal.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationOutcomeResponse {
    pub user_id: String,
    pub karma_points: i32,
    pub warnings: i32,
    pub banned: bool,
    pub suspended_until: Option<String>,
    pub auto_banned: bool,
}

impl From<ModerationOutcome> for ModerationOutcomeResponse {
    fn from(outcome: ModerationOutcome) -> Self {
        Self {
            user_id: outcome.user_id,
            karma_points: outcome.karma_points,
            warnings: outcome.warnings,
            banned: outcome.banned,
            suspended_until: outcome.suspended_until.map(|t| t.to_rfc3339()),
            auto_banned: outcome.auto_banned,
        }
    }
}

/// Moderation view of a user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub karma_points: i32,
    pub warnings: i32,
    pub banned: bool,
    pub suspended_until: Option<String>,
    pub standing: String,
    pub is_admin: bool,
    pub is_moderator: bool,
    pub created_at: String,
}

impl From<user::Model> for AdminUserResponse {
    fn from(u: user::Model) -> Self {
        let standing = match score_state(&u).standing(chrono::Utc::now()) {
            AccountStanding::Active => "active",
            AccountStanding::Warned(_) => "warned",
            AccountStanding::Suspended(_) => "suspended",
            AccountStanding::Banned => "banned",
        };

        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            karma_points: u.karma_points,
            warnings: u.warnings,
            banned: u.is_banned,
            suspended_until: u.suspended_until.map(|t| t.to_rfc3339()),
            standing: standing.to_string(),
            is_admin: u.is_admin,
            is_moderator: u.is_moderator,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Audit log entry response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationActionResponse {
    pub id: String,
    pub user_id: String,
    pub moderator_id: String,
    pub action: String,
    pub reason: Option<String>,
    pub suspension_days: Option<i32>,
    pub karma_delta: i32,
    pub auto_ban: bool,
    pub created_at: String,
}

impl From<moderation_action::Model> for ModerationActionResponse {
    fn from(a: moderation_action::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            moderator_id: a.moderator_id,
            action: match a.action {
                moderation_action::ActionKind::Warn => "warn".to_string(),
                moderation_action::ActionKind::Suspend => "suspend".to_string(),
                moderation_action::ActionKind::Unsuspend => "unsuspend".to_string(),
                moderation_action::ActionKind::Ban => "ban".to_string(),
                moderation_action::ActionKind::Unban => "unban".to_string(),
            },
            reason: a.reason,
            suspension_days: a.suspension_days,
            karma_delta: a.karma_delta,
            auto_ban: a.auto_ban,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Admin group listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGroupResponse {
    pub id: String,
    pub leader_id: String,
    pub name: String,
    pub subject: Option<String>,
    pub is_archived: bool,
    pub members_count: i64,
    pub created_at: String,
}

impl From<group::Model> for AdminGroupResponse {
    fn from(g: group::Model) -> Self {
        Self {
            id: g.id,
            leader_id: g.leader_id,
            name: g.name,
            subject: g.subject,
            is_archived: g.is_archived,
            members_count: g.members_count,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}

/// Admin dashboard counters.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub pending_reports: u64,
    pub active_suspensions: u64,
    pub banned_users: u64,
    pub total_users: u64,
    pub total_groups: u64,
}

// ==================== Request Types ====================

/// Warn user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarnUserRequest {
    pub user_id: String,
    pub reason: String,
}

/// Suspend user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendUserRequest {
    pub user_id: String,
    /// Duration in days.
    pub days: u32,
    pub reason: String,
}

/// Ban user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanUserRequest {
    pub user_id: String,
    pub reason: String,
}

/// Request naming just a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: String,
}

/// List users request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    /// Restrict to banned accounts.
    #[serde(default)]
    pub banned: bool,
}

/// Get reports request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportsRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Resolve report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportRequest {
    pub report_id: String,
    pub resolution: String,
    pub comment: Option<String>,
}

/// Get report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportRequest {
    pub report_id: String,
}

/// Moderation log request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationLogRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// List groups request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Archive group request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveGroupRequest {
    pub group_id: String,
}

const fn default_limit() -> u64 {
    25
}

fn require_moderator(user: &user::Model) -> AppResult<()> {
    if user.is_admin || user.is_moderator {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Moderator privileges required".to_string(),
        ))
    }
}

fn parse_resolution(value: &str) -> AppResult<ReportStatus> {
    match value {
        "resolved" => Ok(ReportStatus::Resolved),
        "rejected" => Ok(ReportStatus::Rejected),
        other => Err(AppError::BadRequest(format!(
            "Unknown resolution: {other}"
        ))),
    }
}

// ==================== Handlers ====================

/// Warn a user; the third warning auto-bans.
async fn warn_user(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<WarnUserRequest>,
) -> AppResult<ApiResponse<ModerationOutcomeResponse>> {
    let outcome = state
        .moderation_service
        .warn_user(&moderator.id, &req.user_id, &req.reason)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Suspend a user for a number of days.
async fn suspend_user(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SuspendUserRequest>,
) -> AppResult<ApiResponse<ModerationOutcomeResponse>> {
    let outcome = state
        .moderation_service
        .suspend_user(&moderator.id, &req.user_id, req.days, &req.reason)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Lift a suspension early.
async fn unsuspend_user(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<ModerationOutcomeResponse>> {
    let outcome = state
        .moderation_service
        .unsuspend_user(&moderator.id, &req.user_id)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Ban a user.
async fn ban_user(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BanUserRequest>,
) -> AppResult<ApiResponse<ModerationOutcomeResponse>> {
    let outcome = state
        .moderation_service
        .ban_user(&moderator.id, &req.user_id, &req.reason)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Lift a ban.
async fn unban_user(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<ModerationOutcomeResponse>> {
    let outcome = state
        .moderation_service
        .unban_user(&moderator.id, &req.user_id)
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Moderation view of a single user.
async fn show_user(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<AdminUserResponse>> {
    require_moderator(&moderator)?;

    let user = state.user_service.get_by_id(&req.user_id).await?;

    Ok(ApiResponse::ok(user.into()))
}

/// List users for the admin panel.
async fn list_users(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> AppResult<ApiResponse<Vec<AdminUserResponse>>> {
    require_moderator(&moderator)?;

    let limit = req.limit.min(100);
    let users = if req.banned {
        state.user_service.list_banned(limit, req.offset).await?
    } else {
        state.user_service.list(limit, req.offset).await?
    };

    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// List abuse reports.
async fn list_reports(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<GetReportsRequest>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    require_moderator(&moderator)?;

    let status = match req.status.as_deref() {
        None => None,
        Some("pending") => Some(ReportStatus::Pending),
        Some(other) => Some(parse_resolution(other)?),
    };

    let limit = req.limit.min(100);
    let reports = state
        .moderation_service
        .get_reports(status, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(
        reports.into_iter().map(Into::into).collect(),
    ))
}

/// Show a single abuse report.
async fn show_report(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<GetReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    require_moderator(&moderator)?;

    let report = state.moderation_service.get_report(&req.report_id).await?;

    Ok(ApiResponse::ok(report.into()))
}

/// Resolve or reject an abuse report.
async fn resolve_report(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ResolveReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let resolution = parse_resolution(&req.resolution)?;

    let report = state
        .moderation_service
        .resolve_report(
            &moderator.id,
            ResolveReportInput {
                report_id: req.report_id,
                resolution,
                comment: req.comment,
            },
        )
        .await?;

    Ok(ApiResponse::ok(report.into()))
}

/// Moderation history for a user.
async fn moderation_log(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ModerationLogRequest>,
) -> AppResult<ApiResponse<Vec<ModerationActionResponse>>> {
    require_moderator(&moderator)?;

    let limit = req.limit.min(100);
    let actions = state
        .moderation_service
        .moderation_log(&req.user_id, limit)
        .await?;

    Ok(ApiResponse::ok(
        actions.into_iter().map(Into::into).collect(),
    ))
}

/// List groups for the admin panel.
async fn list_groups(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListGroupsRequest>,
) -> AppResult<ApiResponse<Vec<AdminGroupResponse>>> {
    require_moderator(&moderator)?;

    let limit = req.limit.min(100);
    let groups = state.group_service.list(limit, req.offset).await?;

    Ok(ApiResponse::ok(
        groups.into_iter().map(Into::into).collect(),
    ))
}

/// Archive a group.
async fn archive_group(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ArchiveGroupRequest>,
) -> AppResult<ApiResponse<AdminGroupResponse>> {
    let group = state
        .group_service
        .archive(&req.group_id, &moderator.id)
        .await?;

    Ok(ApiResponse::ok(group.into()))
}

/// Admin dashboard counters.
async fn stats(
    AuthUser(moderator): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminStatsResponse>> {
    require_moderator(&moderator)?;

    let stats = state.moderation_service.stats().await?;
    let total_groups = state.group_service.count().await?;

    Ok(ApiResponse::ok(AdminStatsResponse {
        pending_reports: stats.pending_reports,
        active_suspensions: stats.active_suspensions,
        banned_users: stats.banned_users,
        total_users: stats.total_users,
        total_groups,
    }))
}

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/warn", post(warn_user))
        .route("/users/suspend", post(suspend_user))
        .route("/users/unsuspend", post(unsuspend_user))
        .route("/users/ban", post(ban_user))
        .route("/users/unban", post(unban_user))
        .route("/users/show", post(show_user))
        .route("/users/list", post(list_users))
        .route("/reports/list", post(list_reports))
        .route("/reports/show", post(show_report))
        .route("/reports/resolve", post(resolve_report))
        .route("/moderation-log", post(moderation_log))
        .route("/groups/list", post(list_groups))
        .route("/groups/archive", post(archive_group))
        .route("/stats", post(stats))
}
