//! Moderation service for abuse reports and user sanctions.

use chrono::{DateTime, Utc};
use sea_orm::Set;
use studycircle_common::{AppError, AppResult, IdGenerator};
use studycircle_db::{
    entities::{abuse_report, moderation_action, moderation_action::ActionKind, user},
    repositories::{ModerationRepository, ScoreUpdate, UserRepository},
};

use super::escalation::{self, ScoreState};

pub use studycircle_db::entities::abuse_report::ReportStatus;

/// Input for creating an abuse report.
pub struct CreateReportInput {
    pub target_user_id: String,
    pub group_id: Option<String>,
    pub comment: String,
}

/// Input for resolving an abuse report.
pub struct ResolveReportInput {
    pub report_id: String,
    pub resolution: ReportStatus,
    pub comment: Option<String>,
}

/// Result of a sanction or reversal, echoing the persisted score state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationOutcome {
    pub user_id: String,
    pub karma_points: i32,
    pub warnings: i32,
    pub banned: bool,
    pub suspended_until: Option<DateTime<Utc>>,
    /// Set when a warning escalated into an automatic ban, so the
    /// caller can dispatch the ban notification instead.
    pub auto_banned: bool,
}

/// Platform-wide moderation counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationStats {
    pub pending_reports: u64,
    pub active_suspensions: u64,
    pub banned_users: u64,
    pub total_users: u64,
}

/// Moderation service for handling reports and sanctions.
#[derive(Clone)]
pub struct ModerationService {
    moderation_repo: ModerationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(moderation_repo: ModerationRepository, user_repo: UserRepository) -> Self {
        Self {
            moderation_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Abuse Reports ==========

    /// Create a new abuse report.
    pub async fn create_report(
        &self,
        reporter_id: &str,
        input: CreateReportInput,
    ) -> AppResult<abuse_report::Model> {
        // Validate comment
        let comment = input.comment.trim();
        if comment.is_empty() {
            return Err(AppError::BadRequest(
                "Report comment is required".to_string(),
            ));
        }
        if comment.len() > 2000 {
            return Err(AppError::BadRequest("Report comment too long".to_string()));
        }

        // Can't report yourself
        if reporter_id == input.target_user_id {
            return Err(AppError::BadRequest("Cannot report yourself".to_string()));
        }

        // Check target user exists
        self.user_repo.get_by_id(&input.target_user_id).await?;

        let id = self.id_gen.generate();
        let model = abuse_report::ActiveModel {
            id: Set(id),
            reporter_id: Set(reporter_id.to_string()),
            target_user_id: Set(input.target_user_id),
            group_id: Set(input.group_id),
            comment: Set(comment.to_string()),
            status: Set(ReportStatus::Pending),
            assignee_id: Set(None),
            resolution_comment: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            resolved_at: Set(None),
        };

        self.moderation_repo.create_report(model).await
    }

    /// Get an abuse report by ID.
    pub async fn get_report(&self, id: &str) -> AppResult<abuse_report::Model> {
        self.moderation_repo.get_report(id).await
    }

    /// Get abuse reports, optionally filtered by status.
    pub async fn get_reports(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<abuse_report::Model>> {
        self.moderation_repo
            .get_reports(status, limit, offset)
            .await
    }

    /// Resolve an abuse report.
    pub async fn resolve_report(
        &self,
        moderator_id: &str,
        input: ResolveReportInput,
    ) -> AppResult<abuse_report::Model> {
        self.require_moderator(moderator_id).await?;

        // Can't set back to pending
        if input.resolution == ReportStatus::Pending {
            return Err(AppError::BadRequest(
                "Cannot set report back to pending".to_string(),
            ));
        }

        let report = self.moderation_repo.get_report(&input.report_id).await?;

        // Check if already resolved
        if report.status != ReportStatus::Pending {
            return Err(AppError::BadRequest("Report already resolved".to_string()));
        }

        let mut model: abuse_report::ActiveModel = report.into();
        model.status = Set(input.resolution);
        model.assignee_id = Set(Some(moderator_id.to_string()));
        model.resolution_comment = Set(input.comment);
        model.resolved_at = Set(Some(chrono::Utc::now().into()));

        self.moderation_repo.update_report(model).await
    }

    /// Count pending reports.
    pub async fn count_pending_reports(&self) -> AppResult<u64> {
        self.moderation_repo.count_pending_reports().await
    }

    /// Get reports submitted by a user.
    pub async fn get_reports_by_reporter(
        &self,
        reporter_id: &str,
        limit: u64,
    ) -> AppResult<Vec<abuse_report::Model>> {
        self.moderation_repo
            .get_reports_by_reporter(reporter_id, limit)
            .await
    }

    /// Get reports filed against a user.
    pub async fn get_reports_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<abuse_report::Model>> {
        self.moderation_repo
            .get_reports_for_user(user_id, limit)
            .await
    }

    // ========== Sanctions ==========

    /// Warn a user.
    ///
    /// The warning that reaches the auto-ban threshold bans instead; the
    /// returned outcome says which happened so the caller can pick the
    /// right notification.
    pub async fn warn_user(
        &self,
        moderator_id: &str,
        user_id: &str,
        reason: &str,
    ) -> AppResult<ModerationOutcome> {
        let target = self.sanction_target(moderator_id, user_id).await?;

        let outcome = escalation::warn(&score_state(&target));
        self.persist_score(user_id, outcome.state).await?;

        self.record_action(
            user_id,
            moderator_id,
            ActionKind::Warn,
            Some(reason),
            None,
            outcome.karma_delta,
            outcome.auto_banned,
        )
        .await?;

        tracing::info!(
            user_id = user_id,
            moderator_id = moderator_id,
            warnings = outcome.state.warnings,
            auto_banned = outcome.auto_banned,
            "Warned user"
        );

        Ok(to_outcome(user_id, outcome.state, outcome.auto_banned))
    }

    /// Suspend a user for `days` days.
    ///
    /// A suspension of an already-suspended user overwrites the deadline
    /// and deducts again.
    pub async fn suspend_user(
        &self,
        moderator_id: &str,
        user_id: &str,
        days: u32,
        reason: &str,
    ) -> AppResult<ModerationOutcome> {
        if days == 0 {
            return Err(AppError::BadRequest(
                "Suspension must be at least one day".to_string(),
            ));
        }

        let target = self.sanction_target(moderator_id, user_id).await?;

        let outcome = escalation::suspend(&score_state(&target), days, Utc::now());
        self.persist_score(user_id, outcome.state).await?;

        self.record_action(
            user_id,
            moderator_id,
            ActionKind::Suspend,
            Some(reason),
            Some(days),
            outcome.karma_delta,
            false,
        )
        .await?;

        tracing::info!(
            user_id = user_id,
            moderator_id = moderator_id,
            days = days,
            "Suspended user"
        );

        Ok(to_outcome(user_id, outcome.state, false))
    }

    /// Ban a user, independent of the warning count.
    pub async fn ban_user(
        &self,
        moderator_id: &str,
        user_id: &str,
        reason: &str,
    ) -> AppResult<ModerationOutcome> {
        let target = self.sanction_target(moderator_id, user_id).await?;

        let outcome = escalation::ban(&score_state(&target));
        self.persist_score(user_id, outcome.state).await?;

        self.record_action(
            user_id,
            moderator_id,
            ActionKind::Ban,
            Some(reason),
            None,
            outcome.karma_delta,
            false,
        )
        .await?;

        tracing::info!(user_id = user_id, moderator_id = moderator_id, "Banned user");

        Ok(to_outcome(user_id, outcome.state, false))
    }

    /// Lift a ban, resetting warnings and clearing any suspension.
    /// Also clears sanction state for never-banned users.
    pub async fn unban_user(
        &self,
        moderator_id: &str,
        user_id: &str,
    ) -> AppResult<ModerationOutcome> {
        self.require_moderator(moderator_id).await?;
        let target = self.user_repo.get_by_id(user_id).await?;

        let state = escalation::unban(&score_state(&target));
        self.persist_score(user_id, state).await?;

        self.record_action(user_id, moderator_id, ActionKind::Unban, None, None, 0, false)
            .await?;

        tracing::info!(user_id = user_id, moderator_id = moderator_id, "Unbanned user");

        Ok(to_outcome(user_id, state, false))
    }

    /// Lift a suspension early. Warnings and karma are untouched.
    pub async fn unsuspend_user(
        &self,
        moderator_id: &str,
        user_id: &str,
    ) -> AppResult<ModerationOutcome> {
        self.require_moderator(moderator_id).await?;
        let target = self.user_repo.get_by_id(user_id).await?;

        if target.suspended_until.is_none() {
            return Err(AppError::NotFound("User is not suspended".to_string()));
        }

        let state = escalation::unsuspend(&score_state(&target));
        self.persist_score(user_id, state).await?;

        self.record_action(
            user_id,
            moderator_id,
            ActionKind::Unsuspend,
            None,
            None,
            0,
            false,
        )
        .await?;

        tracing::info!(
            user_id = user_id,
            moderator_id = moderator_id,
            "Unsuspended user"
        );

        Ok(to_outcome(user_id, state, false))
    }

    /// Moderation history for a user, newest first.
    pub async fn moderation_log(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<moderation_action::Model>> {
        self.moderation_repo
            .get_actions_for_user(user_id, limit)
            .await
    }

    /// Platform-wide moderation counters.
    pub async fn stats(&self) -> AppResult<ModerationStats> {
        Ok(ModerationStats {
            pending_reports: self.moderation_repo.count_pending_reports().await?,
            active_suspensions: self.user_repo.count_suspended().await?,
            banned_users: self.user_repo.count_banned().await?,
            total_users: self.user_repo.count().await?,
        })
    }

    // ========== Helpers ==========

    /// Load a moderator, verifying moderation rights.
    async fn require_moderator(&self, moderator_id: &str) -> AppResult<user::Model> {
        let moderator = self.user_repo.get_by_id(moderator_id).await?;
        if !moderator.is_admin && !moderator.is_moderator {
            return Err(AppError::Forbidden(
                "Only moderators can perform this action".to_string(),
            ));
        }
        Ok(moderator)
    }

    /// Load and validate the target of a punitive action.
    async fn sanction_target(
        &self,
        moderator_id: &str,
        user_id: &str,
    ) -> AppResult<user::Model> {
        self.require_moderator(moderator_id).await?;

        if moderator_id == user_id {
            return Err(AppError::BadRequest("Cannot sanction yourself".to_string()));
        }

        let target = self.user_repo.get_by_id(user_id).await?;

        if target.is_admin {
            return Err(AppError::Forbidden("Cannot sanction an admin".to_string()));
        }

        Ok(target)
    }

    async fn persist_score(&self, user_id: &str, state: ScoreState) -> AppResult<()> {
        self.user_repo
            .update_score(
                user_id,
                ScoreUpdate {
                    karma_points: state.karma_points,
                    warnings: state.warnings,
                    is_banned: state.banned,
                    suspended_until: state.suspended_until.map(Into::into),
                },
            )
            .await
    }

    async fn record_action(
        &self,
        user_id: &str,
        moderator_id: &str,
        action: ActionKind,
        reason: Option<&str>,
        suspension_days: Option<u32>,
        karma_delta: i32,
        auto_ban: bool,
    ) -> AppResult<moderation_action::Model> {
        let model = moderation_action::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            moderator_id: Set(moderator_id.to_string()),
            action: Set(action),
            reason: Set(reason.map(str::to_string)),
            suspension_days: Set(suspension_days.map(|d| i32::try_from(d).unwrap_or(i32::MAX))),
            karma_delta: Set(karma_delta),
            auto_ban: Set(auto_ban),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.moderation_repo.record_action(model).await
    }
}

/// Project the score fields of a user row into the pure state the
/// escalation rules operate on.
#[must_use]
pub fn score_state(user: &user::Model) -> ScoreState {
    ScoreState {
        karma_points: user.karma_points,
        warnings: user.warnings,
        banned: user.is_banned,
        suspended_until: user.suspended_until.map(Into::into),
    }
}

fn to_outcome(user_id: &str, state: ScoreState, auto_banned: bool) -> ModerationOutcome {
    ModerationOutcome {
        user_id: user_id.to_string(),
        karma_points: state.karma_points,
        warnings: state.warnings,
        banned: state.banned,
        suspended_until: state.suspended_until,
        auto_banned,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_user(id: &str, karma: i32, warnings: i32) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            token: None,
            name: None,
            study_field: None,
            karma_points: karma,
            warnings,
            is_banned: false,
            suspended_until: None,
            is_admin: false,
            is_moderator: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_moderator(id: &str) -> user::Model {
        user::Model {
            is_moderator: true,
            ..test_user(id, 0, 0)
        }
    }

    fn test_audit_row(user_id: &str, action: ActionKind) -> moderation_action::Model {
        moderation_action::Model {
            id: "action1".to_string(),
            user_id: user_id.to_string(),
            moderator_id: "mod1".to_string(),
            action,
            reason: None,
            suspension_days: None,
            karma_delta: 0,
            auto_ban: false,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> ModerationService {
        let db = Arc::new(db);
        ModerationService::new(
            ModerationRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_warn_user_first_strike() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![test_moderator("mod1")],
                vec![test_user("user1", 100, 0)],
            ])
            .append_query_results([[test_audit_row("user1", ActionKind::Warn)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let service = service_with(db);
        let outcome = service.warn_user("mod1", "user1", "spam").await.unwrap();

        assert_eq!(outcome.warnings, 1);
        assert_eq!(outcome.karma_points, 85);
        assert!(!outcome.auto_banned);
        assert!(!outcome.banned);
    }

    #[tokio::test]
    async fn test_third_warning_auto_bans() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![test_moderator("mod1")],
                vec![test_user("user1", 100, 2)],
            ])
            .append_query_results([[test_audit_row("user1", ActionKind::Warn)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let service = service_with(db);
        let outcome = service
            .warn_user("mod1", "user1", "third strike")
            .await
            .unwrap();

        assert!(outcome.auto_banned);
        assert!(outcome.banned);
        assert_eq!(outcome.warnings, 3);
        // Ban magnitude, not the warning magnitude
        assert_eq!(outcome.karma_points, 50);
    }

    #[tokio::test]
    async fn test_warn_requires_moderator() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("peer1", 0, 0)]])
            .into_connection();

        let service = service_with(db);
        let result = service.warn_user("peer1", "user1", "spam").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cannot_sanction_self() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_moderator("mod1")]])
            .into_connection();

        let service = service_with(db);
        let result = service.ban_user("mod1", "mod1", "oops").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_cannot_sanction_admin() {
        let admin = user::Model {
            is_admin: true,
            ..test_user("admin1", 0, 0)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_moderator("mod1")], vec![admin]])
            .into_connection();

        let service = service_with(db);
        let result = service.suspend_user("mod1", "admin1", 3, "reason").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_suspend_rejects_zero_days() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(db);
        let result = service.suspend_user("mod1", "user1", 0, "reason").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unsuspend_requires_suspension() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![test_moderator("mod1")],
                vec![test_user("user1", 10, 0)],
            ])
            .into_connection();

        let service = service_with(db);
        let result = service.unsuspend_user("mod1", "user1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_report_rejects_self_report() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(db);
        let result = service
            .create_report(
                "user1",
                CreateReportInput {
                    target_user_id: "user1".to_string(),
                    group_id: None,
                    comment: "bad".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_report_rejects_empty_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(db);
        let result = service
            .create_report(
                "user1",
                CreateReportInput {
                    target_user_id: "user2".to_string(),
                    group_id: None,
                    comment: "   ".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
