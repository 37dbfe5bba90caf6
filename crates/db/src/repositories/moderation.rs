//! Moderation repository for abuse reports and the action audit log.

use std::sync::Arc;

use crate::entities::{
    abuse_report::{self, ReportStatus},
    moderation_action, AbuseReport, ModerationAction,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use studycircle_common::{AppError, AppResult};

/// Moderation repository for database operations.
#[derive(Clone)]
pub struct ModerationRepository {
    db: Arc<DatabaseConnection>,
}

impl ModerationRepository {
    /// Create a new moderation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Abuse Reports ==========

    /// Create a new abuse report.
    pub async fn create_report(
        &self,
        model: abuse_report::ActiveModel,
    ) -> AppResult<abuse_report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an abuse report by ID.
    pub async fn get_report(&self, id: &str) -> AppResult<abuse_report::Model> {
        AbuseReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// Get all abuse reports with optional status filter.
    pub async fn get_reports(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<abuse_report::Model>> {
        let mut query = AbuseReport::find().order_by_desc(abuse_report::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(abuse_report::Column::Status.eq(s));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an abuse report.
    pub async fn update_report(
        &self,
        model: abuse_report::ActiveModel,
    ) -> AppResult<abuse_report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending reports.
    pub async fn count_pending_reports(&self) -> AppResult<u64> {
        AbuseReport::find()
            .filter(abuse_report::Column::Status.eq(ReportStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get reports submitted by a specific user.
    pub async fn get_reports_by_reporter(
        &self,
        reporter_id: &str,
        limit: u64,
    ) -> AppResult<Vec<abuse_report::Model>> {
        AbuseReport::find()
            .filter(abuse_report::Column::ReporterId.eq(reporter_id))
            .order_by_desc(abuse_report::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get reports filed against a specific user.
    pub async fn get_reports_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<abuse_report::Model>> {
        AbuseReport::find()
            .filter(abuse_report::Column::TargetUserId.eq(user_id))
            .order_by_desc(abuse_report::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Moderation Actions ==========

    /// Record a moderation action in the audit log.
    pub async fn record_action(
        &self,
        model: moderation_action::ActiveModel,
    ) -> AppResult<moderation_action::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Moderation history for a user, newest first.
    pub async fn get_actions_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<moderation_action::Model>> {
        ModerationAction::find()
            .filter(moderation_action::Column::UserId.eq(user_id))
            .order_by_desc(moderation_action::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
