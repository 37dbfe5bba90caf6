//! Meeting repository.

use std::sync::Arc;

use crate::entities::{meeting, Meeting};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use studycircle_common::{AppError, AppResult};

/// Meeting repository for database operations.
#[derive(Clone)]
pub struct MeetingRepository {
    db: Arc<DatabaseConnection>,
}

impl MeetingRepository {
    /// Create a new meeting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a meeting.
    pub async fn create(&self, model: meeting::ActiveModel) -> AppResult<meeting::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a meeting by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<meeting::Model> {
        Meeting::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Meeting {id} not found")))
    }

    /// Upcoming meetings for a group, soonest first.
    pub async fn find_upcoming_for_group(
        &self,
        group_id: &str,
        limit: u64,
    ) -> AppResult<Vec<meeting::Model>> {
        let now = chrono::Utc::now();

        Meeting::find()
            .filter(meeting::Column::GroupId.eq(group_id))
            .filter(meeting::Column::StartsAt.gt(now))
            .order_by_asc(meeting::Column::StartsAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
