//! Rating repository.

use std::sync::Arc;

use crate::entities::{rating, Rating};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use studycircle_common::{AppError, AppResult};

/// Rating repository for database operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a rating.
    pub async fn create(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing rating.
    pub async fn update(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the rating a user has given a group, if any.
    pub async fn find_by_group_and_rater(
        &self,
        group_id: &str,
        rater_id: &str,
    ) -> AppResult<Option<rating::Model>> {
        Rating::find()
            .filter(rating::Column::GroupId.eq(group_id))
            .filter(rating::Column::RaterId.eq(rater_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ratings for a group, newest first.
    pub async fn find_for_group(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<rating::Model>> {
        Rating::find()
            .filter(rating::Column::GroupId.eq(group_id))
            .order_by_desc(rating::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ratings for a group.
    pub async fn count_for_group(&self, group_id: &str) -> AppResult<u64> {
        Rating::find()
            .filter(rating::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
