//! User repository.

use std::sync::Arc;

use crate::entities::{user, User};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use studycircle_common::{AppError, AppResult};

/// Snapshot of the score fields written back after a karma or
/// moderation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub karma_points: i32,
    pub warnings: i32,
    pub is_banned: bool,
    pub suspended_until: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by access token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write all four score fields in a single statement keyed by
    /// primary key. Serializing concurrent moderation of the same user
    /// beyond this single-statement write is the deployment's
    /// transactional concern.
    pub async fn update_score(&self, user_id: &str, score: ScoreUpdate) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::KarmaPoints, Expr::value(score.karma_points))
            .col_expr(user::Column::Warnings, Expr::value(score.warnings))
            .col_expr(user::Column::IsBanned, Expr::value(score.is_banned))
            .col_expr(
                user::Column::SuspendedUntil,
                Expr::value(score.suspended_until),
            )
            .col_expr(
                user::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write only the karma score, for award/penalty paths that do not
    /// touch the moderation fields.
    pub async fn update_karma(&self, user_id: &str, karma_points: i32) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::KarmaPoints, Expr::value(karma_points))
            .col_expr(
                user::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List users (paginated), newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List banned users (paginated).
    pub async fn list_banned(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::IsBanned.eq(true))
            .order_by_desc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count banned users.
    pub async fn count_banned(&self) -> AppResult<u64> {
        User::find()
            .filter(user::Column::IsBanned.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users whose suspension has not yet expired.
    pub async fn count_suspended(&self) -> AppResult<u64> {
        let now = chrono::Utc::now();

        User::find()
            .filter(user::Column::SuspendedUntil.gt(now))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
