//! Group rating service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use studycircle_common::{AppError, AppResult, IdGenerator};
use studycircle_db::entities::rating;
use studycircle_db::repositories::{GroupRepository, RatingRepository};
use validator::Validate;

use super::karma::{KarmaAction, KarmaService};

/// Input for rating a group and its leader.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RateGroupInput {
    pub group_id: String,
    #[validate(range(min = 1, max = 5))]
    pub group_score: i16,
    #[validate(range(min = 1, max = 5))]
    pub leader_score: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Service for member ratings of groups and their leaders.
///
/// The average of the two component scores drives rating karma for the
/// group leader: a strong average rewards, a weak one costs, and the
/// middle band moves nothing.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: RatingRepository,
    group_repo: GroupRepository,
    karma: KarmaService,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(
        rating_repo: RatingRepository,
        group_repo: GroupRepository,
        karma: KarmaService,
    ) -> Self {
        Self {
            rating_repo,
            group_repo,
            karma,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit or update a rating.
    ///
    /// One rating per member per group; re-rating updates the stored
    /// row. The karma delta of the submitted average is applied to the
    /// leader on every submission.
    pub async fn rate_group(
        &self,
        rater_id: &str,
        input: RateGroupInput,
    ) -> AppResult<rating::Model> {
        input.validate()?;

        let group = self.group_repo.get_by_id(&input.group_id).await?;
        if group.leader_id == rater_id {
            return Err(AppError::BadRequest(
                "The leader cannot rate their own group".to_string(),
            ));
        }

        self.require_member(&input.group_id, rater_id).await?;

        let saved = match self
            .rating_repo
            .find_by_group_and_rater(&input.group_id, rater_id)
            .await?
        {
            Some(existing) => {
                let mut model: rating::ActiveModel = existing.into();
                model.group_score = Set(input.group_score);
                model.leader_score = Set(input.leader_score);
                model.comment = Set(input.comment);
                model.updated_at = Set(Some(Utc::now().into()));
                self.rating_repo.update(model).await?
            }
            None => {
                let model = rating::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    group_id: Set(input.group_id),
                    rater_id: Set(rater_id.to_string()),
                    group_score: Set(input.group_score),
                    leader_score: Set(input.leader_score),
                    comment: Set(input.comment),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                };
                self.rating_repo.create(model).await?
            }
        };

        let average = saved.average();
        let action = KarmaAction::Rating { average };
        if action.delta() < 0 {
            self.karma.penalize(&group.leader_id, &action).await?;
        } else {
            self.karma.award(&group.leader_id, &action).await?;
        }

        tracing::debug!(
            group_id = %saved.group_id,
            rater_id = rater_id,
            average = average,
            "Recorded group rating"
        );

        Ok(saved)
    }

    /// Ratings for a group, newest first.
    pub async fn ratings(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<rating::Model>> {
        self.rating_repo.find_for_group(group_id, limit, offset).await
    }

    /// Number of ratings a group has received.
    pub async fn count(&self, group_id: &str) -> AppResult<u64> {
        self.rating_repo.count_for_group(group_id).await
    }

    async fn require_member(&self, group_id: &str, user_id: &str) -> AppResult<()> {
        self.group_repo
            .find_member(group_id, user_id)
            .await?
            .filter(|m| !m.is_pending)
            .ok_or_else(|| AppError::Forbidden("Not a member of this group".to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use studycircle_db::entities::group::{self, GroupJoinPolicy};
    use studycircle_db::repositories::UserRepository;

    fn test_group(id: &str, leader_id: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            leader_id: leader_id.to_string(),
            name: "Microeconomics".to_string(),
            subject: None,
            description: None,
            join_policy: GroupJoinPolicy::Open,
            is_archived: false,
            members_count: 3,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> RatingService {
        let db = Arc::new(db);
        RatingService::new(
            RatingRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            KarmaService::new(UserRepository::new(db)),
        )
    }

    fn input(group_score: i16, leader_score: i16) -> RateGroupInput {
        RateGroupInput {
            group_id: "group1".to_string(),
            group_score,
            leader_score,
            comment: None,
        }
    }

    #[test]
    fn test_average_of_components() {
        let rating = rating::Model {
            id: "rating1".to_string(),
            group_id: "group1".to_string(),
            rater_id: "user1".to_string(),
            group_score: 4,
            leader_score: 3,
            comment: None,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        assert!((rating.average() - 3.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_rate_group_rejects_out_of_range_score() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.rate_group("user1", input(6, 3)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_leader_cannot_rate_own_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_group("group1", "leader1")]])
            .into_connection();

        let service = service_with(db);
        let result = service.rate_group("leader1", input(5, 5)).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_rate_group_requires_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_group("group1", "leader1")]])
            .append_query_results::<studycircle_db::entities::group_member::Model, _, _>([
                Vec::new(),
            ])
            .into_connection();

        let service = service_with(db);
        let result = service.rate_group("stranger", input(4, 4)).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
