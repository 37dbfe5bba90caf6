//! Study session scheduling service.

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::Deserialize;
use studycircle_common::{AppError, AppResult, IdGenerator};
use studycircle_db::entities::meeting;
use studycircle_db::repositories::{GroupRepository, MeetingRepository};
use validator::Validate;

use super::karma::{KarmaAction, KarmaService};

/// Longest plannable session, in minutes.
const MAX_DURATION_MINUTES: i32 = 12 * 60;

/// Input for scheduling a study session.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingInput {
    pub group_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 4096))]
    pub agenda: Option<String>,
    #[validate(length(max = 512))]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// Service for scheduling group study sessions.
#[derive(Clone)]
pub struct MeetingService {
    meeting_repo: MeetingRepository,
    group_repo: GroupRepository,
    karma: KarmaService,
    id_gen: IdGenerator,
}

impl MeetingService {
    /// Create a new meeting service.
    #[must_use]
    pub const fn new(
        meeting_repo: MeetingRepository,
        group_repo: GroupRepository,
        karma: KarmaService,
    ) -> Self {
        Self {
            meeting_repo,
            group_repo,
            karma,
            id_gen: IdGenerator::new(),
        }
    }

    /// Schedule a session for a group.
    pub async fn schedule(
        &self,
        organizer_id: &str,
        input: CreateMeetingInput,
    ) -> AppResult<meeting::Model> {
        input.validate()?;

        if input.starts_at <= Utc::now() {
            return Err(AppError::BadRequest(
                "Session must start in the future".to_string(),
            ));
        }
        if input.duration_minutes < 1 || input.duration_minutes > MAX_DURATION_MINUTES {
            return Err(AppError::BadRequest(
                "Session duration out of range".to_string(),
            ));
        }

        let group = self.group_repo.get_by_id(&input.group_id).await?;
        if group.is_archived {
            return Err(AppError::BadRequest("Group is archived".to_string()));
        }

        self.require_member(&input.group_id, organizer_id).await?;

        let model = meeting::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(input.group_id),
            organizer_id: Set(organizer_id.to_string()),
            title: Set(input.title),
            agenda: Set(input.agenda),
            location: Set(input.location),
            starts_at: Set(input.starts_at.into()),
            duration_minutes: Set(input.duration_minutes),
            created_at: Set(Utc::now().into()),
        };
        let created = self.meeting_repo.create(model).await?;

        self.karma
            .award(organizer_id, &KarmaAction::MeetingCreation)
            .await?;

        tracing::info!(
            meeting_id = %created.id,
            group_id = %created.group_id,
            organizer_id = organizer_id,
            "Scheduled study session"
        );

        Ok(created)
    }

    /// Upcoming sessions for a group, soonest first. Members only.
    pub async fn upcoming(
        &self,
        group_id: &str,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<meeting::Model>> {
        self.require_member(group_id, user_id).await?;
        self.meeting_repo.find_upcoming_for_group(group_id, limit).await
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
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use studycircle_db::repositories::UserRepository;

    fn service_with(db: sea_orm::DatabaseConnection) -> MeetingService {
        let db = Arc::new(db);
        MeetingService::new(
            MeetingRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            KarmaService::new(UserRepository::new(db)),
        )
    }

    fn input(starts_at: DateTime<Utc>, duration_minutes: i32) -> CreateMeetingInput {
        CreateMeetingInput {
            group_id: "group1".to_string(),
            title: "Midterm prep".to_string(),
            agenda: None,
            location: Some("Library room 2".to_string()),
            starts_at,
            duration_minutes,
        }
    }

    #[tokio::test]
    async fn test_schedule_rejects_past_start() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .schedule("user1", input(Utc::now() - Duration::hours(1), 60))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_schedule_rejects_zero_duration() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .schedule("user1", input(Utc::now() + Duration::hours(1), 0))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
