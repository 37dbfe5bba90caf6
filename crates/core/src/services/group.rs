//! Study group service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use studycircle_common::{AppError, AppResult, IdGenerator};
use studycircle_db::entities::group::GroupJoinPolicy;
use studycircle_db::entities::group_member::GroupRole;
use studycircle_db::entities::{group, group_member};
use studycircle_db::repositories::{GroupRepository, UserRepository};
use validator::Validate;

use super::karma::{KarmaAction, KarmaService};

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 128))]
    pub subject: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[serde(default)]
    pub join_policy: GroupJoinPolicy,
}

/// What happened when a user asked to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResult {
    /// Member immediately (open group).
    Joined,
    /// Request recorded, awaiting leader approval.
    Pending,
}

/// Service for managing study groups and their memberships.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    user_repo: UserRepository,
    karma: KarmaService,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(
        group_repo: GroupRepository,
        user_repo: UserRepository,
        karma: KarmaService,
    ) -> Self {
        Self {
            group_repo,
            user_repo,
            karma,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// List groups for the admin panel, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<group::Model>> {
        self.group_repo.list(limit, offset).await
    }

    /// Count all groups.
    pub async fn count(&self) -> AppResult<u64> {
        self.group_repo.count().await
    }

    /// Create a group with the creator as leader.
    pub async fn create(&self, leader_id: &str, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        self.user_repo.get_by_id(leader_id).await?;

        let group_id = self.id_gen.generate();
        let model = group::ActiveModel {
            id: Set(group_id.clone()),
            leader_id: Set(leader_id.to_string()),
            name: Set(input.name),
            subject: Set(input.subject),
            description: Set(input.description),
            join_policy: Set(input.join_policy),
            is_archived: Set(false),
            members_count: Set(1),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.group_repo.create(model).await?;

        // Leader membership row
        let member = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id),
            user_id: Set(leader_id.to_string()),
            role: Set(GroupRole::Leader),
            is_pending: Set(false),
            created_at: Set(Utc::now().into()),
        };
        self.group_repo.add_member(member).await?;

        self.karma
            .award(leader_id, &KarmaAction::GroupCreation)
            .await?;

        tracing::info!(group_id = %created.id, leader_id = leader_id, "Created group");

        Ok(created)
    }

    /// Join a group, or request to join for approval groups.
    pub async fn join(&self, group_id: &str, user_id: &str) -> AppResult<JoinResult> {
        let group = self.active_group(group_id).await?;

        if self.group_repo.find_member(group_id, user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Already a member of this group".to_string(),
            ));
        }

        let pending = group.join_policy == GroupJoinPolicy::Approval;
        let member = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id.to_string()),
            user_id: Set(user_id.to_string()),
            role: Set(GroupRole::Member),
            is_pending: Set(pending),
            created_at: Set(Utc::now().into()),
        };
        self.group_repo.add_member(member).await?;

        if pending {
            tracing::debug!(group_id = group_id, user_id = user_id, "Join request pending");
            return Ok(JoinResult::Pending);
        }

        self.group_repo.increment_members_count(group_id).await?;
        self.karma.award(user_id, &KarmaAction::GroupJoin).await?;

        Ok(JoinResult::Joined)
    }

    /// Approve a pending join request.
    ///
    /// The new member is credited for joining; the approving leader is
    /// credited for handling the request.
    pub async fn approve_join(
        &self,
        group_id: &str,
        leader_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let group = self.active_group(group_id).await?;
        if group.leader_id != leader_id {
            return Err(AppError::Forbidden(
                "Only the group leader can approve join requests".to_string(),
            ));
        }

        let member = self
            .group_repo
            .find_member(group_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No join request from this user".to_string()))?;
        if !member.is_pending {
            return Err(AppError::BadRequest("Membership is not pending".to_string()));
        }

        let mut model: group_member::ActiveModel = member.into();
        model.is_pending = Set(false);
        self.group_repo.update_member(model).await?;
        self.group_repo.increment_members_count(group_id).await?;

        self.karma.award(user_id, &KarmaAction::GroupJoin).await?;
        self.karma
            .award(leader_id, &KarmaAction::JoinApproval)
            .await?;

        tracing::info!(
            group_id = group_id,
            user_id = user_id,
            leader_id = leader_id,
            "Approved join request"
        );

        Ok(())
    }

    /// Reject a pending join request. No karma moves.
    pub async fn reject_join(
        &self,
        group_id: &str,
        leader_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;
        if group.leader_id != leader_id {
            return Err(AppError::Forbidden(
                "Only the group leader can reject join requests".to_string(),
            ));
        }

        let member = self
            .group_repo
            .find_member(group_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No join request from this user".to_string()))?;
        if !member.is_pending {
            return Err(AppError::BadRequest("Membership is not pending".to_string()));
        }

        self.group_repo.remove_member(&member.id).await
    }

    /// Leave a group voluntarily.
    pub async fn leave(&self, group_id: &str, user_id: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;
        if group.leader_id == user_id {
            return Err(AppError::BadRequest(
                "The leader cannot leave their own group".to_string(),
            ));
        }

        let member = self
            .group_repo
            .find_member(group_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Not a member of this group".to_string()))?;

        let was_pending = member.is_pending;
        self.group_repo.remove_member(&member.id).await?;

        // Withdrawing a pending request is not a departure
        if was_pending {
            return Ok(());
        }

        self.group_repo.decrement_members_count(group_id).await?;
        self.karma
            .penalize(user_id, &KarmaAction::VoluntaryLeave)
            .await?;

        tracing::info!(group_id = group_id, user_id = user_id, "Left group");

        Ok(())
    }

    /// Kick a member out of a group.
    pub async fn kick(&self, group_id: &str, leader_id: &str, user_id: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;
        if group.leader_id != leader_id {
            return Err(AppError::Forbidden(
                "Only the group leader can kick members".to_string(),
            ));
        }
        if leader_id == user_id {
            return Err(AppError::BadRequest("Cannot kick yourself".to_string()));
        }

        let member = self
            .group_repo
            .find_member(group_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Not a member of this group".to_string()))?;

        let was_pending = member.is_pending;
        self.group_repo.remove_member(&member.id).await?;

        if was_pending {
            return Ok(());
        }

        self.group_repo.decrement_members_count(group_id).await?;
        self.karma.penalize(user_id, &KarmaAction::Kick).await?;

        tracing::info!(
            group_id = group_id,
            user_id = user_id,
            leader_id = leader_id,
            "Kicked member"
        );

        Ok(())
    }

    /// Archive a group (soft delete). Allowed for the group leader and
    /// platform moderators.
    pub async fn archive(&self, group_id: &str, actor_id: &str) -> AppResult<group::Model> {
        let group = self.group_repo.get_by_id(group_id).await?;

        if group.leader_id != actor_id {
            let actor = self.user_repo.get_by_id(actor_id).await?;
            if !actor.is_admin && !actor.is_moderator {
                return Err(AppError::Forbidden(
                    "Only the leader or a moderator can archive a group".to_string(),
                ));
            }
        }

        let mut model: group::ActiveModel = group.into();
        model.is_archived = Set(true);
        model.updated_at = Set(Some(Utc::now().into()));

        let archived = self.group_repo.update(model).await?;

        tracing::info!(group_id = group_id, actor_id = actor_id, "Archived group");

        Ok(archived)
    }

    /// List active members of a group.
    pub async fn members(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_member::Model>> {
        self.group_repo.list_members(group_id, limit, offset).await
    }

    /// List pending join requests (leader only).
    pub async fn pending_requests(
        &self,
        group_id: &str,
        leader_id: &str,
    ) -> AppResult<Vec<group_member::Model>> {
        let group = self.group_repo.get_by_id(group_id).await?;
        if group.leader_id != leader_id {
            return Err(AppError::Forbidden(
                "Only the group leader can view join requests".to_string(),
            ));
        }

        self.group_repo.list_pending_members(group_id).await
    }

    /// Membership check used by the messaging, meeting, and rating
    /// services. Pending requests do not count.
    pub async fn require_active_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<group_member::Model> {
        let member = self
            .group_repo
            .find_member(group_id, user_id)
            .await?
            .filter(|m| !m.is_pending)
            .ok_or_else(|| AppError::Forbidden("Not a member of this group".to_string()))?;
        Ok(member)
    }

    async fn active_group(&self, group_id: &str) -> AppResult<group::Model> {
        let group = self.group_repo.get_by_id(group_id).await?;
        if group.is_archived {
            return Err(AppError::BadRequest("Group is archived".to_string()));
        }
        Ok(group)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_group(id: &str, leader_id: &str, policy: GroupJoinPolicy) -> group::Model {
        group::Model {
            id: id.to_string(),
            leader_id: leader_id.to_string(),
            name: "Organic Chemistry".to_string(),
            subject: Some("CHEM-301".to_string()),
            description: None,
            join_policy: policy,
            is_archived: false,
            members_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> GroupService {
        let db = Arc::new(db);
        GroupService::new(
            GroupRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            KarmaService::new(UserRepository::new(db)),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .create(
                "user1",
                CreateGroupInput {
                    name: String::new(),
                    subject: None,
                    description: None,
                    join_policy: GroupJoinPolicy::Open,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_join_rejects_archived_group() {
        let mut group = test_group("group1", "leader1", GroupJoinPolicy::Open);
        group.is_archived = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .into_connection();

        let service = service_with(db);
        let result = service.join("group1", "user1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_join_rejects_existing_member() {
        let group = test_group("group1", "leader1", GroupJoinPolicy::Open);
        let member = group_member::Model {
            id: "member1".to_string(),
            group_id: "group1".to_string(),
            user_id: "user1".to_string(),
            role: GroupRole::Member,
            is_pending: false,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .append_query_results([[member]])
            .into_connection();

        let service = service_with(db);
        let result = service.join("group1", "user1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_leave_rejects_leader() {
        let group = test_group("group1", "leader1", GroupJoinPolicy::Open);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .into_connection();

        let service = service_with(db);
        let result = service.leave("group1", "leader1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_kick_requires_leader() {
        let group = test_group("group1", "leader1", GroupJoinPolicy::Open);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .into_connection();

        let service = service_with(db);
        let result = service.kick("group1", "someone-else", "user1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
