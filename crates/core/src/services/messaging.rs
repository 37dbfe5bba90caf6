//! Group chat messaging service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use studycircle_common::{AppError, AppResult, IdGenerator};
use studycircle_db::entities::message;
use studycircle_db::repositories::{GroupRepository, MessageRepository};
use validator::Validate;

use super::karma::{KarmaAction, KarmaService};

/// Input for posting a message.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageInput {
    pub group_id: String,
    #[validate(length(min = 1, max = 3000))]
    pub text: String,
    #[validate(length(max = 1024))]
    pub attachment_url: Option<String>,
}

/// Service for group chat messages.
#[derive(Clone)]
pub struct MessagingService {
    message_repo: MessageRepository,
    group_repo: GroupRepository,
    karma: KarmaService,
    id_gen: IdGenerator,
}

impl MessagingService {
    /// Create a new messaging service.
    #[must_use]
    pub const fn new(
        message_repo: MessageRepository,
        group_repo: GroupRepository,
        karma: KarmaService,
    ) -> Self {
        Self {
            message_repo,
            group_repo,
            karma,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a message to a group chat.
    ///
    /// Messages with a file attachment score higher than plain ones.
    pub async fn create_message(
        &self,
        user_id: &str,
        input: CreateMessageInput,
    ) -> AppResult<message::Model> {
        input.validate()?;

        let group = self.group_repo.get_by_id(&input.group_id).await?;
        if group.is_archived {
            return Err(AppError::BadRequest("Group is archived".to_string()));
        }

        self.require_member(&input.group_id, user_id).await?;

        let with_attachment = input.attachment_url.is_some();
        let model = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(input.group_id),
            user_id: Set(user_id.to_string()),
            text: Set(input.text),
            attachment_url: Set(input.attachment_url),
            created_at: Set(Utc::now().into()),
        };
        let created = self.message_repo.create(model).await?;

        self.karma
            .award(user_id, &KarmaAction::Message { with_attachment })
            .await?;

        Ok(created)
    }

    /// Recent messages in a group chat, newest first. Members only.
    pub async fn messages(
        &self,
        group_id: &str,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<message::Model>> {
        self.require_member(group_id, user_id).await?;
        self.message_repo.find_for_group(group_id, limit, offset).await
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
