//! User service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use studycircle_common::{AppError, AppResult, IdGenerator};
use studycircle_db::entities::user;
use studycircle_db::repositories::UserRepository;
use validator::Validate;

/// Input for creating a user account.
///
/// Credential issuance beyond the opaque API token lives outside this
/// service.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(max = 256))]
    pub name: Option<String>,
    #[validate(length(max = 256))]
    pub study_field: Option<String>,
}

/// Service for user accounts.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a user with zeroed score state and a fresh API token.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if !input
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits, and underscores".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            token: Set(Some(self.id_gen.generate_token())),
            name: Set(input.name),
            study_field: Set(input.study_field),
            karma_points: Set(0),
            warnings: Set(0),
            is_banned: Set(false),
            suspended_until: Set(None),
            is_admin: Set(false),
            is_moderator: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;

        tracing::info!(user_id = %created.id, username = %created.username, "Created user");

        Ok(created)
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Authenticate an API request by bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// List users for the admin panel, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }

    /// List banned users for the admin panel.
    pub async fn list_banned(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list_banned(limit, offset).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_with(db: sea_orm::DatabaseConnection) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_create_rejects_bad_username() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .create(CreateUserInput {
                username: "not ok!".to_string(),
                name: None,
                study_field: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let existing = user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            token: None,
            name: None,
            study_field: None,
            karma_points: 0,
            warnings: 0,
            is_banned: false,
            suspended_until: None,
            is_admin: false,
            is_moderator: false,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .create(CreateUserInput {
                username: "Alice".to_string(),
                name: None,
                study_field: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<user::Model, _, _>([Vec::new()])
            .into_connection();

        let service = service_with(db);
        let result = service.authenticate_by_token("nope").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
