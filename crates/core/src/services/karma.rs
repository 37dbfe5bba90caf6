//! Karma ledger.
//!
//! Translates platform actions into reputation point deltas and applies
//! them to a user's score. The action table here is the single source of
//! truth for magnitudes; no other code path applies an ad hoc value.
//!
//! Scores never go below zero: a deduction that would go negative is
//! clamped to exactly 0.

use studycircle_common::{AppError, AppResult};
use studycircle_db::repositories::UserRepository;

/// A platform action with its scoring context.
///
/// Actions carry the context that selects their variant: whether a
/// message had a file attached, how long a suspension runs, the average
/// of a submitted rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KarmaAction {
    /// Created a study group.
    GroupCreation,
    /// Joined a group (directly or via approved request).
    GroupJoin,
    /// Posted a chat message.
    Message {
        /// Message carries a file attachment.
        with_attachment: bool,
    },
    /// Scheduled a study session.
    MeetingCreation,
    /// Approved a pending join request (the approving leader).
    JoinApproval,
    /// Received a moderation warning.
    Warning,
    /// Suspended for the given number of days.
    Suspension {
        /// Suspension length in days. Callers pass a positive count;
        /// there is no tier below one day.
        days: u32,
    },
    /// Banned from the platform.
    Ban,
    /// Kicked from a group by its leader.
    Kick,
    /// Left a group voluntarily.
    VoluntaryLeave,
    /// Received a rating with the given component average.
    Rating {
        /// Average of the group and leader scores, compared raw against
        /// the band thresholds.
        average: f32,
    },
}

impl KarmaAction {
    /// Signed point delta for this action.
    ///
    /// Pure lookup for display/preview as well as scoring; never
    /// mutates state.
    #[must_use]
    pub fn delta(&self) -> i32 {
        match self {
            Self::GroupCreation => 20,
            Self::GroupJoin => 10,
            Self::Message { with_attachment } => {
                if *with_attachment {
                    10
                } else {
                    5
                }
            }
            Self::MeetingCreation => 15,
            Self::JoinApproval => 5,
            Self::Warning => -15,
            Self::Suspension { days } => -suspension_magnitude(*days),
            Self::Ban => -50,
            Self::Kick => -20,
            Self::VoluntaryLeave => -5,
            Self::Rating { average } => rating_delta(*average),
        }
    }

    /// Stable tag for logs and audit rows.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::GroupCreation => "group_creation",
            Self::GroupJoin => "group_join",
            Self::Message { .. } => "message",
            Self::MeetingCreation => "meeting_creation",
            Self::JoinApproval => "join_approval",
            Self::Warning => "warning",
            Self::Suspension { .. } => "suspension",
            Self::Ban => "ban",
            Self::Kick => "kick",
            Self::VoluntaryLeave => "voluntary_leave",
            Self::Rating { .. } => "rating",
        }
    }
}

/// Penalty magnitude for a suspension of `days` days.
///
/// Inclusive tier thresholds: exactly 3 days costs 10 points, exactly
/// 7 costs 20, exactly 30 costs 30, anything longer costs 40.
const fn suspension_magnitude(days: u32) -> i32 {
    if days <= 3 {
        10
    } else if days <= 7 {
        20
    } else if days <= 30 {
        30
    } else {
        40
    }
}

/// Delta for a rating average.
///
/// The 3.0-3.9 band is a deliberate no-op zone: good-but-not-great
/// ratings neither reward nor punish.
fn rating_delta(average: f32) -> i32 {
    if average >= 4.0 {
        10
    } else if average < 3.0 {
        -5
    } else {
        0
    }
}

/// Apply an action to a score, clamping at the zero floor.
///
/// The only place scores change. Awards have no upper bound; penalties
/// bottom out at exactly 0.
#[must_use]
pub fn apply(karma_points: i32, action: &KarmaAction) -> i32 {
    karma_points.saturating_add(action.delta()).max(0)
}

/// Service applying karma deltas to persisted user scores.
///
/// The pure table above is the ledger; this is the shell that reads the
/// current score, applies, and writes back.
#[derive(Clone)]
pub struct KarmaService {
    user_repo: UserRepository,
}

impl KarmaService {
    /// Create a new karma service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Award points for a constructive action. Returns the new score.
    ///
    /// Rejects penalty-signed actions so callers cannot smuggle a
    /// deduction through the award path.
    pub async fn award(&self, user_id: &str, action: &KarmaAction) -> AppResult<i32> {
        if action.delta() < 0 {
            return Err(AppError::BadRequest(format!(
                "{} is not an awardable action",
                action.tag()
            )));
        }
        self.apply_to_user(user_id, action).await
    }

    /// Deduct points for a violation or penalty. Returns the new score.
    pub async fn penalize(&self, user_id: &str, action: &KarmaAction) -> AppResult<i32> {
        if action.delta() > 0 {
            return Err(AppError::BadRequest(format!(
                "{} is not a penalty action",
                action.tag()
            )));
        }
        self.apply_to_user(user_id, action).await
    }

    async fn apply_to_user(&self, user_id: &str, action: &KarmaAction) -> AppResult<i32> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_score = apply(user.karma_points, action);

        self.user_repo.update_karma(user_id, new_score).await?;

        tracing::debug!(
            user_id = user_id,
            action = action.tag(),
            delta = action.delta(),
            score = new_score,
            "Applied karma action"
        );

        Ok(new_score)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use studycircle_db::entities::user;

    #[test]
    fn test_award_values() {
        assert_eq!(KarmaAction::GroupCreation.delta(), 20);
        assert_eq!(KarmaAction::GroupJoin.delta(), 10);
        assert_eq!(
            KarmaAction::Message {
                with_attachment: false
            }
            .delta(),
            5
        );
        assert_eq!(
            KarmaAction::Message {
                with_attachment: true
            }
            .delta(),
            10
        );
        assert_eq!(KarmaAction::MeetingCreation.delta(), 15);
        assert_eq!(KarmaAction::JoinApproval.delta(), 5);
    }

    #[test]
    fn test_penalty_values() {
        assert_eq!(KarmaAction::Warning.delta(), -15);
        assert_eq!(KarmaAction::Ban.delta(), -50);
        assert_eq!(KarmaAction::Kick.delta(), -20);
        assert_eq!(KarmaAction::VoluntaryLeave.delta(), -5);
    }

    #[test]
    fn test_suspension_tier_boundaries() {
        assert_eq!(KarmaAction::Suspension { days: 1 }.delta(), -10);
        assert_eq!(KarmaAction::Suspension { days: 3 }.delta(), -10);
        assert_eq!(KarmaAction::Suspension { days: 4 }.delta(), -20);
        assert_eq!(KarmaAction::Suspension { days: 7 }.delta(), -20);
        assert_eq!(KarmaAction::Suspension { days: 8 }.delta(), -30);
        assert_eq!(KarmaAction::Suspension { days: 30 }.delta(), -30);
        assert_eq!(KarmaAction::Suspension { days: 31 }.delta(), -40);
        assert_eq!(KarmaAction::Suspension { days: 365 }.delta(), -40);
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(KarmaAction::Rating { average: 5.0 }.delta(), 10);
        assert_eq!(KarmaAction::Rating { average: 4.0 }.delta(), 10);
        assert_eq!(KarmaAction::Rating { average: 3.9 }.delta(), 0);
        assert_eq!(KarmaAction::Rating { average: 3.5 }.delta(), 0);
        // Boundary is inclusive on the low side of the neutral band
        assert_eq!(KarmaAction::Rating { average: 3.0 }.delta(), 0);
        assert_eq!(KarmaAction::Rating { average: 2.9 }.delta(), -5);
        assert_eq!(KarmaAction::Rating { average: 1.0 }.delta(), -5);
    }

    #[test]
    fn test_apply_clamps_at_zero() {
        assert_eq!(apply(10, &KarmaAction::Ban), 0);
        assert_eq!(apply(50, &KarmaAction::Ban), 0);
        assert_eq!(apply(51, &KarmaAction::Ban), 1);
        assert_eq!(apply(0, &KarmaAction::Warning), 0);
    }

    #[test]
    fn test_apply_awards_are_monotonic() {
        let mut score = 0;
        for action in [
            KarmaAction::GroupCreation,
            KarmaAction::GroupJoin,
            KarmaAction::Message {
                with_attachment: true,
            },
            KarmaAction::MeetingCreation,
            KarmaAction::JoinApproval,
        ] {
            let next = apply(score, &action);
            assert!(next >= score);
            score = next;
        }
        assert_eq!(score, 60);
    }

    #[test]
    fn test_scenario_creation_messages_then_suspension() {
        // Start at 0; create a group; send 3 plain messages; 7 day suspension.
        let mut score = 0;
        score = apply(score, &KarmaAction::GroupCreation);
        assert_eq!(score, 20);
        for _ in 0..3 {
            score = apply(
                score,
                &KarmaAction::Message {
                    with_attachment: false,
                },
            );
        }
        assert_eq!(score, 35);
        score = apply(score, &KarmaAction::Suspension { days: 7 });
        assert_eq!(score, 15);
    }

    #[test]
    fn test_scenario_bad_rating_then_kick_clamps() {
        // Start at 10; bad rating (avg 2.0); kicked from a group.
        let mut score = 10;
        score = apply(score, &KarmaAction::Rating { average: 2.0 });
        assert_eq!(score, 5);
        score = apply(score, &KarmaAction::Kick);
        assert_eq!(score, 0);
    }

    fn create_test_user(id: &str, karma_points: i32) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            token: None,
            name: None,
            study_field: None,
            karma_points,
            warnings: 0,
            is_banned: false,
            suspended_until: None,
            is_admin: false,
            is_moderator: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_award_persists_new_score() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", 30)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = KarmaService::new(UserRepository::new(db));
        let score = service
            .award("user1", &KarmaAction::GroupCreation)
            .await
            .unwrap();

        assert_eq!(score, 50);
    }

    #[tokio::test]
    async fn test_penalize_clamps_at_floor() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", 5)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = KarmaService::new(UserRepository::new(db));
        let score = service.penalize("user1", &KarmaAction::Kick).await.unwrap();

        assert_eq!(score, 0);
    }

    #[tokio::test]
    async fn test_award_rejects_penalty_action() {
        let service = KarmaService::new(UserRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )));

        let result = service.award("user1", &KarmaAction::Ban).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_penalize_rejects_award_action() {
        let service = KarmaService::new(UserRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        )));

        let result = service.penalize("user1", &KarmaAction::GroupJoin).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_rating_neutral_band_allowed_on_both_paths() {
        // A 3.5 average is a zero delta; both award and penalize accept it.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", 12)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = KarmaService::new(UserRepository::new(db));
        let score = service
            .award("user1", &KarmaAction::Rating { average: 3.5 })
            .await
            .unwrap();

        assert_eq!(score, 12);
    }
}
