//! Business logic services.

#![allow(missing_docs)]

pub mod escalation;
pub mod group;
pub mod karma;
pub mod meeting;
pub mod messaging;
pub mod moderation;
pub mod rating;
pub mod user;

pub use escalation::{AccountStanding, Sanction, ScoreState, AUTO_BAN_WARNING_COUNT};
pub use group::{CreateGroupInput, GroupService, JoinResult};
pub use karma::{KarmaAction, KarmaService};
pub use meeting::{CreateMeetingInput, MeetingService};
pub use messaging::{CreateMessageInput, MessagingService};
pub use moderation::{
    score_state, CreateReportInput, ModerationOutcome, ModerationService, ModerationStats,
    ReportStatus, ResolveReportInput,
};
pub use rating::{RateGroupInput, RatingService};
pub use user::{CreateUserInput, UserService};
