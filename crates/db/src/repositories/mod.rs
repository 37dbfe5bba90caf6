//! Database repositories.

#![allow(missing_docs)]

pub mod group;
pub mod meeting;
pub mod message;
pub mod moderation;
pub mod rating;
pub mod user;

pub use group::GroupRepository;
pub use meeting::MeetingRepository;
pub use message::MessageRepository;
pub use moderation::ModerationRepository;
pub use rating::RatingRepository;
pub use user::{ScoreUpdate, UserRepository};
