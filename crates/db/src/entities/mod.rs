//! Database entities.

#![allow(missing_docs)]

pub mod abuse_report;
pub mod group;
pub mod group_member;
pub mod meeting;
pub mod message;
pub mod moderation_action;
pub mod rating;
pub mod user;

pub use abuse_report::Entity as AbuseReport;
pub use group::Entity as Group;
pub use group_member::Entity as GroupMember;
pub use meeting::Entity as Meeting;
pub use message::Entity as Message;
pub use moderation_action::Entity as ModerationAction;
pub use rating::Entity as Rating;
pub use user::Entity as User;
