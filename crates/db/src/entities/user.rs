//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Access token for API requests
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Display name
    #[sea_orm(nullable)]
    pub name: Option<String>,

    /// Field of study / course, shown on the profile
    #[sea_orm(nullable)]
    pub study_field: Option<String>,

    /// Reputation score. Floor is 0, no ceiling.
    /// Mutated only through the karma ledger.
    #[sea_orm(default_value = 0)]
    pub karma_points: i32,

    /// Moderation strikes. The third warning converts to a ban.
    #[sea_orm(default_value = 0)]
    pub warnings: i32,

    /// Is this account banned?
    #[sea_orm(default_value = false)]
    pub is_banned: bool,

    /// End of the current suspension. A user is suspended iff this is
    /// in the future; expiry is observed at read time.
    #[sea_orm(nullable)]
    pub suspended_until: Option<DateTimeWithTimeZone>,

    /// Is this user a platform admin?
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Is this user a platform moderator?
    #[sea_orm(default_value = false)]
    pub is_moderator: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_member::Entity")]
    Memberships,

    #[sea_orm(has_many = "super::moderation_action::Entity")]
    ModerationActions,
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::moderation_action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModerationActions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
