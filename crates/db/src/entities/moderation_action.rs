//! Moderation action audit log entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of moderation action taken against a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ActionKind {
    #[sea_orm(string_value = "warn")]
    Warn,
    #[sea_orm(string_value = "suspend")]
    Suspend,
    #[sea_orm(string_value = "unsuspend")]
    Unsuspend,
    #[sea_orm(string_value = "ban")]
    Ban,
    #[sea_orm(string_value = "unban")]
    Unban,
}

/// Moderation action model - one row per sanction or reversal.
///
/// The `warnings` counter and score fields live on the user row; this
/// table is the audit trail.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "moderation_action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The sanctioned user.
    pub user_id: String,
    /// The moderator who acted.
    pub moderator_id: String,
    /// What was done.
    pub action: ActionKind,
    /// Reason given by the moderator.
    pub reason: Option<String>,
    /// Suspension length in days, for suspend actions.
    pub suspension_days: Option<i32>,
    /// Karma delta applied by this action (negative for penalties).
    pub karma_delta: i32,
    /// Whether this warning escalated into an automatic ban.
    pub auto_ban: bool,
    /// When the action was taken.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
