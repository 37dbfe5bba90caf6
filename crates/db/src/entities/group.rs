//! Study group entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group join policy type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum GroupJoinPolicy {
    /// Anyone can join without approval.
    #[sea_orm(string_value = "open")]
    Open,
    /// Users request to join, the leader approves.
    #[sea_orm(string_value = "approval")]
    Approval,
}

impl Default for GroupJoinPolicy {
    fn default() -> Self {
        Self::Open
    }
}

/// Study group entity - a group of students working on a subject together.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User who leads the group.
    #[sea_orm(indexed)]
    pub leader_id: String,

    /// Group name.
    pub name: String,

    /// Subject or course the group studies (optional).
    #[sea_orm(nullable)]
    pub subject: Option<String>,

    /// Group description (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Join policy for the group.
    pub join_policy: GroupJoinPolicy,

    /// Whether the group is archived (soft deleted by moderation).
    #[sea_orm(default_value = false)]
    pub is_archived: bool,

    /// Number of active members (denormalized).
    #[sea_orm(default_value = 1)]
    pub members_count: i64,

    /// When the group was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the group was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LeaderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Leader,
    #[sea_orm(has_many = "super::group_member::Entity")]
    Members,
    #[sea_orm(has_many = "super::message::Entity")]
    Messages,
    #[sea_orm(has_many = "super::meeting::Entity")]
    Meetings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leader.def()
    }
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
