//! Study session (meeting) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Scheduled study session for a group.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meeting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Group the session belongs to.
    #[sea_orm(indexed)]
    pub group_id: String,

    /// User who scheduled the session.
    pub organizer_id: String,

    /// Session title.
    pub title: String,

    /// Agenda / topics to cover (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub agenda: Option<String>,

    /// Where the session takes place - a room or a call link (optional).
    #[sea_orm(nullable)]
    pub location: Option<String>,

    /// When the session starts.
    pub starts_at: DateTimeWithTimeZone,

    /// Planned duration in minutes.
    pub duration_minutes: i32,

    /// When the session was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Organizer,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
