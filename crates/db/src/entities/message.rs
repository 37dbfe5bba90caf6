//! Group chat message entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chat message posted in a study group.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Group the message was posted in.
    #[sea_orm(indexed)]
    pub group_id: String,

    /// Author of the message.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Message text.
    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// URL of an attached file, if any. Upload handling lives elsewhere;
    /// this stores only the reference.
    #[sea_orm(nullable)]
    pub attachment_url: Option<String>,

    /// When the message was posted.
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
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
