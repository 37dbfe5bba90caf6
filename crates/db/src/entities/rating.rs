//! Group rating entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rating submitted by a member for a group and its leader.
///
/// One row per (group, rater); re-rating updates the row in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The rated group.
    #[sea_orm(indexed)]
    pub group_id: String,

    /// The member who submitted the rating.
    #[sea_orm(indexed)]
    pub rater_id: String,

    /// Score for the group itself, 1-5.
    pub group_score: i16,

    /// Score for the group leader, 1-5.
    pub leader_score: i16,

    /// Free-form comment (optional).
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,

    /// When the rating was first submitted.
    pub created_at: DateTimeWithTimeZone,

    /// When the rating was last changed.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Average of the two component scores.
    ///
    /// Rounded to one decimal for display elsewhere; karma thresholds
    /// compare the raw value.
    #[must_use]
    pub fn average(&self) -> f32 {
        f32::from(self.group_score + self.leader_score) / 2.0
    }
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
        from = "Column::RaterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Rater,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
