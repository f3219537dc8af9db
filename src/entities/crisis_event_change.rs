use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable audit row describing a single field-level mutation of a
/// crisis event. Append-only; rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "crisis_event_changes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub crisis_event_id: i32,
    pub change_type: ChangeType,
    #[sea_orm(column_type = "Text", nullable)]
    pub old_value: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub new_value: Option<String>,
    pub created_by_user_id: i32,
    pub created_at: DateTime,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    #[sea_orm(string_value = "creation")]
    Creation,
    #[sea_orm(string_value = "description_update")]
    DescriptionUpdate,
    #[sea_orm(string_value = "level_change")]
    LevelChange,
    #[sea_orm(string_value = "epicenter_moved")]
    EpicenterMoved,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::crisis_event::Entity",
        from = "Column::CrisisEventId",
        to = "super::crisis_event::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    CrisisEvent,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedByUserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    CreatedByUser,
}

impl Related<super::crisis_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrisisEvent.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedByUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
