use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A notification constructed by the crisis core and handed to the dispatcher.
/// Lifecycle: created -> sent (`sent_at` stamped) -> optionally read
/// (`read_at` stamped by the recipient).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i32,
    pub preference_type: PreferenceType,
    pub target_type: Option<TargetType>,
    pub target_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub notify_at: DateTime,
    pub sent_at: Option<DateTime>,
    pub read_at: Option<DateTime>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum PreferenceType {
    #[sea_orm(string_value = "crisis_alert")]
    CrisisAlert,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[sea_orm(string_value = "event")]
    Event,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
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
