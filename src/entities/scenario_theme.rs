use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "scenario_themes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::crisis_event::Entity")]
    CrisisEvents,
}

impl Related<super::crisis_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrisisEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
