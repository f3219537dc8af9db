use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "crisis_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub severity: Severity,
    pub epicenter_latitude: f64,
    pub epicenter_longitude: f64,
    /// Affected-zone radius in kilometers. None disables geo-targeting.
    pub radius: Option<f64>,
    /// Write-once: set at creation, never accepted by updates.
    pub start_time: DateTime,
    pub updated_at: DateTime,
    pub created_by_user_id: i32,
    pub active: bool,
    pub scenario_theme_id: Option<i32>,
}

/// Severity ladder for a crisis event: green < yellow < red.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[sea_orm(string_value = "green")]
    Green,
    #[sea_orm(string_value = "yellow")]
    Yellow,
    #[sea_orm(string_value = "red")]
    Red,
}

impl Severity {
    /// Numeric weight used for severity-descending sorts (red=3 .. green=1).
    pub fn weight(&self) -> i32 {
        match self {
            Severity::Red => 3,
            Severity::Yellow => 2,
            Severity::Green => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Red => "red",
            Severity::Yellow => "yellow",
            Severity::Green => "green",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedByUserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    CreatedByUser,
    #[sea_orm(
        belongs_to = "super::scenario_theme::Entity",
        from = "Column::ScenarioThemeId",
        to = "super::scenario_theme::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    ScenarioTheme,
    #[sea_orm(has_many = "super::crisis_event_change::Entity")]
    Changes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedByUser.def()
    }
}

impl Related<super::scenario_theme::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScenarioTheme.def()
    }
}

impl Related<super::crisis_event_change::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Changes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_weights_are_strictly_ordered() {
        assert!(Severity::Red.weight() > Severity::Yellow.weight());
        assert!(Severity::Yellow.weight() > Severity::Green.weight());
    }

    #[test]
    fn test_severity_descending_sort_is_red_first_green_last() {
        let mut severities = vec![
            Severity::Green,
            Severity::Red,
            Severity::Yellow,
            Severity::Green,
            Severity::Red,
        ];
        severities.sort_by_key(|s| std::cmp::Reverse(s.weight()));
        assert_eq!(
            severities,
            vec![
                Severity::Red,
                Severity::Red,
                Severity::Yellow,
                Severity::Green,
                Severity::Green,
            ]
        );
    }
}
