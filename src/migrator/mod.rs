use sea_orm_migration::prelude::*;

mod m20260601_000001_create_households_users;
mod m20260601_000002_create_scenario_themes;
mod m20260601_000003_create_crisis_events;
mod m20260601_000004_create_crisis_event_changes;
mod m20260601_000005_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_households_users::Migration),
            Box::new(m20260601_000002_create_scenario_themes::Migration),
            Box::new(m20260601_000003_create_crisis_events::Migration),
            Box::new(m20260601_000004_create_crisis_event_changes::Migration),
            Box::new(m20260601_000005_create_notifications::Migration),
        ]
    }
}
