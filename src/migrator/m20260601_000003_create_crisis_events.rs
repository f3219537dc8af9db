use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CrisisEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrisisEvents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CrisisEvents::Name).string().not_null())
                    .col(ColumnDef::new(CrisisEvents::Description).text())
                    .col(
                        ColumnDef::new(CrisisEvents::Severity)
                            .string_len(10)
                            .default("green")
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEvents::EpicenterLatitude)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEvents::EpicenterLongitude)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CrisisEvents::Radius).double())
                    .col(
                        ColumnDef::new(CrisisEvents::StartTime)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEvents::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEvents::CreatedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEvents::Active)
                            .boolean()
                            .default(true)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CrisisEvents::ScenarioThemeId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crisis_events_created_by_user")
                            .from(CrisisEvents::Table, CrisisEvents::CreatedByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crisis_events_scenario_theme")
                            .from(CrisisEvents::Table, CrisisEvents::ScenarioThemeId)
                            .to(ScenarioThemes::Table, ScenarioThemes::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crisis_events_active")
                    .table(CrisisEvents::Table)
                    .col(CrisisEvents::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CrisisEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CrisisEvents {
    Table,
    Id,
    Name,
    Description,
    Severity,
    EpicenterLatitude,
    EpicenterLongitude,
    Radius,
    StartTime,
    UpdatedAt,
    CreatedByUserId,
    Active,
    ScenarioThemeId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ScenarioThemes {
    Table,
    Id,
}
