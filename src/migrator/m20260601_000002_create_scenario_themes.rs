use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScenarioThemes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScenarioThemes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScenarioThemes::Name).string().not_null())
                    .col(ColumnDef::new(ScenarioThemes::Description).text())
                    .col(
                        ColumnDef::new(ScenarioThemes::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScenarioThemes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScenarioThemes {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}
