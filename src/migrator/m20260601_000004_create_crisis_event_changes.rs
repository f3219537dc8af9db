use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CrisisEventChanges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrisisEventChanges::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CrisisEventChanges::CrisisEventId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEventChanges::ChangeType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CrisisEventChanges::OldValue).text())
                    .col(ColumnDef::new(CrisisEventChanges::NewValue).text())
                    .col(
                        ColumnDef::new(CrisisEventChanges::CreatedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CrisisEventChanges::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crisis_event_changes_event")
                            .from(
                                CrisisEventChanges::Table,
                                CrisisEventChanges::CrisisEventId,
                            )
                            .to(CrisisEvents::Table, CrisisEvents::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crisis_event_changes_user")
                            .from(
                                CrisisEventChanges::Table,
                                CrisisEventChanges::CreatedByUserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Change history is always read newest-first for one event.
        manager
            .create_index(
                Index::create()
                    .name("idx_crisis_event_changes_event_created")
                    .table(CrisisEventChanges::Table)
                    .col(CrisisEventChanges::CrisisEventId)
                    .col(CrisisEventChanges::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CrisisEventChanges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CrisisEventChanges {
    Table,
    Id,
    CrisisEventId,
    ChangeType,
    OldValue,
    NewValue,
    CreatedByUserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CrisisEvents {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
