use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contracts {
    Table,
    EventDate,
    Status,
    ClientId,
    IsActive,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Conflict checks read every booking on a date
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_event_date_active")
                    .table(Contracts::Table)
                    .col(Contracts::EventDate)
                    .col(Contracts::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_status")
                    .table(Contracts::Table)
                    .col(Contracts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_client_id")
                    .table(Contracts::Table)
                    .col(Contracts::ClientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_contracts_client_id",
            "idx_contracts_status",
            "idx_contracts_event_date_active",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Contracts::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}
