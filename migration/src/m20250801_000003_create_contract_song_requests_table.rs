use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ContractSongRequests {
    Table,
    ContractId,
    SongRequestId,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SongRequests {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContractSongRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractSongRequests::ContractId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractSongRequests::SongRequestId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ContractSongRequests::ContractId)
                            .col(ContractSongRequests::SongRequestId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_song_requests_contract_id")
                            .from(ContractSongRequests::Table, ContractSongRequests::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_song_requests_song_request_id")
                            .from(
                                ContractSongRequests::Table,
                                ContractSongRequests::SongRequestId,
                            )
                            .to(SongRequests::Table, SongRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractSongRequests::Table).to_owned())
            .await
    }
}
