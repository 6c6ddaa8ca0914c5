use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One counter row per numbering prefix, e.g. `CT-2025`.
#[derive(DeriveIden)]
enum ContractSequences {
    Table,
    Prefix,
    LastValue,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContractSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractSequences::Prefix)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContractSequences::LastValue)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractSequences::Table).to_owned())
            .await
    }
}
