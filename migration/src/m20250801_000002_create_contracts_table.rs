use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contracts` table and its columns.
#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
    ContractNumber,
    Status,
    Title,
    EventType,
    CelebrantName,
    Notes,
    EventDate,
    StartTime,
    EndTime,
    TotalMinutes,
    BreakCount,
    BreakMinutes,
    BreakDescription,
    VenueName,
    VenueDescription,
    GoogleMapsUrl,
    HourlyRate,
    AdvancePayment,
    ExtraCost,
    TotalPayment,
    RemainingPayment,
    PercentagePaid,
    ClientId,
    AudienceSize,
    AudioEquipmentId,
    CateringId,
    IsActive,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AudioEquipment {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Catering {
    Table,
    Id,
}

fn money(column: Contracts) -> ColumnDef {
    ColumnDef::new(column)
        .decimal_len(10, 2)
        .not_null()
        .default(0)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contracts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // The unique index is the last line of defence against
                    // two writers issuing the same number.
                    .col(
                        ColumnDef::new(Contracts::ContractNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Contracts::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Contracts::Title).string().not_null())
                    .col(ColumnDef::new(Contracts::EventType).string().not_null())
                    .col(
                        ColumnDef::new(Contracts::CelebrantName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Contracts::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Contracts::EventDate).date().not_null())
                    .col(ColumnDef::new(Contracts::StartTime).time().not_null())
                    .col(ColumnDef::new(Contracts::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(Contracts::TotalMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Contracts::BreakCount).integer().null())
                    .col(ColumnDef::new(Contracts::BreakMinutes).integer().null())
                    .col(
                        ColumnDef::new(Contracts::BreakDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Contracts::VenueName).string().not_null())
                    .col(
                        ColumnDef::new(Contracts::VenueDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Contracts::GoogleMapsUrl).string().null())
                    .col(money(Contracts::HourlyRate))
                    .col(money(Contracts::AdvancePayment))
                    .col(money(Contracts::ExtraCost))
                    .col(money(Contracts::TotalPayment))
                    .col(money(Contracts::RemainingPayment))
                    .col(
                        ColumnDef::new(Contracts::PercentagePaid)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Contracts::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Contracts::AudienceSize).integer().not_null())
                    .col(ColumnDef::new(Contracts::AudioEquipmentId).uuid().null())
                    .col(ColumnDef::new(Contracts::CateringId).uuid().null())
                    .col(
                        ColumnDef::new(Contracts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Contracts::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_client_id")
                            .from(Contracts::Table, Contracts::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_audio_equipment_id")
                            .from(Contracts::Table, Contracts::AudioEquipmentId)
                            .to(AudioEquipment::Table, AudioEquipment::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_catering_id")
                            .from(Contracts::Table, Contracts::CateringId)
                            .to(Catering::Table, Catering::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}
