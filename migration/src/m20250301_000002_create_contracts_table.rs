use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contracts` table and its columns.
#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
    JobId,
    ContractorId,
    ContractorName,
    Location,
    WorkerId,
    EnrolledWorkers,
    DailyWage,
    NumberOfDays,
    WorkersRequired,
    WorkersEnrolled,
    WorkHoursPerDay,
    OvertimeRatePerHour,
    MinimumWageAlert,
    TotalContractAmount,
    ContractorAcceptedAt,
    WorkerAcceptedAt,
    Status,
    CreatedAt,
    PostedAt,
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
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contracts::JobId).string().not_null())
                    .col(ColumnDef::new(Contracts::ContractorId).string().not_null())
                    .col(ColumnDef::new(Contracts::ContractorName).string().not_null())
                    .col(ColumnDef::new(Contracts::Location).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkerId).string().null())
                    .col(
                        ColumnDef::new(Contracts::EnrolledWorkers)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contracts::DailyWage).double().not_null())
                    .col(ColumnDef::new(Contracts::NumberOfDays).integer().not_null())
                    .col(
                        ColumnDef::new(Contracts::WorkersRequired)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Contracts::WorkersEnrolled)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Contracts::WorkHoursPerDay).double().not_null())
                    .col(
                        ColumnDef::new(Contracts::OvertimeRatePerHour)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::MinimumWageAlert)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Contracts::TotalContractAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::ContractorAcceptedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::WorkerAcceptedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Contracts::Status).string().not_null())
                    .col(
                        ColumnDef::new(Contracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::PostedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_created_at")
                    .table(Contracts::Table)
                    .col(Contracts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Marketplace filters on open contracts
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_status")
                    .table(Contracts::Table)
                    .col(Contracts::Status)
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
