//! Migration adding review columns to `withdrawals`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Withdrawals::Table)
                    .add_column(ColumnDef::new(Withdrawals::ValidatedBy).uuid().null())
                    .add_column(
                        ColumnDef::new(Withdrawals::ValidatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .add_column(
                        ColumnDef::new(Withdrawals::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .add_column(ColumnDef::new(Withdrawals::RejectionReason).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_withdrawals_validated_by")
                    .from(Withdrawals::Table, Withdrawals::ValidatedBy)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_withdrawals_validated_by")
                    .table(Withdrawals::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Withdrawals::Table)
                    .drop_column(Withdrawals::ValidatedBy)
                    .drop_column(Withdrawals::ValidatedAt)
                    .drop_column(Withdrawals::PaidAt)
                    .drop_column(Withdrawals::RejectionReason)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Withdrawals {
    Table,
    ValidatedBy,
    ValidatedAt,
    PaidAt,
    RejectionReason,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
