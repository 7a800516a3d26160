//! `balance_mutations`: ledger of applied mutations.
//!
//! The unique `(user_id, operation_ref)` index is what makes a replayed
//! operation reference a no-op instead of a second application.

use sea_orm_migration::prelude::*;

use crate::m20260301_000000_user_balances::UserBalances;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum BalanceMutations {
    Table,
    Id,
    UserId,
    OperationRef,
    AmountMinor,
    AppliedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BalanceMutations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceMutations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BalanceMutations::UserId).string().not_null())
                    .col(
                        ColumnDef::new(BalanceMutations::OperationRef)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceMutations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceMutations::AppliedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_mutations-user_id")
                            .from(BalanceMutations::Table, BalanceMutations::UserId)
                            .to(UserBalances::Table, UserBalances::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-balance_mutations-user_id-operation_ref")
                    .table(BalanceMutations::Table)
                    .col(BalanceMutations::UserId)
                    .col(BalanceMutations::OperationRef)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-balance_mutations-user_id-operation_ref")
                    .table(BalanceMutations::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(BalanceMutations::Table).to_owned())
            .await
    }
}
