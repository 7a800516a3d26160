//! `user_balances`: one row per registered user identity.
//!
//! The balance is stored as an integer number of minor units and is never
//! allowed below zero, also at the database level.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum UserBalances {
    Table,
    UserId,
    BalanceMinor,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserBalances::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserBalances::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(UserBalances::BalanceMinor).gte(0)),
                    )
                    .col(
                        ColumnDef::new(UserBalances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBalances::Table).to_owned())
            .await
    }
}
