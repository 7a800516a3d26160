pub use sea_orm_migration::prelude::*;

mod m20260301_000000_user_balances;
mod m20260301_000001_balance_mutations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000000_user_balances::Migration),
            Box::new(m20260301_000001_balance_mutations::Migration),
        ]
    }
}
