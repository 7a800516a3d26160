use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;

use migration::Migrator;

const DEFAULT_DATABASE_URL: &str = "sqlite:./ledger.db?mode=rwc";

async fn run(command: &str, db: &DatabaseConnection) -> Result<bool, DbErr> {
    match command {
        "up" => Migrator::up(db, None).await?,
        "down" => Migrator::down(db, Some(1)).await?,
        "refresh" => Migrator::refresh(db).await?,
        "status" => Migrator::status(db).await?,
        _ => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let db = Database::connect(&url).await?;
    if !run(&command, &db).await? {
        eprintln!("usage: migration [up|down|refresh|status]  (DATABASE_URL={url})");
        std::process::exit(2);
    }

    Ok(())
}
