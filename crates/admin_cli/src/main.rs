use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Applied, BalanceCmd, Engine, EngineError, Money, Registration};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the ledger (users, balances, migrations)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Balance(Balance),
    /// Apply pending migrations and exit.
    Migrate,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Register(UserArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    #[arg(long)]
    guid: String,
}

#[derive(Args, Debug)]
struct Balance {
    #[command(subcommand)]
    command: BalanceCommand,
}

#[derive(Subcommand, Debug)]
enum BalanceCommand {
    Credit(MutationArgs),
    Debit(MutationArgs),
    Show(UserArgs),
}

#[derive(Args, Debug)]
struct MutationArgs {
    #[arg(long)]
    guid: String,
    /// Idempotency key; replaying it with the same amount changes nothing.
    #[arg(long = "ref")]
    operation_ref: String,
    /// Decimal amount with at most two fractional digits, e.g. `10.50`.
    #[arg(long, value_parser = parse_amount)]
    amount: Money,
}

fn parse_amount(raw: &str) -> Result<Money, String> {
    Money::parse_amount(raw).map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn report(applied: Applied, guid: &str, balance: Money) {
    match applied {
        Applied::Committed => println!("applied; balance of {guid} is {balance}"),
        Applied::Replayed => println!("already applied; balance of {guid} is {balance}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    let result = match cli.command {
        Command::Migrate => {
            println!("migrations applied");
            Ok(())
        }
        Command::User(User {
            command: UserCommand::Register(args),
        }) => engine
            .insert_user(&args.guid)
            .await
            .map(|(guid, registration)| match registration {
                Registration::Created => println!("registered user: {guid}"),
                Registration::AlreadyRegistered => println!("user already registered: {guid}"),
            }),
        Command::Balance(Balance { command }) => run_balance(&engine, command).await,
    };

    if let Err(err) = result {
        eprintln!("{err}");
        let code = match err {
            EngineError::Database(_) => 1,
            _ => 2,
        };
        std::process::exit(code);
    }

    Ok(())
}

async fn run_balance(engine: &Engine, command: BalanceCommand) -> Result<(), EngineError> {
    match command {
        BalanceCommand::Credit(args) => {
            let cmd = BalanceCmd::new(args.guid.clone(), args.operation_ref, args.amount);
            let applied = engine.increase_balance(cmd).await?;
            let balance = engine.user_balance(&args.guid).await?;
            report(applied, &args.guid, balance.balance);
        }
        BalanceCommand::Debit(args) => {
            let cmd = BalanceCmd::new(args.guid.clone(), args.operation_ref, args.amount);
            let applied = engine.reduce_balance(cmd).await?;
            let balance = engine.user_balance(&args.guid).await?;
            report(applied, &args.guid, balance.balance);
        }
        BalanceCommand::Show(args) => {
            let balance = engine.user_balance(&args.guid).await?;
            println!("{} {}", balance.user_id, balance.balance);
        }
    }
    Ok(())
}
