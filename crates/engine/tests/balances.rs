use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Applied, BalanceCmd, Engine, EngineError, Money, Registration};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    (engine, path)
}

fn money(raw: &str) -> Money {
    raw.parse().unwrap()
}

fn cmd(user: &str, operation_ref: &str, amount: &str) -> BalanceCmd {
    BalanceCmd::new(user, operation_ref, money(amount))
}

async fn balance_of(engine: &Engine, user: &str) -> Money {
    engine.user_balance(user).await.unwrap().balance
}

async fn mutation_count(db: &DatabaseConnection, user: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM balance_mutations WHERE user_id = ?",
            vec![user.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn unknown_user_reads_as_zero() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4();

    let balance = engine.user_balance(&user.to_string()).await.unwrap();
    assert_eq!(balance.user_id, user);
    assert_eq!(balance.balance, Money::ZERO);
}

#[tokio::test]
async fn credit_debit_walkthrough() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&user, "deposit-1", "10.00"))
        .await
        .unwrap();
    engine
        .increase_balance(cmd(&user, "deposit-2", "5.00"))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, &user).await, money("15.00"));

    let err = engine
        .reduce_balance(cmd(&user, "order-1", "20.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(balance_of(&engine, &user).await, money("15.00"));

    let applied = engine
        .reduce_balance(cmd(&user, "order-2", "15.00"))
        .await
        .unwrap();
    assert_eq!(applied, Applied::Committed);
    assert_eq!(balance_of(&engine, &user).await, Money::ZERO);
    assert_eq!(balance_of(&engine, &user).await.to_string(), "0.00");
}

#[tokio::test]
async fn increase_then_reduce_restores_balance() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&user, "seed", "3.33"))
        .await
        .unwrap();
    let before = balance_of(&engine, &user).await;

    for (i, amount) in ["0", "0.01", "0.10", "123.45", "99999.99"].iter().enumerate() {
        engine
            .increase_balance(cmd(&user, &format!("in-{i}"), amount))
            .await
            .unwrap();
        engine
            .reduce_balance(cmd(&user, &format!("out-{i}"), amount))
            .await
            .unwrap();
        assert_eq!(balance_of(&engine, &user).await, before);
    }
}

#[tokio::test]
async fn rejected_debit_on_unknown_user_registers_nothing() {
    let (engine, db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    let err = engine
        .reduce_balance(cmd(&user, "order-1", "0.01"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(mutation_count(&db, &user).await, 0);

    // The rolled back transaction did not leave a balance row behind.
    assert_eq!(
        engine.insert_user(&user).await.unwrap().1,
        Registration::Created
    );
}

#[tokio::test]
async fn zero_debit_on_unknown_user_registers_it() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .reduce_balance(cmd(&user, "noop", "0"))
        .await
        .unwrap();
    assert_eq!(
        engine.insert_user(&user).await.unwrap().1,
        Registration::AlreadyRegistered
    );
}

#[tokio::test]
async fn replayed_operation_ref_is_a_noop() {
    let (engine, db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    let first = engine
        .increase_balance(cmd(&user, "payment-42", "7.50"))
        .await
        .unwrap();
    let second = engine
        .increase_balance(cmd(&user, "payment-42", "7.50"))
        .await
        .unwrap();

    assert_eq!(first, Applied::Committed);
    assert_eq!(second, Applied::Replayed);
    assert_eq!(balance_of(&engine, &user).await, money("7.50"));
    assert_eq!(mutation_count(&db, &user).await, 1);
}

#[tokio::test]
async fn operation_ref_reused_with_other_amount_conflicts() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&user, "payment-42", "7.50"))
        .await
        .unwrap();

    let err = engine
        .increase_balance(cmd(&user, "payment-42", "8.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Same magnitude, opposite direction: still a different mutation.
    let err = engine
        .reduce_balance(cmd(&user, "payment-42", "7.50"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    assert_eq!(balance_of(&engine, &user).await, money("7.50"));
}

#[tokio::test]
async fn operation_refs_are_scoped_per_user() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4().to_string();
    let bob = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&alice, "shared-ref", "1.00"))
        .await
        .unwrap();
    let applied = engine
        .increase_balance(cmd(&bob, "shared-ref", "2.00"))
        .await
        .unwrap();

    assert_eq!(applied, Applied::Committed);
    assert_eq!(balance_of(&engine, &bob).await, money("2.00"));
}

#[tokio::test]
async fn failed_debit_reference_can_be_retried() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .reduce_balance(cmd(&user, "order-1", "5.00"))
        .await
        .unwrap_err();
    engine
        .increase_balance(cmd(&user, "topup", "5.00"))
        .await
        .unwrap();

    let applied = engine
        .reduce_balance(cmd(&user, "order-1", "5.00"))
        .await
        .unwrap();
    assert_eq!(applied, Applied::Committed);
    assert_eq!(balance_of(&engine, &user).await, Money::ZERO);
}

#[tokio::test]
async fn credit_past_max_balance_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(BalanceCmd::new(&user, "big", Money::MAX))
        .await
        .unwrap();
    let err = engine
        .increase_balance(cmd(&user, "one-more", "0.01"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::MaxBalanceReached(_)));
    assert_eq!(balance_of(&engine, &user).await, Money::MAX);
}

#[tokio::test]
async fn malformed_input_is_a_validation_error() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    let err = engine
        .increase_balance(cmd("not-a-uuid", "ref", "1.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidId(_)));

    let err = engine
        .reduce_balance(cmd(&user, "   ", "1.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperationRef(_)));

    let err = engine
        .increase_balance(cmd(&user, "ref", "-1.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(err.is_validation());

    assert!(matches!(
        engine.user_balance("42").await.unwrap_err(),
        EngineError::InvalidId(_)
    ));
    assert!(matches!(
        engine.insert_user("").await.unwrap_err(),
        EngineError::InvalidId(_)
    ));
}

#[tokio::test]
async fn register_is_idempotent_and_keeps_balance() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    assert_eq!(
        engine.insert_user(&user).await.unwrap().1,
        Registration::Created
    );
    assert_eq!(balance_of(&engine, &user).await, Money::ZERO);

    engine
        .increase_balance(cmd(&user, "deposit", "12.00"))
        .await
        .unwrap();
    assert_eq!(
        engine.insert_user(&user).await.unwrap().1,
        Registration::AlreadyRegistered
    );
    assert_eq!(balance_of(&engine, &user).await, money("12.00"));
}

#[tokio::test]
async fn register_returns_the_parsed_identity() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4();
    let raw = format!("  {}  ", user.to_string().to_uppercase());

    let (user_id, registration) = engine.insert_user(&raw).await.unwrap();
    assert_eq!(user_id, user);
    assert_eq!(registration, Registration::Created);
    assert_eq!(engine.user_balance(&user.to_string()).await.unwrap().user_id, user);
}

#[tokio::test]
async fn concurrent_debits_of_full_balance_commit_once() {
    let (engine, _db) = engine_with_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&user, "deposit", "10.00"))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        engine.reduce_balance(cmd(&user, "order-a", "10.00")),
        engine.reduce_balance(cmd(&user, "order-b", "10.00")),
    );

    let results = [a, b];
    let committed = results.iter().filter(|r| r.is_ok()).count();
    let insufficient = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::InsufficientFunds(_))))
        .count();
    assert_eq!(committed, 1);
    assert_eq!(insufficient, 1);
    assert_eq!(balance_of(&engine, &user).await, Money::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn balance_never_negative_under_concurrent_load_on_file_db() {
    let (engine, path) = engine_with_file_db().await;
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&user, "deposit", "10.00"))
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let engine = engine.clone();
        let user = user.clone();
        tasks.spawn(async move {
            engine
                .reduce_balance(cmd(&user, &format!("order-{i}"), "1.00"))
                .await
        });
    }

    let mut committed = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => committed += 1,
            Err(EngineError::InsufficientFunds(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(committed, 10);
    assert_eq!(balance_of(&engine, &user).await, Money::ZERO);

    let _ = std::fs::remove_file(path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_store_holds_the_floor_under_concurrency() {
    let engine = Engine::builder().in_memory().build().await.unwrap();
    let user = Uuid::new_v4().to_string();

    engine
        .increase_balance(cmd(&user, "deposit", "2.50"))
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..10 {
        let engine = engine.clone();
        let user = user.clone();
        tasks.spawn(async move {
            engine
                .reduce_balance(cmd(&user, &format!("order-{i}"), "0.50"))
                .await
        });
    }

    let mut committed = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap().is_ok() {
            committed += 1;
        }
    }

    assert_eq!(committed, 5);
    assert_eq!(balance_of(&engine, &user).await, Money::ZERO);
}

#[tokio::test]
async fn builder_without_store_fails() {
    let err = Engine::builder().build().await.unwrap_err();
    assert!(matches!(err, EngineError::Misconfigured(_)));
    assert!(!err.is_validation());
}
