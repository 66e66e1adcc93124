//! Integration tests for the transaction engine.
//!
//! These run against a live Postgres database. Set `DATABASE_URL` (or
//! `TRESORA__DATABASE__URL`) to enable them; without it each test skips.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::env;
use uuid::Uuid;

use tresora_db::{
    entities::sea_orm_active_enums::{AccountKind, TransactionKind},
    migration::Migrator,
    repositories::{
        account::{AccountRepository, CreateAccountInput},
        transaction::{
            CreateTransactionInput, TransactionError, TransactionRepository,
            UpdateTransactionInput,
        },
    },
};

static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

async fn connect() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL")
        .or_else(|_| env::var("TRESORA__DATABASE__URL"))
        .ok()?;

    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");

    // Tests in one binary run concurrently; migrate once.
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    Some(db)
}

async fn create_account(db: &DatabaseConnection) -> Uuid {
    let repo = AccountRepository::new(db.clone());
    let account = repo
        .create_account(CreateAccountInput {
            name: format!("Test Account {}", Uuid::new_v4()),
            kind: AccountKind::Bank,
            currency: "EUR".to_string(),
        })
        .await
        .expect("Failed to create account");
    account.id
}

fn expense(account_id: Uuid, amount: Decimal) -> CreateTransactionInput {
    CreateTransactionInput {
        account_id,
        category_id: None,
        kind: TransactionKind::Expense,
        amount,
        description: Some("Office supplies".to_string()),
        transaction_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
    }
}

#[tokio::test]
async fn test_expense_lifecycle_rebalances_account() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let account_id = create_account(&db).await;
    let accounts = AccountRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    // Seed the account with 1000 so the balances read naturally.
    accounts
        .apply_delta(account_id, dec!(1000))
        .await
        .expect("Failed to seed balance");

    let tx = transactions
        .create_transaction(expense(account_id, dec!(200)))
        .await
        .expect("Create should succeed");
    assert_eq!(
        accounts.get_balance(account_id).await.unwrap(),
        dec!(800)
    );

    // Editing the amount reverses the old effect before applying the new.
    transactions
        .update_transaction(
            tx.id,
            UpdateTransactionInput {
                amount: Some(dec!(300)),
                ..Default::default()
            },
        )
        .await
        .expect("Update should succeed");
    assert_eq!(
        accounts.get_balance(account_id).await.unwrap(),
        dec!(700)
    );

    // Deleting reverses the effect entirely.
    transactions
        .delete_transaction(tx.id)
        .await
        .expect("Delete should succeed");
    assert_eq!(
        accounts.get_balance(account_id).await.unwrap(),
        dec!(1000)
    );
}

#[tokio::test]
async fn test_moving_transaction_rebalances_both_accounts() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let first_id = create_account(&db).await;
    let second_id = create_account(&db).await;
    let accounts = AccountRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    let tx = transactions
        .create_transaction(expense(first_id, dec!(50)))
        .await
        .expect("Create should succeed");
    assert_eq!(
        accounts.get_balance(first_id).await.unwrap(),
        dec!(-50)
    );
    assert_eq!(
        accounts.get_balance(second_id).await.unwrap(),
        Decimal::ZERO
    );

    transactions
        .update_transaction(
            tx.id,
            UpdateTransactionInput {
                account_id: Some(second_id),
                ..Default::default()
            },
        )
        .await
        .expect("Move should succeed");

    // The old account is made whole; the new one carries the effect.
    assert_eq!(
        accounts.get_balance(first_id).await.unwrap(),
        Decimal::ZERO
    );
    assert_eq!(
        accounts.get_balance(second_id).await.unwrap(),
        dec!(-50)
    );
}

#[tokio::test]
async fn test_create_on_missing_account_rejected() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let transactions = TransactionRepository::new(db.clone());
    let result = transactions
        .create_transaction(expense(Uuid::new_v4(), dec!(10)))
        .await;
    assert!(matches!(result, Err(TransactionError::AccountNotFound(_))));
}
