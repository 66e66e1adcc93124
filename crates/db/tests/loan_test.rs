//! Integration tests for the asset loan engine.
//!
//! These run against a live Postgres database. Set `DATABASE_URL` (or
//! `TRESORA__DATABASE__URL`) to enable them; without it each test skips.

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::env;
use uuid::Uuid;

use tresora_core::asset::{LOCATION_IN_STOCK, is_loan_marker};
use tresora_db::{
    entities::{
        sea_orm_active_enums::{AssetStatus, LoanStatus},
        users,
    },
    migration::Migrator,
    repositories::{
        asset::{AssetRepository, CreateAssetInput, UpdateAssetInput},
        loan::{IssueLoanInput, LoanError, LoanRepository},
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

async fn create_user(db: &DatabaseConnection) -> Uuid {
    use sea_orm::{ActiveModelTrait, ActiveValue::Set};

    let now = chrono::Utc::now().into();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set("Test Borrower".to_string()),
        email: Set(format!("borrower-{}@example.com", Uuid::new_v4())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create user");
    user.id
}

async fn create_loanable_asset(db: &DatabaseConnection) -> Uuid {
    let repo = AssetRepository::new(db.clone());
    let asset = repo
        .create_asset(CreateAssetInput {
            name: format!("Laptop {}", Uuid::new_v4()),
            serial_number: None,
            status: AssetStatus::InService,
            location: LOCATION_IN_STOCK.to_string(),
            account_id: None,
            acquisition_cost: None,
            acquisition_date: None,
        })
        .await
        .expect("Failed to create asset");
    asset.id
}

fn issue(asset_id: Uuid, user_id: Uuid) -> IssueLoanInput {
    IssueLoanInput {
        asset_id,
        user_id,
        loan_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        due_date: None,
        signature: None,
    }
}

#[tokio::test]
async fn test_issue_marks_asset_and_blocks_second_loan() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let asset_id = create_loanable_asset(&db).await;
    let borrower = create_user(&db).await;
    let other_borrower = create_user(&db).await;

    let assets = AssetRepository::new(db.clone());
    let loans = LoanRepository::new(db.clone());

    let loan = loans
        .issue_loan(issue(asset_id, borrower))
        .await
        .expect("Issue should succeed");
    assert_eq!(loan.status, LoanStatus::Ongoing);

    let asset = assets.get_asset(asset_id).await.unwrap();
    assert!(is_loan_marker(&asset.location));
    assert_eq!(asset.status, AssetStatus::InService);

    // One ongoing loan per asset: the marker blocks a second issue.
    let result = loans.issue_loan(issue(asset_id, other_borrower)).await;
    assert!(matches!(result, Err(LoanError::AssetNotAvailable)));
}

#[tokio::test]
async fn test_return_restores_status_and_location() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let asset_id = create_loanable_asset(&db).await;
    let borrower = create_user(&db).await;

    let assets = AssetRepository::new(db.clone());
    let loans = LoanRepository::new(db.clone());

    let loan = loans
        .issue_loan(issue(asset_id, borrower))
        .await
        .expect("Issue should succeed");

    // A status edit made while the asset is out must not survive the
    // return: the round trip ends at in_service/in_stock exactly.
    assets
        .update_asset(
            asset_id,
            UpdateAssetInput {
                status: Some(AssetStatus::Maintenance),
                ..Default::default()
            },
        )
        .await
        .expect("Status update should succeed");

    let returned = loans
        .return_loan(loan.id, Some(NaiveDate::from_ymd_opt(2026, 8, 20).unwrap()))
        .await
        .expect("Return should succeed");
    assert_eq!(returned.status, LoanStatus::Completed);
    assert_eq!(
        returned.return_date,
        Some(NaiveDate::from_ymd_opt(2026, 8, 20).unwrap())
    );

    let asset = assets.get_asset(asset_id).await.unwrap();
    assert_eq!(asset.status, AssetStatus::InService);
    assert_eq!(asset.location, LOCATION_IN_STOCK);

    // Completed loans cannot be returned again.
    let result = loans.return_loan(loan.id, None).await;
    assert!(matches!(result, Err(LoanError::AlreadyReturned)));

    // And the asset is loanable again.
    loans
        .issue_loan(issue(asset_id, borrower))
        .await
        .expect("Re-issue after return should succeed");
}

#[tokio::test]
async fn test_delete_ongoing_loan_restores_asset() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let asset_id = create_loanable_asset(&db).await;
    let borrower = create_user(&db).await;

    let assets = AssetRepository::new(db.clone());
    let loans = LoanRepository::new(db.clone());

    let loan = loans
        .issue_loan(issue(asset_id, borrower))
        .await
        .expect("Issue should succeed");

    loans.delete_loan(loan.id).await.expect("Delete should succeed");

    let asset = assets.get_asset(asset_id).await.unwrap();
    assert_eq!(asset.status, AssetStatus::InService);
    assert_eq!(asset.location, LOCATION_IN_STOCK);
    assert!(matches!(
        loans.get_loan(loan.id).await,
        Err(LoanError::NotFound(_))
    ));
}
