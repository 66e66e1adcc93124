//! Database seeder for Tresora development and testing.
//!
//! Seeds a demo user, categories, third parties, accounts, and a few
//! assets for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use tresora_db::entities::{
    accounts, assets, categories,
    sea_orm_active_enums::{AccountKind, AssetStatus, ThirdPartyKind, TransactionKind},
    third_parties, users,
};

/// Demo user ID (consistent for all seeds)
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tresora_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    seed_demo_user(&db).await;

    println!("Seeding categories...");
    seed_categories(&db).await;

    println!("Seeding third parties...");
    seed_third_parties(&db).await;

    println!("Seeding accounts...");
    seed_accounts(&db).await;

    println!("Seeding assets...");
    seed_assets(&db).await;

    println!("Seeding complete!");
}

fn demo_user_id() -> Uuid {
    Uuid::parse_str(DEMO_USER_ID).unwrap()
}

/// Seeds a demo user for loans.
async fn seed_demo_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(demo_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo user already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(demo_user_id()),
        full_name: Set("Demo User".to_string()),
        email: Set("demo@tresora.dev".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to seed demo user");
}

/// Seeds one revenue and a few expense categories.
async fn seed_categories(db: &DatabaseConnection) {
    let existing = categories::Entity::find()
        .all(db)
        .await
        .expect("Failed to query categories");
    if !existing.is_empty() {
        println!("  Categories already exist, skipping...");
        return;
    }

    let now = Utc::now().into();
    let seeds = [
        ("Sales", TransactionKind::Revenue),
        ("Rent", TransactionKind::Expense),
        ("Utilities", TransactionKind::Expense),
        ("Supplies", TransactionKind::Expense),
    ];

    for (name, kind) in seeds {
        let category = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            kind: Set(kind),
            created_at: Set(now),
            updated_at: Set(now),
        };
        category.insert(db).await.expect("Failed to seed category");
    }
}

/// Seeds a client and a supplier for invoicing.
async fn seed_third_parties(db: &DatabaseConnection) {
    let existing = third_parties::Entity::find()
        .all(db)
        .await
        .expect("Failed to query third parties");
    if !existing.is_empty() {
        println!("  Third parties already exist, skipping...");
        return;
    }

    let now = Utc::now().into();
    let seeds = [
        ("Acme Corp", ThirdPartyKind::Client, "billing@acme.test"),
        ("Office Supplies Ltd", ThirdPartyKind::Supplier, "sales@osl.test"),
    ];

    for (name, kind, email) in seeds {
        let third_party = third_parties::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            kind: Set(kind),
            email: Set(Some(email.to_string())),
            phone: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        third_party
            .insert(db)
            .await
            .expect("Failed to seed third party");
    }
}

/// Seeds a bank account and a cash box, both at zero.
async fn seed_accounts(db: &DatabaseConnection) {
    let existing = accounts::Entity::find()
        .all(db)
        .await
        .expect("Failed to query accounts");
    if !existing.is_empty() {
        println!("  Accounts already exist, skipping...");
        return;
    }

    let now = Utc::now().into();
    let seeds = [
        ("Main Bank", AccountKind::Bank),
        ("Cash Box", AccountKind::Cash),
    ];

    for (name, kind) in seeds {
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            kind: Set(kind),
            balance: Set(Decimal::ZERO),
            currency: Set("EUR".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        account.insert(db).await.expect("Failed to seed account");
    }
}

/// Seeds a couple of loanable assets.
async fn seed_assets(db: &DatabaseConnection) {
    let existing = assets::Entity::find()
        .all(db)
        .await
        .expect("Failed to query assets");
    if !existing.is_empty() {
        println!("  Assets already exist, skipping...");
        return;
    }

    let now = Utc::now().into();
    let seeds = [
        ("Laptop A", Some("SN-1001")),
        ("Projector", Some("SN-2040")),
    ];

    for (name, serial) in seeds {
        let asset = assets::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            serial_number: Set(serial.map(String::from)),
            status: Set(AssetStatus::InService),
            location: Set("in_stock".to_string()),
            account_id: Set(None),
            acquisition_cost: Set(None),
            acquisition_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        asset.insert(db).await.expect("Failed to seed asset");
    }
}
