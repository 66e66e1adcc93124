//! Integration tests for the invoice payment engine.
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
    entities::{
        sea_orm_active_enums::{
            AccountKind, InvoiceKind, InvoiceStatus, PaymentMethod, ThirdPartyKind,
        },
        third_parties,
    },
    migration::Migrator,
    repositories::{
        account::{AccountRepository, CreateAccountInput},
        invoice::{
            AddPaymentInput, CreateInvoiceInput, InvoiceError, InvoiceLineInput, InvoiceRepository,
        },
    },
};
use tresora_core::invoice::PaymentError;

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

async fn create_third_party(db: &DatabaseConnection) -> Uuid {
    use sea_orm::{ActiveModelTrait, ActiveValue::Set};

    let now = chrono::Utc::now().into();
    let party = third_parties::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Test Client {}", Uuid::new_v4())),
        kind: Set(ThirdPartyKind::Client),
        email: Set(None),
        phone: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create third party");
    party.id
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// One line {qty 2, unit 100, tax 20%, no discount}: subtotal 200, tax 40,
/// total 240.
async fn create_test_invoice(db: &DatabaseConnection, third_party_id: Uuid) -> Uuid {
    let repo = InvoiceRepository::new(db.clone());
    let details = repo
        .create_invoice(CreateInvoiceInput {
            kind: InvoiceKind::ClientReceivable,
            third_party_id,
            invoice_number: format!("INV-{}", Uuid::new_v4()),
            issue_date: date(2026, 8, 1),
            due_date: date(2026, 9, 1),
            notes: None,
            lines: vec![InvoiceLineInput {
                designation: "Consulting".to_string(),
                quantity: dec!(2),
                unit_price: dec!(100),
                tax_rate: dec!(20),
                discount: Decimal::ZERO,
            }],
        })
        .await
        .expect("Failed to create invoice");

    assert_eq!(details.invoice.subtotal, dec!(200));
    assert_eq!(details.invoice.tax_amount, dec!(40));
    assert_eq!(details.invoice.total_amount, dec!(240));
    details.invoice.id
}

fn payment(account_id: Uuid, amount: Decimal) -> AddPaymentInput {
    AddPaymentInput {
        account_id,
        amount,
        payment_date: date(2026, 8, 15),
        method: PaymentMethod::BankTransfer,
    }
}

#[tokio::test]
async fn test_overpayment_rejected_and_state_unchanged() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let account_id = create_account(&db).await;
    let third_party_id = create_third_party(&db).await;
    let invoice_id = create_test_invoice(&db, third_party_id).await;

    let accounts = AccountRepository::new(db.clone());
    let invoices = InvoiceRepository::new(db.clone());

    let result = invoices
        .add_payment(invoice_id, payment(account_id, dec!(500)))
        .await;
    assert!(matches!(
        result,
        Err(InvoiceError::Payment(PaymentError::ExceedsRemaining { .. }))
    ));

    // The rejected payment must leave the whole unit untouched.
    let balance = accounts.get_balance(account_id).await.unwrap();
    assert_eq!(balance, Decimal::ZERO);

    let details = invoices.get_invoice(invoice_id).await.unwrap();
    assert_eq!(details.invoice.amount_paid, Decimal::ZERO);
    assert_eq!(details.invoice.status, InvoiceStatus::Draft);
    assert!(details.payments.is_empty());
}

#[tokio::test]
async fn test_partial_then_full_payment() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let account_id = create_account(&db).await;
    let third_party_id = create_third_party(&db).await;
    let invoice_id = create_test_invoice(&db, third_party_id).await;

    let accounts = AccountRepository::new(db.clone());
    let invoices = InvoiceRepository::new(db.clone());

    let first = invoices
        .add_payment(invoice_id, payment(account_id, dec!(150)))
        .await
        .expect("First payment should succeed");
    assert_eq!(first.payment.amount, dec!(150));
    assert_eq!(first.transaction.amount, dec!(150));

    let details = invoices.get_invoice(invoice_id).await.unwrap();
    assert_eq!(details.invoice.amount_paid, dec!(150));
    assert_eq!(details.invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(
        accounts.get_balance(account_id).await.unwrap(),
        dec!(150)
    );

    invoices
        .add_payment(invoice_id, payment(account_id, dec!(90)))
        .await
        .expect("Second payment should succeed");

    let details = invoices.get_invoice(invoice_id).await.unwrap();
    assert_eq!(details.invoice.amount_paid, dec!(240));
    assert_eq!(details.invoice.status, InvoiceStatus::Paid);
    assert_eq!(
        accounts.get_balance(account_id).await.unwrap(),
        dec!(240)
    );

    // Fully paid: even one cent more is rejected.
    let result = invoices
        .add_payment(invoice_id, payment(account_id, dec!(1)))
        .await;
    assert!(matches!(
        result,
        Err(InvoiceError::Payment(PaymentError::ExceedsRemaining { .. }))
    ));
}

#[tokio::test]
async fn test_paid_invoice_cannot_be_deleted() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping live-database test");
        return;
    };

    let account_id = create_account(&db).await;
    let third_party_id = create_third_party(&db).await;
    let invoice_id = create_test_invoice(&db, third_party_id).await;

    let invoices = InvoiceRepository::new(db.clone());
    invoices
        .add_payment(invoice_id, payment(account_id, dec!(240)))
        .await
        .expect("Payment should succeed");

    let result = invoices.delete_invoice(invoice_id).await;
    assert!(matches!(result, Err(InvoiceError::HasPayments)));
}
