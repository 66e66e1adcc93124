//! Initial database migration.
//!
//! Creates all enums and tables for the Tresora back office.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE DATA
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(THIRD_PARTIES_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: INVOICING
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_LINES_SQL).await?;
        db.execute_unprepared(INVOICE_PAYMENTS_SQL).await?;

        // ============================================================
        // PART 5: ASSETS & LOANS
        // ============================================================
        db.execute_unprepared(ASSETS_SQL).await?;
        db.execute_unprepared(ASSET_LOANS_SQL).await?;

        // ============================================================
        // PART 6: RECURRING OPERATIONS
        // ============================================================
        db.execute_unprepared(RECURRING_OPERATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_kind AS ENUM ('bank', 'mobile_money', 'cash', 'other');

CREATE TYPE transaction_kind AS ENUM ('revenue', 'expense');

CREATE TYPE invoice_kind AS ENUM ('client_receivable', 'expense_payable');

CREATE TYPE invoice_status AS ENUM (
    'draft',
    'sent',
    'partially_paid',
    'paid',
    'overdue',
    'cancelled'
);

CREATE TYPE payment_method AS ENUM (
    'cash',
    'bank_transfer',
    'mobile_money',
    'cheque',
    'card'
);

CREATE TYPE asset_status AS ENUM ('new', 'in_service', 'maintenance', 'out_of_service');

CREATE TYPE loan_status AS ENUM ('ongoing', 'completed');

CREATE TYPE frequency AS ENUM ('monthly', 'quarterly', 'yearly');

CREATE TYPE third_party_kind AS ENUM ('client', 'supplier');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind transaction_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const THIRD_PARTIES_SQL: &str = r"
CREATE TABLE third_parties (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind third_party_kind NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    kind account_kind NOT NULL,
    balance NUMERIC(14, 2) NOT NULL DEFAULT 0,
    currency CHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id),
    category_id UUID REFERENCES categories(id),
    kind transaction_kind NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    description TEXT,
    transaction_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_account ON transactions(account_id);
CREATE INDEX idx_transactions_date ON transactions(transaction_date);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    kind invoice_kind NOT NULL,
    third_party_id UUID NOT NULL REFERENCES third_parties(id),
    invoice_number VARCHAR(64) NOT NULL UNIQUE,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    subtotal NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    amount_paid NUMERIC(14, 2) NOT NULL DEFAULT 0,
    status invoice_status NOT NULL DEFAULT 'draft',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoices_third_party ON invoices(third_party_id);
CREATE INDEX idx_invoices_status ON invoices(status);
";

const INVOICE_LINES_SQL: &str = r"
CREATE TABLE invoice_lines (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    designation VARCHAR(512) NOT NULL,
    quantity NUMERIC(14, 3) NOT NULL CHECK (quantity >= 0),
    unit_price NUMERIC(14, 2) NOT NULL CHECK (unit_price >= 0),
    tax_rate NUMERIC(5, 2) NOT NULL CHECK (tax_rate >= 0 AND tax_rate <= 100),
    discount NUMERIC(5, 2) NOT NULL CHECK (discount >= 0 AND discount <= 100),
    subtotal NUMERIC(14, 2) NOT NULL,
    tax NUMERIC(14, 2) NOT NULL,
    position INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoice_lines_invoice ON invoice_lines(invoice_id);
";

const INVOICE_PAYMENTS_SQL: &str = r"
CREATE TABLE invoice_payments (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    payment_date DATE NOT NULL,
    method payment_method NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoice_payments_invoice ON invoice_payments(invoice_id);
";

const ASSETS_SQL: &str = r"
CREATE TABLE assets (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    serial_number VARCHAR(128),
    status asset_status NOT NULL DEFAULT 'new',
    location VARCHAR(128) NOT NULL DEFAULT 'in_stock',
    account_id UUID REFERENCES accounts(id),
    acquisition_cost NUMERIC(14, 2),
    acquisition_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ASSET_LOANS_SQL: &str = r"
CREATE TABLE asset_loans (
    id UUID PRIMARY KEY,
    asset_id UUID NOT NULL REFERENCES assets(id),
    user_id UUID NOT NULL REFERENCES users(id),
    loan_date DATE NOT NULL,
    due_date DATE,
    return_date DATE,
    status loan_status NOT NULL DEFAULT 'ongoing',
    signature BYTEA,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_asset_loans_asset ON asset_loans(asset_id);
CREATE INDEX idx_asset_loans_status ON asset_loans(status);
";

const RECURRING_OPERATIONS_SQL: &str = r"
CREATE TABLE recurring_operations (
    id UUID PRIMARY KEY,
    description VARCHAR(512) NOT NULL,
    kind transaction_kind NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    frequency frequency NOT NULL,
    due_day SMALLINT NOT NULL CHECK (due_day >= 1 AND due_day <= 31),
    account_id UUID REFERENCES accounts(id),
    category_id UUID REFERENCES categories(id),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    next_due_date DATE NOT NULL,
    last_executed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_recurring_operations_due ON recurring_operations(next_due_date)
    WHERE is_active;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS recurring_operations CASCADE;
DROP TABLE IF EXISTS asset_loans CASCADE;
DROP TABLE IF EXISTS assets CASCADE;
DROP TABLE IF EXISTS invoice_payments CASCADE;
DROP TABLE IF EXISTS invoice_lines CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS third_parties CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS third_party_kind;
DROP TYPE IF EXISTS frequency;
DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS asset_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS invoice_kind;
DROP TYPE IF EXISTS transaction_kind;
DROP TYPE IF EXISTS account_kind;
";
