//! Initial database migration.
//!
//! Creates the catalog, partner stock, royalty, rebate, withdrawal and
//! notification tables.

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
        // PART 2: CATALOG AND ACTORS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PARTNERS_SQL).await?;
        db.execute_unprepared(WORKS_SQL).await?;
        db.execute_unprepared(ORDERS_SQL).await?;

        // ============================================================
        // PART 3: LEDGERS
        // ============================================================
        db.execute_unprepared(PARTNER_STOCKS_SQL).await?;
        db.execute_unprepared(ROYALTIES_SQL).await?;
        db.execute_unprepared(REBATES_SQL).await?;
        db.execute_unprepared(WITHDRAWALS_SQL).await?;

        // ============================================================
        // PART 4: NOTIFICATIONS
        // ============================================================
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('PDG', 'AUTEUR', 'CONCEPTEUR', 'REPRESENTANT', 'PARTENAIRE', 'CLIENT');
CREATE TYPE royalty_type AS ENUM ('PERCENTAGE', 'FIXED');
CREATE TYPE rebate_rate_type AS ENUM ('WORK', 'AUTHOR', 'PARTNER', 'GLOBAL');
CREATE TYPE withdrawal_status AS ENUM ('PENDING', 'APPROVED', 'PAID', 'REJECTED');
CREATE TYPE withdrawal_method AS ENUM ('MOMO', 'BANK', 'CASH');
CREATE TYPE stock_movement_type AS ENUM ('PARTNER_ALLOCATION', 'PARTNER_SALE', 'PARTNER_RETURN');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    role user_role NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_role ON users(role);
";

const PARTNERS_SQL: &str = r"
CREATE TABLE partners (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const WORKS_SQL: &str = r"
CREATE TABLE works (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title VARCHAR(500) NOT NULL,
    isbn VARCHAR(32),
    price BIGINT NOT NULL CHECK (price >= 0),
    stock BIGINT NOT NULL DEFAULT 0 CHECK (stock >= 0),
    status VARCHAR(32) NOT NULL DEFAULT 'DRAFT',
    author_id UUID REFERENCES users(id) ON DELETE SET NULL,
    royalty_rate NUMERIC(10, 2) NOT NULL DEFAULT 0,
    royalty_type royalty_type NOT NULL DEFAULT 'PERCENTAGE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_works_author ON works(author_id) WHERE author_id IS NOT NULL;
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID REFERENCES partners(id) ON DELETE SET NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'PENDING',
    total BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE order_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    work_id UUID NOT NULL REFERENCES works(id),
    quantity BIGINT NOT NULL CHECK (quantity > 0),
    price BIGINT NOT NULL CHECK (price >= 0)
);

CREATE INDEX idx_order_items_order ON order_items(order_id);
";

const PARTNER_STOCKS_SQL: &str = r"
CREATE TABLE partner_stocks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    work_id UUID NOT NULL REFERENCES works(id),
    allocated_quantity BIGINT NOT NULL DEFAULT 0 CHECK (allocated_quantity >= 0),
    sold_quantity BIGINT NOT NULL DEFAULT 0 CHECK (sold_quantity >= 0),
    returned_quantity BIGINT NOT NULL DEFAULT 0 CHECK (returned_quantity >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_partner_stocks_pair UNIQUE (partner_id, work_id),
    CONSTRAINT chk_partner_stocks_available
        CHECK (allocated_quantity - sold_quantity + returned_quantity >= 0),
    CONSTRAINT chk_partner_stocks_returns CHECK (returned_quantity <= sold_quantity)
);

CREATE TABLE stock_movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    work_id UUID NOT NULL REFERENCES works(id),
    partner_id UUID NOT NULL REFERENCES partners(id),
    movement_type stock_movement_type NOT NULL,
    quantity BIGINT NOT NULL,
    reason TEXT,
    reference VARCHAR(255) NOT NULL,
    performed_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_stock_movements_pair ON stock_movements(partner_id, work_id, created_at DESC);
";

const ROYALTIES_SQL: &str = r"
CREATE TABLE royalties (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    work_id UUID NOT NULL REFERENCES works(id),
    order_id UUID REFERENCES orders(id),
    amount BIGINT NOT NULL CHECK (amount >= 0),
    rate NUMERIC(10, 2) NOT NULL DEFAULT 0,
    approved BOOLEAN NOT NULL DEFAULT false,
    approved_at TIMESTAMPTZ,
    approved_by UUID REFERENCES users(id),
    paid BOOLEAN NOT NULL DEFAULT false,
    paid_at TIMESTAMPTZ,
    paid_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX uq_royalties_order_work ON royalties(order_id, work_id) WHERE order_id IS NOT NULL;
CREATE INDEX idx_royalties_author_work ON royalties(user_id, work_id) WHERE paid = false;
";

const REBATES_SQL: &str = r"
CREATE TABLE rebate_rates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    rate_type rebate_rate_type NOT NULL,
    work_id UUID REFERENCES works(id) ON DELETE CASCADE,
    user_id UUID REFERENCES users(id) ON DELETE CASCADE,
    partner_id UUID REFERENCES partners(id) ON DELETE CASCADE,
    rate NUMERIC(10, 2) NOT NULL CHECK (rate >= 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    start_date TIMESTAMPTZ,
    end_date TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE partner_rebates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id),
    order_id UUID REFERENCES orders(id),
    work_id UUID REFERENCES works(id),
    amount BIGINT NOT NULL CHECK (amount >= 0),
    rate NUMERIC(10, 2) NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL DEFAULT 'ACCRUED'
        CHECK (status IN ('ACCRUED', 'PENDING', 'VALIDATED', 'PAID', 'CANCELLED')),
    validated_at TIMESTAMPTZ,
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX uq_partner_rebates_order_work ON partner_rebates(order_id, work_id)
    WHERE order_id IS NOT NULL AND work_id IS NOT NULL;
CREATE INDEX idx_partner_rebates_partner ON partner_rebates(partner_id, created_at DESC);
";

const WITHDRAWALS_SQL: &str = r"
CREATE TABLE withdrawals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    partner_id UUID REFERENCES partners(id),
    amount BIGINT NOT NULL CHECK (amount > 0),
    method withdrawal_method NOT NULL DEFAULT 'MOMO',
    status withdrawal_status NOT NULL DEFAULT 'PENDING',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_withdrawals_user ON withdrawals(user_id, status);
CREATE INDEX idx_withdrawals_partner ON withdrawals(partner_id, status) WHERE partner_id IS NOT NULL;
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    kind VARCHAR(32) NOT NULL,
    data JSONB NOT NULL DEFAULT '{}'::jsonb,
    read BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notifications_user ON notifications(user_id, created_at DESC) WHERE read = false;
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS withdrawals CASCADE;
DROP TABLE IF EXISTS partner_rebates CASCADE;
DROP TABLE IF EXISTS rebate_rates CASCADE;
DROP TABLE IF EXISTS royalties CASCADE;
DROP TABLE IF EXISTS stock_movements CASCADE;
DROP TABLE IF EXISTS partner_stocks CASCADE;
DROP TABLE IF EXISTS order_items CASCADE;
DROP TABLE IF EXISTS orders CASCADE;
DROP TABLE IF EXISTS works CASCADE;
DROP TABLE IF EXISTS partners CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS stock_movement_type;
DROP TYPE IF EXISTS withdrawal_method;
DROP TYPE IF EXISTS withdrawal_status;
DROP TYPE IF EXISTS rebate_rate_type;
DROP TYPE IF EXISTS royalty_type;
DROP TYPE IF EXISTS user_role;
";
