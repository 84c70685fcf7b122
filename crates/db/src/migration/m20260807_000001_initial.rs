//! Initial database migration.
//!
//! Creates the currency registry, the rate observation log, the minimal
//! product surface, and the price cache, plus triggers and seed data.

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
        // PART 2: CURRENCY REGISTRY & RATES
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(CURRENCY_RATES_SQL).await?;

        // ============================================================
        // PART 3: PRODUCTS & PRICE CACHE
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(PRODUCT_PRICES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 5: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_CURRENCIES_SQL).await?;

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
-- Currency symbol placement
CREATE TYPE symbol_position AS ENUM ('before', 'after');
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    id SERIAL PRIMARY KEY,
    code CHAR(3) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    symbol VARCHAR(10) NOT NULL,
    decimal_places SMALLINT NOT NULL DEFAULT 2,
    symbol_position symbol_position NOT NULL DEFAULT 'before',
    thousands_separator VARCHAR(4) NOT NULL DEFAULT ',',
    decimal_separator VARCHAR(4) NOT NULL DEFAULT '.',
    sort_order INT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_default BOOLEAN NOT NULL DEFAULT false,
    promoted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_currency_code CHECK (code ~ '^[A-Z]{3}$'),
    CONSTRAINT chk_decimal_places CHECK (decimal_places BETWEEN 0 AND 4)
);

-- At most one default currency, enforced below the application too
CREATE UNIQUE INDEX idx_currencies_single_default ON currencies (is_default) WHERE is_default;
";

const CURRENCY_RATES_SQL: &str = r"
CREATE TABLE currency_rates (
    id SERIAL PRIMARY KEY,
    base_id INT NOT NULL REFERENCES currencies(id) ON DELETE CASCADE,
    quote_id INT NOT NULL REFERENCES currencies(id) ON DELETE CASCADE,
    rate DOUBLE PRECISION NOT NULL,
    provider VARCHAR(64) NOT NULL DEFAULT 'manual',
    is_manual BOOLEAN NOT NULL DEFAULT false,
    fetched_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0)
);

CREATE INDEX idx_currency_rates_pair ON currency_rates(base_id, quote_id, fetched_at DESC, id DESC);
CREATE INDEX idx_currency_rates_base ON currency_rates(base_id, fetched_at DESC);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    old_price DOUBLE PRECISION,
    currency_code CHAR(3) NOT NULL DEFAULT 'USD',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_price_non_negative CHECK (price >= 0),
    CONSTRAINT chk_old_price_non_negative CHECK (old_price IS NULL OR old_price >= 0)
);
";

const PRODUCT_PRICES_SQL: &str = r"
CREATE TABLE product_prices (
    product_id INT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    currency_id INT NOT NULL REFERENCES currencies(id) ON DELETE CASCADE,
    price DOUBLE PRECISION NOT NULL,
    old_price DOUBLE PRECISION,
    rate_id INT REFERENCES currency_rates(id) ON DELETE SET NULL,
    computed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (product_id, currency_id)
);

CREATE INDEX idx_product_prices_currency ON product_prices(currency_id);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_currencies_updated_at
    BEFORE UPDATE ON currencies
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_products_updated_at
    BEFORE UPDATE ON products
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const SEED_CURRENCIES_SQL: &str = r"
INSERT INTO currencies (code, name, symbol, decimal_places, symbol_position, thousands_separator, decimal_separator, sort_order, is_default, promoted_at) VALUES
    ('USD', 'US Dollar', '$', 2, 'before', ',', '.', 10, true, now()),
    ('EUR', 'Euro', '€', 2, 'after', ' ', ',', 20, false, NULL),
    ('GBP', 'British Pound', '£', 2, 'before', ',', '.', 30, false, NULL),
    ('JPY', 'Japanese Yen', '¥', 0, 'before', ',', '.', 40, false, NULL),
    ('KZT', 'Kazakhstani Tenge', '₸', 2, 'after', ' ', ',', 50, false, NULL),
    ('RUB', 'Russian Ruble', '₽', 2, 'after', ' ', ',', 60, false, NULL);

-- The default currency always carries its own self-rate
INSERT INTO currency_rates (base_id, quote_id, rate, provider, is_manual)
SELECT id, id, 1.0, 'system', false FROM currencies WHERE code = 'USD';
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS product_prices CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS currency_rates CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;
DROP FUNCTION IF EXISTS set_updated_at CASCADE;
DROP TYPE IF EXISTS symbol_position CASCADE;
";
