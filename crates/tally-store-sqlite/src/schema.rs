//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Foreign keys carry no `ON DELETE`
//! action: deletes walk the dependency order explicitly (see
//! `SqliteStore::delete_product`), and the constraints reject any delete
//! that would orphan a row.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tenants (
    tenant_id     TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    location      TEXT,
    phone         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,      -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    product_id    TEXT PRIMARY KEY,
    tenant_id     TEXT NOT NULL REFERENCES tenants(tenant_id),
    barcode       TEXT NOT NULL,
    name          TEXT NOT NULL,
    price         TEXT NOT NULL,      -- decimal string, > 0
    category      TEXT,
    reorder_point INTEGER NOT NULL DEFAULT 20 CHECK (reorder_point > 0),
    created_at    TEXT NOT NULL,
    UNIQUE (tenant_id, barcode)
);

-- One row per product; the only mutable quantity.
CREATE TABLE IF NOT EXISTS stock (
    product_id   TEXT PRIMARY KEY REFERENCES products(product_id),
    tenant_id    TEXT NOT NULL REFERENCES tenants(tenant_id),
    quantity     INTEGER NOT NULL CHECK (quantity >= 0),
    last_updated TEXT NOT NULL
);

-- Append-only audit of every stock change.
CREATE TABLE IF NOT EXISTS movements (
    movement_id TEXT PRIMARY KEY,
    product_id  TEXT NOT NULL REFERENCES products(product_id),
    tenant_id   TEXT NOT NULL REFERENCES tenants(tenant_id),
    quantity    INTEGER NOT NULL CHECK (quantity > 0),
    direction   TEXT NOT NULL CHECK (direction IN ('in', 'out')),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS alerts (
    alert_id     TEXT PRIMARY KEY,
    tenant_id    TEXT NOT NULL REFERENCES tenants(tenant_id),
    product_id   TEXT NOT NULL REFERENCES products(product_id),
    alert_type   TEXT NOT NULL,       -- 'low_stock' | 'expiry'
    message      TEXT NOT NULL,
    acknowledged INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

-- One row per product, overwritten on recalculation.
CREATE TABLE IF NOT EXISTS forecasts (
    product_id          TEXT PRIMARY KEY REFERENCES products(product_id),
    tenant_id           TEXT NOT NULL REFERENCES tenants(tenant_id),
    days_until_stockout INTEGER,
    confidence          REAL NOT NULL,
    avg_daily_sales     REAL NOT NULL,
    recommendation      TEXT NOT NULL,
    last_recalculated   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS products_tenant_idx   ON products(tenant_id);
CREATE INDEX IF NOT EXISTS movements_product_idx ON movements(product_id, created_at);
CREATE INDEX IF NOT EXISTS alerts_product_idx    ON alerts(product_id, alert_type, acknowledged);
CREATE INDEX IF NOT EXISTS alerts_tenant_idx     ON alerts(tenant_id, created_at);

PRAGMA user_version = 1;
";
