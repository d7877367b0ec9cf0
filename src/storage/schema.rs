//! SQL for the ledger database. Every statement is idempotent so opening an
//! existing file is safe.

use rusqlite::Connection;

pub const PRAGMAS_SQL: &str = "PRAGMA foreign_keys = ON;";

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    value REAL NOT NULL,
    parent_id INTEGER DEFAULT NULL,
    description TEXT,
    FOREIGN KEY(parent_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    value REAL NOT NULL,
    category_id INTEGER NOT NULL,
    remarks TEXT,
    is_disabled INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY(category_id) REFERENCES categories(id)
);

CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);
CREATE INDEX IF NOT EXISTS idx_accounts_category ON accounts(category_id);
";

pub const VIEWS_SQL: &str = "
CREATE VIEW IF NOT EXISTS enabled_accounts AS
    SELECT * FROM accounts WHERE is_disabled = 0;
";

/// Applies pragmas, tables, and views to a freshly opened connection.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(PRAGMAS_SQL)?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(VIEWS_SQL)?;
    Ok(())
}
