use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::schema;
use crate::{
    core::{
        aggregation::{self, RollUpSummary},
        tree,
        utils::ensure_dir,
    },
    errors::{LedgerError, LedgerResult},
    ledger::{ledger::validate_name, Account, AccountRecord, Category, CategoryRecord, CompositeNode},
};

const CATEGORY_COLUMNS: &str = "id, name, value, parent_id, description";
const ACCOUNT_COLUMNS: &str = "id, name, value, category_id, remarks, is_disabled";

/// SQLite-backed store owning every persisted category and account.
///
/// Each mutating call that changes what rolls up (upserts and removals) runs
/// together with a full aggregation pass inside a single transaction, so every
/// category value observed through the store is consistent with the current
/// categories and enabled accounts.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        info!(path = %path.display(), "Ledger database opened");
        Ok(store)
    }

    /// Opens the database named `name` inside `dir`, creating the directory.
    pub fn open_in_dir(dir: &Path, name: &str) -> LedgerResult<Self> {
        ensure_dir(dir)?;
        Self::open(&dir.join(name))
    }

    /// Creates a throwaway in-memory store.
    pub fn open_in_memory() -> LedgerResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> LedgerResult<()> {
        schema::ensure_schema(&self.conn)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Releases the underlying connection.
    pub fn close(self) -> LedgerResult<()> {
        self.conn.close().map_err(|(_, err)| LedgerError::Database(err))
    }

    /// Inserts or updates a category keyed by name, then recomputes every
    /// category value.
    pub fn upsert_category(&self, category: &Category) -> LedgerResult<CategoryRecord> {
        validate_name(&category.name)?;
        let tx = self.conn.unchecked_transaction()?;

        let parent_id = match category.parent.as_deref() {
            Some(parent) => {
                let parent_id = category_id(&tx, parent)?
                    .ok_or_else(|| LedgerError::missing_category(parent))?;
                // Inclusive chain: rejects self-parenting as well.
                if let Some(existing) = category_id(&tx, &category.name)? {
                    if is_ancestor(&tx, existing, parent_id)? {
                        return Err(LedgerError::InvalidHierarchy(format!(
                            "`{}` cannot be placed under `{}`",
                            category.name, parent
                        )));
                    }
                }
                Some(parent_id)
            }
            None => None,
        };

        tx.execute(
            "INSERT INTO categories (name, value, parent_id, description)
             VALUES (?1, 0, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                parent_id = excluded.parent_id,
                description = excluded.description",
            params![category.name, parent_id, category.description],
        )?;
        aggregation::recalculate(&tx)?;
        let record = fetch_category(&tx, &category.name)?
            .ok_or_else(|| LedgerError::category_not_found(&category.name))?;
        tx.commit()?;

        info!(name = %record.name, id = record.id, parent_id = ?record.parent_id, "Category upserted");
        Ok(record)
    }

    /// Inserts or updates an account keyed by name, then recomputes every
    /// category value.
    pub fn upsert_account(&self, account: &Account) -> LedgerResult<AccountRecord> {
        validate_name(&account.name)?;
        if !account.value.is_finite() {
            return Err(LedgerError::Validation(format!(
                "account `{}` has a non-finite value",
                account.name
            )));
        }
        let tx = self.conn.unchecked_transaction()?;
        let category_id = category_id(&tx, &account.category)?
            .ok_or_else(|| LedgerError::missing_category(&account.category))?;

        tx.execute(
            "INSERT INTO accounts (name, value, category_id, remarks, is_disabled)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                category_id = excluded.category_id,
                remarks = excluded.remarks,
                is_disabled = excluded.is_disabled",
            params![
                account.name,
                account.value,
                category_id,
                account.remarks,
                account.is_disabled
            ],
        )?;
        aggregation::recalculate(&tx)?;
        let record = fetch_account(&tx, &account.name)?
            .ok_or_else(|| LedgerError::account_not_found(&account.name))?;
        tx.commit()?;

        info!(name = %record.name, id = record.id, category_id, "Account upserted");
        Ok(record)
    }

    /// Marks an account as disabled. Category values are refreshed on the
    /// next upsert or tree read.
    pub fn disable_account(&self, name: &str) -> LedgerResult<AccountRecord> {
        set_disabled(&self.conn, name, true)
    }

    /// Re-enables a previously disabled account.
    pub fn enable_account(&self, name: &str) -> LedgerResult<AccountRecord> {
        set_disabled(&self.conn, name, false)
    }

    /// Disables every named account, or none of them if any name is unknown.
    pub fn disable_accounts<S: AsRef<str>>(&self, names: &[S]) -> LedgerResult<Vec<AccountRecord>> {
        self.toggle_many(names, true)
    }

    /// Enables every named account, or none of them if any name is unknown.
    pub fn enable_accounts<S: AsRef<str>>(&self, names: &[S]) -> LedgerResult<Vec<AccountRecord>> {
        self.toggle_many(names, false)
    }

    fn toggle_many<S: AsRef<str>>(
        &self,
        names: &[S],
        disabled: bool,
    ) -> LedgerResult<Vec<AccountRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let records = names
            .iter()
            .map(|name| set_disabled(&tx, name.as_ref(), disabled))
            .collect::<LedgerResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(records)
    }

    /// Deletes an account and recomputes category values.
    pub fn remove_account(&self, name: &str) -> LedgerResult<AccountRecord> {
        let tx = self.conn.unchecked_transaction()?;
        let record = fetch_account(&tx, name)?.ok_or_else(|| LedgerError::account_not_found(name))?;
        tx.execute("DELETE FROM accounts WHERE id = ?1", params![record.id])?;
        aggregation::recalculate(&tx)?;
        tx.commit()?;
        info!(name, "Account removed");
        Ok(record)
    }

    /// Deletes a category that has neither subcategories nor accounts.
    /// Nothing cascades.
    pub fn remove_category(&self, name: &str) -> LedgerResult<CategoryRecord> {
        let tx = self.conn.unchecked_transaction()?;
        let record =
            fetch_category(&tx, name)?.ok_or_else(|| LedgerError::category_not_found(name))?;
        let children: i64 = tx.query_row(
            "SELECT COUNT(*) FROM categories WHERE parent_id = ?1",
            params![record.id],
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(LedgerError::InvalidOperation(format!(
                "category `{name}` has {children} subcategories"
            )));
        }
        let accounts: i64 = tx.query_row(
            "SELECT COUNT(*) FROM accounts WHERE category_id = ?1",
            params![record.id],
            |row| row.get(0),
        )?;
        if accounts > 0 {
            return Err(LedgerError::InvalidOperation(format!(
                "category `{name}` has {accounts} accounts"
            )));
        }
        tx.execute("DELETE FROM categories WHERE id = ?1", params![record.id])?;
        aggregation::recalculate(&tx)?;
        tx.commit()?;
        info!(name, "Category removed");
        Ok(record)
    }

    /// Runs a full aggregation pass on demand.
    pub fn recalculate(&self) -> LedgerResult<RollUpSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let summary = aggregation::recalculate(&tx)?;
        tx.commit()?;
        Ok(summary)
    }

    /// Nested tree rooted at `name`, recomputed immediately beforehand.
    pub fn get_category_tree(&self, name: &str) -> LedgerResult<CompositeNode> {
        let tx = self.conn.unchecked_transaction()?;
        let tree = tree::read_tree(&tx, name)?;
        tx.commit()?;
        debug!(name, "Category tree read");
        Ok(tree)
    }

    pub fn get_category_names(&self) -> LedgerResult<Vec<String>> {
        query_names(
            &self.conn,
            "SELECT DISTINCT name FROM categories ORDER BY id",
            params![],
        )
    }

    /// Account names filtered by enabled state.
    pub fn get_accounts(&self, enabled: bool) -> LedgerResult<Vec<String>> {
        let sql = if enabled {
            "SELECT name FROM enabled_accounts ORDER BY id"
        } else {
            "SELECT name FROM accounts WHERE is_disabled != 0 ORDER BY id"
        };
        query_names(&self.conn, sql, params![])
    }

    pub fn get_account_by_name(&self, name: &str) -> LedgerResult<Option<AccountRecord>> {
        fetch_account(&self.conn, name)
    }

    pub fn get_category_by_name(&self, name: &str) -> LedgerResult<Option<CategoryRecord>> {
        fetch_category(&self.conn, name)
    }

    /// Immediate child category names.
    pub fn get_subcategories(&self, name: &str) -> LedgerResult<Vec<String>> {
        let id = self.require_category(name)?;
        query_names(
            &self.conn,
            "SELECT name FROM categories WHERE parent_id = ?1 ORDER BY id",
            params![id],
        )
    }

    /// Categories under `name` (at any depth) that have no subcategories of
    /// their own. `name` itself is never included.
    pub fn get_leaf_categories(&self, name: &str) -> LedgerResult<Vec<String>> {
        let id = self.require_category(name)?;
        query_names(
            &self.conn,
            "WITH RECURSIVE subtree(id, name) AS (
                SELECT id, name FROM categories WHERE parent_id = ?1
                UNION ALL
                SELECT c.id, c.name FROM categories c JOIN subtree s ON c.parent_id = s.id
             )
             SELECT s.name FROM subtree s
             WHERE NOT EXISTS (SELECT 1 FROM categories c WHERE c.parent_id = s.id)
             ORDER BY s.id",
            params![id],
        )
    }

    /// Names of every account (enabled or not) whose category is `name`.
    pub fn get_all_account_names_in_category(&self, name: &str) -> LedgerResult<Vec<String>> {
        let id = self.require_category(name)?;
        query_names(
            &self.conn,
            "SELECT name FROM accounts WHERE category_id = ?1 ORDER BY id",
            params![id],
        )
    }

    fn require_category(&self, name: &str) -> LedgerResult<i64> {
        category_id(&self.conn, name)?.ok_or_else(|| LedgerError::category_not_found(name))
    }
}

fn category_id(conn: &Connection, name: &str) -> LedgerResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// True when `ancestor` appears on the parent chain starting at `start`
/// (inclusive).
fn is_ancestor(conn: &Connection, ancestor: i64, start: i64) -> LedgerResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "WITH RECURSIVE chain(id, parent_id) AS (
                SELECT id, parent_id FROM categories WHERE id = ?1
                UNION
                SELECT c.id, c.parent_id FROM categories c JOIN chain ON c.id = chain.parent_id
             )
             SELECT id FROM chain WHERE id = ?2",
            params![start, ancestor],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn set_disabled(conn: &Connection, name: &str, disabled: bool) -> LedgerResult<AccountRecord> {
    let changed = conn.execute(
        "UPDATE accounts SET is_disabled = ?1 WHERE name = ?2",
        params![disabled, name],
    )?;
    if changed == 0 {
        return Err(LedgerError::account_not_found(name));
    }
    debug!(name, disabled, "Account toggled");
    fetch_account(conn, name)?.ok_or_else(|| LedgerError::account_not_found(name))
}

fn fetch_category(conn: &Connection, name: &str) -> LedgerResult<Option<CategoryRecord>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1");
    Ok(conn.query_row(&sql, params![name], row_to_category).optional()?)
}

fn fetch_account(conn: &Connection, name: &str) -> LedgerResult<Option<AccountRecord>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = ?1");
    Ok(conn.query_row(&sql, params![name], row_to_account).optional()?)
}

pub(crate) fn row_to_category(row: &Row<'_>) -> rusqlite::Result<CategoryRecord> {
    Ok(CategoryRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        parent_id: row.get(3)?,
        description: row.get(4)?,
    })
}

pub(crate) fn row_to_account(row: &Row<'_>) -> rusqlite::Result<AccountRecord> {
    Ok(AccountRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        category_id: row.get(3)?,
        remarks: row.get(4)?,
        is_disabled: row.get(5)?,
    })
}

fn query_names(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> LedgerResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let names = stmt
        .query_map(params, |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
