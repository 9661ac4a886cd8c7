//! DuckDB settings store and requirement registry

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection};

use crate::domain::result::{Error, Result};
use crate::domain::DiscountRequirement;
use crate::ports::{RequirementRegistry, SettingEntry, SettingStore};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// DuckDB-backed settings store
///
/// One connection guarded by a mutex; share the store across threads with
/// `Arc`. Every write is a single upsert statement, so writes are atomic per
/// key.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) a store at `db_path`
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which can occur when the CLI and the host engine open the database at
    /// the same time.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[itemcount] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// In-memory store, mostly useful for tests and embedding
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> anyhow::Result<Connection> {
        // Extension autoloading stays off: nothing here needs an extension and
        // cached extensions can fail code-signing checks on macOS
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(conn)
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the backing file (`None` for in-memory stores)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    fn row_to_requirement(row: &duckdb::Row) -> duckdb::Result<DiscountRequirement> {
        let created_at: String = row.get(3)?;
        Ok(DiscountRequirement {
            id: row.get(0)?,
            discount_id: row.get(1)?,
            system_name: row.get(2)?,
            created_at: parse_timestamp(&created_at),
        })
    }
}

impl SettingStore for DuckDbStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT setting_value FROM sys_settings WHERE setting_key = ?")?;
        let mut rows = stmt.query([key])?;

        let value = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_settings (setting_key, setting_value, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT (setting_key) DO UPDATE SET
                setting_value = EXCLUDED.setting_value,
                updated_at = EXCLUDED.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM sys_settings WHERE setting_key = ?", [key])?;
        Ok(rows > 0)
    }

    fn list_settings(&self, prefix: &str) -> Result<Vec<SettingEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT setting_key, setting_value FROM sys_settings
             WHERE starts_with(setting_key, ?)
             ORDER BY setting_key",
        )?;

        let entries = stmt
            .query_map([prefix], |row| {
                Ok(SettingEntry {
                    key: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn delete_settings(&self, prefix: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_settings WHERE starts_with(setting_key, ?)",
            [prefix],
        )?;
        Ok(deleted)
    }
}

impl RequirementRegistry for DuckDbStore {
    fn get_requirement(&self, id: i64) -> Result<Option<DiscountRequirement>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT requirement_id, discount_id, system_name, CAST(created_at AS VARCHAR)
             FROM sys_discount_requirements WHERE requirement_id = ?",
        )?;
        let mut rows = stmt.query([id])?;

        let requirement = match rows.next()? {
            Some(row) => Some(Self::row_to_requirement(row)?),
            None => None,
        };
        Ok(requirement)
    }

    fn insert_requirement(&self, discount_id: i64, system_name: &str) -> Result<DiscountRequirement> {
        let conn = self.lock()?;
        let id: i64 = conn.query_row("SELECT nextval('seq_requirement_id')", [], |row| row.get(0))?;
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO sys_discount_requirements (requirement_id, discount_id, system_name, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                id,
                discount_id,
                system_name,
                created_at.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
            ],
        )?;

        Ok(DiscountRequirement {
            id,
            discount_id,
            system_name: system_name.to_string(),
            created_at,
        })
    }

    fn delete_requirement(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "DELETE FROM sys_discount_requirements WHERE requirement_id = ?",
            [id],
        )?;
        Ok(rows > 0)
    }

    fn list_requirements(&self, discount_id: Option<i64>) -> Result<Vec<DiscountRequirement>> {
        let conn = self.lock()?;
        let select = "SELECT requirement_id, discount_id, system_name, CAST(created_at AS VARCHAR)
             FROM sys_discount_requirements";

        let requirements = match discount_id {
            Some(discount_id) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE discount_id = ? ORDER BY requirement_id",
                    select
                ))?;
                let rows = stmt.query_map([discount_id], Self::row_to_requirement)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY requirement_id", select))?;
                let rows = stmt.query_map([], Self::row_to_requirement)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(requirements)
    }
}

// Helper functions

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|_| Utc::now())
}
