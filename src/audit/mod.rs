//! Audit log: SQLite-backed operation history.
//!
//! Every vault operation (add, edit, delete, category changes) is recorded
//! in `lockbox-audit.db` next to the vault file.  Entry names are logged,
//! secret values never are.
//!
//! Logging is fire-and-forget: if the database can't be opened or written
//! to, the vault operation carries on without a record.  Built without the
//! `audit-log` feature, `log_audit` is a no-op.

use std::path::Path;
#[cfg(feature = "audit-log")]
use std::path::PathBuf;

use chrono::{DateTime, Utc};

#[cfg(feature = "audit-log")]
use rusqlite::Connection;

#[cfg(feature = "audit-log")]
use crate::errors::{LockboxError, Result};

/// File name of the audit database, created beside the vault file.
pub const DB_FILE_NAME: &str = "lockbox-audit.db";

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub vault: String,
    pub entry_name: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
#[cfg(feature = "audit-log")]
pub struct AuditLog {
    conn: Connection,
}

#[cfg(feature = "audit-log")]
impl AuditLog {
    /// Open (or create) the audit database in `dir`.
    ///
    /// Returns `None` if the database can't be opened; callers treat that
    /// as "audit logging unavailable" and continue.
    pub fn open(dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(dir);
        let conn = Connection::open(&db_path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                vault       TEXT NOT NULL,
                entry_name  TEXT,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation.  Errors are ignored.
    pub fn log(&self, operation: &str, vault: &str, entry_name: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, vault, entry_name, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, vault, entry_name, details],
        );
        if let Err(e) = result {
            tracing::debug!(error = %e, operation, "audit insert failed");
        }
    }

    /// Query recent audit entries, most recent first.
    ///
    /// - `limit`: maximum number of entries to return.
    /// - `since`: if provided, only entries at or after this time.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let since_str = since.map(|ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, vault, entry_name, details
                 FROM audit_log
                 WHERE ?1 IS NULL OR timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| LockboxError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since_str, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    vault: row.get(3)?,
                    entry_name: row.get(4)?,
                    details: row.get(5)?,
                })
            })
            .map_err(|e| LockboxError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| LockboxError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Path of the audit database inside `dir`.
    pub fn db_path(dir: &Path) -> PathBuf {
        dir.join(DB_FILE_NAME)
    }
}

/// Log an event for the vault at `vault_path`.  Never fails the caller.
#[cfg(feature = "audit-log")]
pub fn log_audit(vault_path: &Path, op: &str, entry_name: Option<&str>, details: Option<&str>) {
    let vault = vault_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(audit) = AuditLog::open(&crate::fs::parent_dir(vault_path)) {
        audit.log(op, &vault, entry_name, details);
    }
}

#[cfg(not(feature = "audit-log"))]
pub fn log_audit(_vault_path: &Path, _op: &str, _entry_name: Option<&str>, _details: Option<&str>) {}
