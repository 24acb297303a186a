//! SQLite-backed local store, the stand-in for browser `localStorage`.
//!
//! Every entry lives in a single `local_storage(key, value)` table. Keys are
//! written with a fixed namespace prepended so the table can be shared with
//! unrelated data, and nothing outside the namespace is ever read or removed.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::types::{StoreStats, DEFAULT_PREFIXES};
use crate::error::LocalError;

type Result<T> = std::result::Result<T, LocalError>;

/// Namespace prepended to every stored key.
pub const DEFAULT_NAMESPACE: &str = "crewtech_kv_";

/// Browser localStorage gives an origin roughly 5 MiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

const SELF_TEST_KEY: &str = "__crewtech_kv_self_test__";

const LOCAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Settings for [`LocalStore`].
#[derive(Debug, Clone)]
pub struct LocalSettings {
  pub namespace: String,
  /// Upper bound on namespaced bytes; `None` disables the check
  pub quota_bytes: Option<u64>,
  /// Prefixes scanned by `stats` and removed by `clear(None)`
  pub known_prefixes: Vec<String>,
}

impl Default for LocalSettings {
  fn default() -> Self {
    Self {
      namespace: DEFAULT_NAMESPACE.to_string(),
      quota_bytes: Some(DEFAULT_QUOTA_BYTES),
      known_prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
    }
  }
}

/// Local persistent key-value store.
pub struct LocalStore {
  conn: Mutex<Connection>,
  settings: LocalSettings,
}

impl LocalStore {
  /// Open (or create) the store at `path`.
  pub fn open(path: &Path, settings: LocalSettings) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    Self::with_connection(conn, settings)
  }

  /// Open a throwaway store that lives only as long as the process.
  pub fn open_in_memory(settings: LocalSettings) -> Result<Self> {
    Self::with_connection(Connection::open_in_memory()?, settings)
  }

  fn with_connection(conn: Connection, settings: LocalSettings) -> Result<Self> {
    conn.execute_batch(LOCAL_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
      settings,
    })
  }

  /// Default database location under the user's data directory.
  pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|dir| dir.join("crewtech-kv").join("local.db"))
  }

  pub fn settings(&self) -> &LocalSettings {
    &self.settings
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| LocalError::Poisoned)
  }

  fn stored_key(&self, key: &str) -> String {
    format!("{}{}", self.settings.namespace, key)
  }

  fn encode(key: &str, value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|source| LocalError::Serialize {
      key: key.to_string(),
      source,
    })
  }

  fn decode(key: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|source| LocalError::Deserialize {
      key: key.to_string(),
      source,
    })
  }

  /// Reject a write whose projected namespace size would exceed the quota.
  fn check_quota(&self, conn: &Connection, writes: &[(String, String)]) -> Result<()> {
    let Some(limit) = self.settings.quota_bytes else {
      return Ok(());
    };

    let used: i64 = conn.query_row(
      "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
       FROM local_storage WHERE substr(key, 1, length(?1)) = ?1",
      params![self.settings.namespace],
      |row| row.get(0),
    )?;

    let mut projected = used.max(0) as u64;
    for (stored_key, encoded) in writes {
      let existing: Option<i64> = conn
        .query_row(
          "SELECT length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))
           FROM local_storage WHERE key = ?1",
          params![stored_key],
          |row| row.get(0),
        )
        .optional()?;
      projected = projected.saturating_sub(existing.unwrap_or(0).max(0) as u64);
      projected += (stored_key.len() + encoded.len()) as u64;
    }

    if projected > limit {
      return Err(LocalError::QuotaExceeded {
        limit,
        requested: projected,
      });
    }
    Ok(())
  }

  pub fn set(&self, key: &str, value: &Value) -> Result<()> {
    let write = (self.stored_key(key), Self::encode(key, value)?);
    let conn = self.conn()?;
    self.check_quota(&conn, std::slice::from_ref(&write))?;

    conn.execute(
      "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
       VALUES (?1, ?2, datetime('now'))",
      params![write.0, write.1],
    )?;
    Ok(())
  }

  pub fn get(&self, key: &str) -> Result<Option<Value>> {
    let conn = self.conn()?;
    let raw: Option<String> = conn
      .query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        params![self.stored_key(key)],
        |row| row.get(0),
      )
      .optional()?;

    // A stored null reads back as absent, the same as the remote store
    match raw.map(|raw| Self::decode(key, &raw)).transpose()? {
      Some(Value::Null) | None => Ok(None),
      Some(value) => Ok(Some(value)),
    }
  }

  pub fn del(&self, key: &str) -> Result<()> {
    let conn = self.conn()?;
    conn.execute(
      "DELETE FROM local_storage WHERE key = ?1",
      params![self.stored_key(key)],
    )?;
    Ok(())
  }

  /// Write all pairs or none of them.
  pub fn mset(&self, keys: &[String], values: &[Value]) -> Result<()> {
    let writes = keys
      .iter()
      .zip(values)
      .map(|(key, value)| Ok((self.stored_key(key), Self::encode(key, value)?)))
      .collect::<Result<Vec<_>>>()?;

    let mut conn = self.conn()?;
    self.check_quota(&conn, &writes)?;

    let tx = conn.transaction()?;
    for (stored_key, encoded) in &writes {
      tx.execute(
        "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        params![stored_key, encoded],
      )?;
    }
    tx.commit()?;
    Ok(())
  }

  pub fn mget(&self, keys: &[String]) -> Result<Vec<Option<Value>>> {
    keys.iter().map(|key| self.get(key)).collect()
  }

  pub fn mdel(&self, keys: &[String]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    for key in keys {
      tx.execute(
        "DELETE FROM local_storage WHERE key = ?1",
        params![self.stored_key(key)],
      )?;
    }
    tx.commit()?;
    Ok(())
  }

  /// Values of every key starting with `prefix`, ordered by key.
  ///
  /// Entries that decode to `null` or fail to decode are skipped.
  pub fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
    let conn = self.conn()?;
    let mut stmt = conn.prepare(
      "SELECT key, value FROM local_storage
       WHERE substr(key, 1, length(?1)) = ?1
       ORDER BY key",
    )?;

    let rows = stmt
      .query_map(params![self.stored_key(prefix)], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let values = rows
      .into_iter()
      .filter_map(|(key, raw)| match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
          debug!(key = %key, error = %e, "skipping undecodable local entry");
          None
        }
      })
      .collect();

    Ok(values)
  }

  /// Per-prefix counts and a best-effort size estimate over the known prefixes.
  pub fn stats(&self) -> Result<StoreStats> {
    let conn = self.conn()?;
    let mut stats = StoreStats::default();

    for prefix in &self.settings.known_prefixes {
      let stored_prefix = self.stored_key(prefix);
      let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM local_storage WHERE substr(key, 1, length(?1)) = ?1",
        params![stored_prefix],
        |row| row.get(0),
      )?;

      // Size is an estimate; a failure here must not fail the whole call
      let size: i64 = conn
        .query_row(
          "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
           FROM local_storage WHERE substr(key, 1, length(?1)) = ?1",
          params![stored_prefix],
          |row| row.get(0),
        )
        .unwrap_or_else(|e| {
          debug!(prefix = %prefix, error = %e, "size estimate failed");
          0
        });

      let count = count.max(0) as u64;
      stats.total_keys += count;
      stats.total_size += size.max(0) as u64;
      stats.prefixes.insert(prefix.clone(), count);
    }

    Ok(stats)
  }

  /// Remove keys under `prefix`, or under every known prefix when `None`.
  ///
  /// Returns the number of removed entries.
  pub fn clear(&self, prefix: Option<&str>) -> Result<usize> {
    let prefixes: Vec<&str> = match prefix {
      Some(p) => vec![p],
      None => self
        .settings
        .known_prefixes
        .iter()
        .map(String::as_str)
        .collect(),
    };

    let mut conn = self.conn()?;
    let tx = conn.transaction()?;
    let mut removed = 0;
    for p in prefixes {
      removed += tx.execute(
        "DELETE FROM local_storage WHERE substr(key, 1, length(?1)) = ?1",
        params![self.stored_key(p)],
      )?;
    }
    tx.commit()?;
    Ok(removed)
  }

  /// Write, read back and delete a throwaway key.
  pub fn self_test(&self) -> Result<()> {
    let probe = serde_json::json!({ "probe": true, "at": chrono::Utc::now().timestamp_millis() });
    self.set(SELF_TEST_KEY, &probe)?;
    let read = self.get(SELF_TEST_KEY);
    self.del(SELF_TEST_KEY)?;

    if read? == Some(probe) {
      Ok(())
    } else {
      Err(LocalError::SelfTestMismatch)
    }
  }
}
