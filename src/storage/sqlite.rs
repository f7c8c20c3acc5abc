use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// Key–value slots in a single sqlite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.display().to_string(),
            source,
        })?;
        init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened local store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::storage::{KeyValueStore, StorageError};
    use uuid::Uuid;

    #[test]
    fn upsert_replaces_existing_slot() {
        let store = SqliteStore::in_memory().expect("open");
        store.set("token", "a").expect("set");
        store.set("token", "b").expect("set");
        assert_eq!(store.get("token").expect("get").as_deref(), Some("b"));
        store.remove("token").expect("remove");
        assert_eq!(store.get("token").expect("get"), None);
    }

    #[test]
    fn values_survive_reopening_the_file() {
        let dir = std::env::temp_dir().join(format!("kv-store-test-{}", Uuid::new_v4()));
        let path = dir.join("store.sqlite3");
        {
            let store = SqliteStore::open(&path).expect("open");
            store.set("survey_draft", "{\"title\":\"Q1\"}").expect("set");
        }
        let reopened = SqliteStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("survey_draft").expect("get").as_deref(),
            Some("{\"title\":\"Q1\"}")
        );
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unusable_parent_directory_is_reported() {
        let dir = std::env::temp_dir().join(format!("kv-store-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "file").expect("write");

        let err = SqliteStore::open(&blocker.join("store.sqlite3")).err().expect("should fail");
        assert!(matches!(err, StorageError::CreateDir { ref path, .. } if path.ends_with("not-a-dir")));
        let _ = std::fs::remove_dir_all(dir);
    }
}
