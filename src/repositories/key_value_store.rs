// src/repositories/key_value_store.rs
//
// Durable key-value storage
//
// The player persists a handful of whole documents (watch history,
// settings), each serialized under one namespaced key.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::db::ConnectionPool;
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------
// Storage contract
// ---------------------------------------------------------------------
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove(&self, key: &str) -> AppResult<()>;
}

// ---------------------------------------------------------------------
// SQLite Implementation
// ---------------------------------------------------------------------
pub struct SqliteKeyValueStore {
    pool: Arc<ConnectionPool>,
    namespace: String,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<ConnectionPool>, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2")?;

        let result = stmt.query_row(rusqlite::params![self.namespace, key], |row| row.get(0));

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_entries (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![self.namespace, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2",
            rusqlite::params![self.namespace, key],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------
// In-memory Implementation
// ---------------------------------------------------------------------
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Other("key-value store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Other("key-value store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Other("key-value store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection_pool, get_connection, initialize_database};

    fn sqlite_store(dir: &tempfile::TempDir, namespace: &str) -> SqliteKeyValueStore {
        let pool = create_connection_pool(&dir.path().join("kv.db")).unwrap();
        {
            let conn = get_connection(&pool).unwrap();
            initialize_database(&conn).unwrap();
        }
        SqliteKeyValueStore::new(Arc::new(pool), namespace)
    }

    #[test]
    fn test_sqlite_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir, "player");

        assert_eq!(store.get("watch_history").unwrap(), None);

        store.set("watch_history", "{}").unwrap();
        store.set("watch_history", "{\"1\":{}}").unwrap();
        assert_eq!(
            store.get("watch_history").unwrap().as_deref(),
            Some("{\"1\":{}}")
        );

        store.remove("watch_history").unwrap();
        assert_eq!(store.get("watch_history").unwrap(), None);
    }

    #[test]
    fn test_sqlite_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_connection_pool(&dir.path().join("kv.db")).unwrap();
        initialize_database(&get_connection(&pool).unwrap()).unwrap();
        let pool = Arc::new(pool);

        let a = SqliteKeyValueStore::new(pool.clone(), "a");
        let b = SqliteKeyValueStore::new(pool, "b");

        a.set("settings", "one").unwrap();
        assert_eq!(b.get("settings").unwrap(), None);
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
