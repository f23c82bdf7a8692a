//! Persistent cache for verified calldata decodings

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::abi::DecodedCall;

/// SQLite-backed lookup cache keyed by signature directory request URL
///
/// Entries never expire: a decoding is only written after it passed
/// round-trip verification.
#[derive(Debug)]
pub struct LookupCache {
    conn: Mutex<Connection>,
}

impl LookupCache {
    /// Open or create the cache database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// In-memory cache, dropped with the value
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS lookups (
                url         TEXT PRIMARY KEY,
                body        TEXT NOT NULL,
                created_at  INTEGER DEFAULT (strftime('%s', 'now'))
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("lookup cache connection poisoned"))
    }

    /// Get the raw cached body for a request URL
    pub fn get(&self, url: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let body = conn
            .query_row(
                "SELECT body FROM lookups WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    /// Store a raw body for a request URL, replacing any previous entry
    pub fn put(&self, url: &str, body: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO lookups(url, body) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET body=excluded.body",
            params![url, body],
        )?;
        Ok(())
    }

    /// Get a cached decoding
    pub fn get_call(&self, url: &str) -> Result<Option<DecodedCall>> {
        match self.get(url)? {
            Some(body) => {
                let call = serde_json::from_str(&body)
                    .with_context(|| format!("corrupt lookup cache entry for {url}"))?;
                Ok(Some(call))
            }
            None => Ok(None),
        }
    }

    /// Save a verified decoding
    pub fn put_call(&self, url: &str, call: &DecodedCall) -> Result<()> {
        let body = serde_json::to_string(call)?;
        self.put(url, &body)
    }

    /// Number of cached entries
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM lookups", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::DecodedArgument;

    fn sample_call() -> DecodedCall {
        DecodedCall {
            label: "Decoded deposit()".to_string(),
            function_name: "deposit".to_string(),
            signature: "deposit()".to_string(),
            arguments: vec![DecodedArgument {
                kind: "uint256".to_string(),
                name: "arg1".to_string(),
                value: "7".to_string(),
                is_key_like: false,
            }],
        }
    }

    #[test]
    fn test_call_cache() {
        let cache = LookupCache::open_in_memory().unwrap();
        let url = "https://example.invalid/?hex_signature=d0e30db0";

        assert!(cache.get_call(url).unwrap().is_none());
        cache.put_call(url, &sample_call()).unwrap();

        assert_eq!(cache.get_call(url).unwrap(), Some(sample_call()));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_put_replaces() {
        let cache = LookupCache::open_in_memory().unwrap();
        cache.put("k", "one").unwrap();
        cache.put("k", "two").unwrap();

        assert_eq!(cache.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let cache = LookupCache::open_in_memory().unwrap();
        cache.put("k", "not json").unwrap();
        assert!(cache.get_call("k").is_err());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookups.sqlite3");

        LookupCache::open(&path)
            .unwrap()
            .put_call("k", &sample_call())
            .unwrap();

        let reopened = LookupCache::open(&path).unwrap();
        assert_eq!(reopened.get_call("k").unwrap(), Some(sample_call()));
    }
}
