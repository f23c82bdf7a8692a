//! SQLite store for created tokens and per-account asset registries

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::Address;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::assets::AssetRegistry;

/// A persisted registry and when it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRegistry {
    pub registry: AssetRegistry,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AssetStore {
    conn: Mutex<Connection>,
}

impl AssetStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("asset store connection poisoned"))
    }

    // === Created Tokens ===

    /// Tokens deployed from this machine, in insertion order
    pub fn created_tokens(&self) -> Result<Vec<Address>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT address FROM created_tokens ORDER BY id")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let address: String = row.get(0)?;
            out.push(
                Address::from_str(&address)
                    .with_context(|| format!("invalid created token address {address}"))?,
            );
        }
        Ok(out)
    }

    /// Returns false when the token was already tracked
    pub fn add_created_token(&self, address: &Address) -> Result<bool> {
        let inserted = self.conn()?.execute(
            "INSERT OR IGNORE INTO created_tokens(address) VALUES (?1)",
            params![address.to_checksum(None)],
        )?;
        Ok(inserted > 0)
    }

    // === Registries ===

    pub fn load_registry(&self, owner: &Address) -> Result<Option<StoredRegistry>> {
        let conn = self.conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT body, updated_at FROM registries WHERE owner = ?1",
                params![owner.to_checksum(None)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((body, updated_at)) = row else {
            return Ok(None);
        };
        let registry = serde_json::from_str(&body)
            .with_context(|| format!("corrupt registry for {owner}"))?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .with_context(|| format!("invalid registry timestamp for {owner}"))?
            .with_timezone(&Utc);
        Ok(Some(StoredRegistry {
            registry,
            updated_at,
        }))
    }

    pub fn save_registry(&self, owner: &Address, registry: &AssetRegistry) -> Result<()> {
        let body = serde_json::to_string(registry)?;
        self.conn()?.execute(
            "INSERT INTO registries(owner, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner) DO UPDATE SET body=excluded.body, updated_at=excluded.updated_at",
            params![owner.to_checksum(None), body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS created_tokens (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS registries (
                owner       TEXT PRIMARY KEY,
                body        TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}
