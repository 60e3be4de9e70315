use std::path::Path;

use sled::Db;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use super::CacheStore;

/// Durable key-value store using sled.
///
/// Writes stay buffered until `sync`; the pipeline syncs at its page
/// checkpoints so an interrupted run loses at most one page of entries.
/// `close` flushes and releases the store; the database lock is dropped
/// with it.
pub struct SledStore {
    db: Option<Db>,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::CacheInit(format!(
                    "failed to create cache directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db = sled::open(path).map_err(|e| {
            let err_str = e.to_string();
            // Detect lock errors and provide actionable fix
            if err_str.contains("WouldBlock") || err_str.contains("lock") {
                Error::CacheInit(format!(
                    "cache locked at {}\n\n\
                    Another run is using this cache, or a previous run crashed.\n\
                    To fix: rm {}/db/LOCK",
                    path.display(),
                    path.display()
                ))
            } else {
                Error::CacheInit(format!("failed to open cache at {}: {e}", path.display()))
            }
        })?;

        debug!("opened durable cache at {}", path.display());

        Ok(Self { db: Some(db) })
    }
}

impl CacheStore for SledStore {
    fn get(&self, key: &str) -> Option<String> {
        let db = self.db.as_ref()?;
        match db.get(key.as_bytes()) {
            Ok(Some(value)) => match String::from_utf8(value.to_vec()) {
                Ok(text) => Some(text),
                Err(_) => {
                    warn!("cache entry for {key:?} is not valid UTF-8, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("cache read error: {e}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let db = self
            .db
            .as_ref()
            .ok_or_else(|| Error::CacheWrite("cache store is closed".to_string()))?;
        db.insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| Error::CacheWrite(e.to_string()))?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if let Some(db) = self.db.as_ref() {
            db.flush()
                .map_err(|e| Error::CacheWrite(format!("flush failed: {e}")))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(db) = self.db.take() {
            db.flush()
                .map_err(|e| Error::CacheWrite(format!("flush failed: {e}")))?;
        }
        Ok(())
    }
}
