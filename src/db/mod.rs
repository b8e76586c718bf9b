//! Local progress database
//!
//! One sled database holds everything the game persists, under two fixed
//! keys:
//!
//! - `mastery`: long-term correctness records, see [`mastery`]
//! - `session`: the in-flight game snapshot, see [`session`]
//!
//! Values are JSON documents. Both documents are keyed and populated by name
//! hashes only; the stored artifact carries no raw names, roles, or photo
//! references, so it stays safe even where the storage medium is
//! inspectable.
//!
//! Failure policy: a game you can play beats strict durability of progress.
//! Every read, parse, or write failure here is logged and degraded: reads
//! fall back to "no data", writes become no-ops. Nothing in this module
//! returns an error to the engine.

pub mod mastery;
pub mod session;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::NamedeckError;

/// Current UTC time as epoch milliseconds
pub fn epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Handle to the progress database. Cheap to clone; clones share storage.
#[derive(Clone)]
pub struct GameDb {
    pub(crate) db: sled::Db,
}

impl GameDb {
    /// Open or create the progress database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NamedeckError> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "opened progress database");
        Ok(Self { db })
    }

    /// Read a JSON document, degrading any failure to `None`.
    pub(crate) fn get_doc<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.db.get(key.as_bytes()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read document, treating as absent");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "failed to parse document, treating as absent");
                None
            }
        }
    }

    /// Write a JSON document, degrading any failure to a no-op.
    pub(crate) fn put_doc<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize document, skipping write");
                return;
            }
        };
        if let Err(e) = self.db.insert(key.as_bytes(), bytes) {
            warn!(key, error = %e, "failed to write document, skipping write");
        }
    }

    /// Delete a document unconditionally, degrading any failure to a no-op.
    pub(crate) fn delete_doc(&self, key: &str) {
        if let Err(e) = self.db.remove(key.as_bytes()) {
            warn!(key, error = %e, "failed to delete document");
        }
    }
}

#[cfg(test)]
pub(crate) fn open_temp_db() -> (GameDb, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = GameDb::open(dir.path().join("progress.sled")).unwrap();
    (db, dir)
}
