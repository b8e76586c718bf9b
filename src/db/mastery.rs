//! Long-term mastery records
//!
//! Tracks how often, and when, each person was answered correctly, keyed by
//! name hash so nothing personally identifiable is stored. Records survive
//! across game sessions and are only removed by an explicit full reset.
//!
//! A name counts as mastered once it has been answered correctly at least
//! `threshold` times AND the latest correct answer falls inside a rolling
//! recency window; knowledge that has not been exercised in a month is
//! treated as stale and the name comes back into rotation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{epoch_ms, GameDb};
use crate::config::Config;
use crate::identity::{name_hash, NameHash};

/// Fixed storage key for the mastery document
pub const MASTERY_KEY: &str = "mastery";

/// Per-hash correctness record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryRecord {
    /// Times answered correctly, monotonically incremented
    pub correct_count: u32,
    /// When the first correct answer landed, epoch ms
    pub first_correct_at: i64,
    /// When the latest correct answer landed, epoch ms
    pub last_correct_at: i64,
}

/// Counts for end-of-session display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteryStats {
    /// Hashes with at least one correct answer on record
    pub tracked: usize,
    /// Hashes currently inside the mastered threshold and window
    pub mastered: usize,
}

/// Durable per-name correctness store
#[derive(Clone)]
pub struct MasteryStore {
    db: GameDb,
    threshold: u32,
    window_ms: i64,
}

impl MasteryStore {
    pub fn new(db: GameDb, config: &Config) -> Self {
        Self {
            db,
            threshold: config.mastery_threshold,
            window_ms: config.mastery_window_days * 24 * 60 * 60 * 1000,
        }
    }

    /// Record one correct answer for `name`, returning the updated count.
    ///
    /// One full read-modify-write of the persisted map per call.
    pub fn record_correct(&self, name: &str) -> u32 {
        self.record_correct_at(name, epoch_ms())
    }

    fn record_correct_at(&self, name: &str, now_ms: i64) -> u32 {
        let mut map = self.load_map();
        let record = map
            .entry(name_hash(name))
            .and_modify(|record| {
                record.correct_count += 1;
                record.last_correct_at = now_ms;
            })
            .or_insert(MasteryRecord {
                correct_count: 1,
                first_correct_at: now_ms,
                last_correct_at: now_ms,
            });
        let count = record.correct_count;
        self.db.put_doc(MASTERY_KEY, &map);
        debug!(count, "recorded correct answer");
        count
    }

    /// Whether `name` is currently considered known: enough correct answers,
    /// the latest of them recent. Unknown names, an empty store, and corrupt
    /// data all come back `false`.
    pub fn is_mastered(&self, name: &str) -> bool {
        self.is_mastered_at(name, epoch_ms())
    }

    fn is_mastered_at(&self, name: &str, now_ms: i64) -> bool {
        match self.load_map().get(&name_hash(name)) {
            Some(record) => {
                record.correct_count >= self.threshold
                    && record.last_correct_at > now_ms - self.window_ms
            }
            None => false,
        }
    }

    /// Drop every mastery record unconditionally.
    pub fn clear_all(&self) {
        self.db.delete_doc(MASTERY_KEY);
    }

    /// Counts over the whole store, for end-of-session display.
    pub fn stats(&self) -> MasteryStats {
        self.stats_at(epoch_ms())
    }

    fn stats_at(&self, now_ms: i64) -> MasteryStats {
        let map = self.load_map();
        let mastered = map
            .values()
            .filter(|record| {
                record.correct_count >= self.threshold
                    && record.last_correct_at > now_ms - self.window_ms
            })
            .count();
        MasteryStats {
            tracked: map.len(),
            mastered,
        }
    }

    fn load_map(&self) -> BTreeMap<NameHash, MasteryRecord> {
        self.db.get_doc(MASTERY_KEY).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_temp_db;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn store() -> (MasteryStore, tempfile::TempDir) {
        let (db, dir) = open_temp_db();
        (MasteryStore::new(db, &Config::default()), dir)
    }

    #[test]
    fn first_correct_creates_record_with_both_stamps() {
        let (store, _dir) = store();
        assert_eq!(store.record_correct_at("Ada Lovelace", 1_000), 1);

        let map = store.load_map();
        let record = map.get(&name_hash("Ada Lovelace")).unwrap();
        assert_eq!(record.correct_count, 1);
        assert_eq!(record.first_correct_at, 1_000);
        assert_eq!(record.last_correct_at, 1_000);
    }

    #[test]
    fn later_corrects_increment_and_keep_first_stamp() {
        let (store, _dir) = store();
        store.record_correct_at("Ada Lovelace", 1_000);
        store.record_correct_at("Ada Lovelace", 2_000);
        assert_eq!(store.record_correct_at("Ada Lovelace", 3_000), 3);

        let map = store.load_map();
        let record = map.get(&name_hash("Ada Lovelace")).unwrap();
        assert_eq!(record.first_correct_at, 1_000);
        assert_eq!(record.last_correct_at, 3_000);
    }

    #[test]
    fn unknown_name_is_not_mastered() {
        let (store, _dir) = store();
        assert!(!store.is_mastered("Nobody Inparticular"));
    }

    #[test]
    fn mastery_needs_threshold_and_recency() {
        let (store, _dir) = store();
        let now = 100 * DAY_MS;

        store.record_correct_at("Ada Lovelace", now - DAY_MS);
        store.record_correct_at("Ada Lovelace", now - DAY_MS);
        assert!(!store.is_mastered_at("Ada Lovelace", now), "below threshold");

        store.record_correct_at("Ada Lovelace", now - DAY_MS);
        assert!(store.is_mastered_at("Ada Lovelace", now));

        // Same record, evaluated after the window has elapsed
        assert!(
            !store.is_mastered_at("Ada Lovelace", now + 31 * DAY_MS),
            "mastery decays without new interaction"
        );
    }

    #[test]
    fn clear_all_removes_every_record() {
        let (store, _dir) = store();
        let now = 100 * DAY_MS;
        for _ in 0..3 {
            store.record_correct_at("Ada Lovelace", now);
        }
        assert!(store.is_mastered_at("Ada Lovelace", now));

        store.clear_all();
        assert!(!store.is_mastered_at("Ada Lovelace", now));
        assert_eq!(store.stats_at(now).tracked, 0);
    }

    #[test]
    fn corrupt_document_degrades_to_empty() {
        let (store, _dir) = store();
        store
            .db
            .db
            .insert(MASTERY_KEY.as_bytes(), &b"{definitely not json"[..])
            .unwrap();

        assert!(!store.is_mastered_at("Ada Lovelace", 1_000));
        // Writing through the corruption starts a fresh map
        assert_eq!(store.record_correct_at("Ada Lovelace", 1_000), 1);
        assert_eq!(store.stats_at(1_000).tracked, 1);
    }

    #[test]
    fn stats_count_tracked_and_mastered() {
        let (store, _dir) = store();
        let now = 100 * DAY_MS;
        for _ in 0..3 {
            store.record_correct_at("Ada Lovelace", now - DAY_MS);
        }
        store.record_correct_at("Alan Turing", now - DAY_MS);

        let stats = store.stats_at(now);
        assert_eq!(stats.tracked, 2);
        assert_eq!(stats.mastered, 1);
    }
}
