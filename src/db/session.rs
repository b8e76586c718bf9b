//! In-flight game persistence
//!
//! Saves enough of a [`GameState`] to resume an interrupted game: the score,
//! the seen set, and the queue order, all as name hashes. The snapshot can
//! only be turned back into a `GameState` against a freshly fetched roster,
//! by resolving each hash to a live person. Hashes that no longer resolve
//! (someone left the directory, or was renamed since the snapshot) are
//! silently dropped rather than failing the resume.
//!
//! The missed-people list is intentionally not persisted: it exists for the
//! end-of-game review screen, and review history from a prior session is not
//! restorable. Only the work queue and the score survive.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GameDb;
use crate::engine::GameState;
use crate::identity::{name_hash, NameHash};
use crate::roster::Person;

/// Fixed storage key for the session document
pub const SESSION_KEY: &str = "session";

/// Hash-only projection of a [`GameState`]
#[derive(Debug, Serialize, Deserialize)]
struct SessionSnapshot {
    correct_answers: u32,
    game_over: bool,
    seen_hashes: BTreeSet<NameHash>,
    /// Queue front-to-back, order preserved
    main_queue_hashes: Vec<NameHash>,
    /// The full game roster, for resume-compatibility checks and the
    /// accuracy denominator
    roster_hashes: Vec<NameHash>,
}

/// Persists the active game between sessions
#[derive(Clone)]
pub struct SessionStore {
    db: GameDb,
}

impl SessionStore {
    pub fn new(db: GameDb) -> Self {
        Self { db }
    }

    /// Persist the state, replacing any prior snapshot.
    pub fn save(&self, state: &GameState) {
        let snapshot = SessionSnapshot {
            correct_answers: state.correct_answers,
            game_over: state.game_over,
            seen_hashes: state.seen_hashes.clone(),
            main_queue_hashes: hashes_of(state.main_queue.iter()),
            roster_hashes: hashes_of(state.roster.iter()),
        };
        self.db.put_doc(SESSION_KEY, &snapshot);
    }

    /// Rebuild a saved game against a freshly fetched roster.
    ///
    /// Returns `None` when there is nothing saved, the snapshot is
    /// unreadable, or the fresh roster is empty (there is nothing to resolve
    /// hashes against).
    pub fn load(&self, current_roster: &[Person]) -> Option<GameState> {
        if current_roster.is_empty() {
            return None;
        }
        let snapshot: SessionSnapshot = self.db.get_doc(SESSION_KEY)?;

        let by_hash: HashMap<NameHash, &Person> = current_roster
            .iter()
            .map(|person| (name_hash(&person.name), person))
            .collect();

        let roster = resolve(&snapshot.roster_hashes, &by_hash);
        let main_queue: VecDeque<Person> = resolve(&snapshot.main_queue_hashes, &by_hash).into();

        let dropped =
            snapshot.roster_hashes.len() - roster.len() + snapshot.main_queue_hashes.len()
                - main_queue.len();
        if dropped > 0 {
            debug!(dropped, "dropped hashes no longer in the directory");
        }

        Some(GameState {
            roster,
            main_queue,
            seen_hashes: snapshot.seen_hashes,
            correct_answers: snapshot.correct_answers,
            missed: Vec::new(),
            current: None,
            game_over: snapshot.game_over,
        })
    }

    /// Delete the snapshot unconditionally.
    pub fn clear(&self) {
        self.db.delete_doc(SESSION_KEY);
    }
}

fn hashes_of<'a>(people: impl Iterator<Item = &'a Person>) -> Vec<NameHash> {
    people.map(|person| name_hash(&person.name)).collect()
}

fn resolve(hashes: &[NameHash], by_hash: &HashMap<NameHash, &Person>) -> Vec<Person> {
    hashes
        .iter()
        .filter_map(|hash| by_hash.get(hash).map(|person| (*person).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_temp_db;

    fn person(name: &str) -> Person {
        Person::new(
            name,
            "Engineer",
            None,
            format!("https://pics/{}.jpg", crate::identity::identity_slug(name)),
        )
    }

    fn sample_state(roster: &[Person]) -> GameState {
        let mut state = GameState::fresh(roster.to_vec());
        // Simulate progress: first person answered and missed once
        let first = state.main_queue.pop_front().unwrap();
        state.seen_hashes.insert(name_hash(&first.name));
        state.correct_answers = 1;
        state.missed.push(first.clone());
        state.main_queue.push_back(first);
        state
    }

    #[test]
    fn roundtrip_preserves_score_queue_order_and_seen_set() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db);
        let roster = vec![person("Ada Lovelace"), person("Alan Turing"), person("Grace Hopper")];
        let state = sample_state(&roster);

        store.save(&state);
        let loaded = store.load(&roster).unwrap();

        assert_eq!(loaded.correct_answers, state.correct_answers);
        assert_eq!(loaded.game_over, state.game_over);
        assert_eq!(loaded.seen_hashes, state.seen_hashes);
        let saved_queue: Vec<_> = state.main_queue.iter().map(|p| p.name.clone()).collect();
        let loaded_queue: Vec<_> = loaded.main_queue.iter().map(|p| p.name.clone()).collect();
        assert_eq!(loaded_queue, saved_queue);
    }

    #[test]
    fn missed_list_is_always_empty_after_load() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db);
        let roster = vec![person("Ada Lovelace"), person("Alan Turing")];
        let state = sample_state(&roster);
        assert!(!state.missed.is_empty());

        store.save(&state);
        let loaded = store.load(&roster).unwrap();
        assert!(loaded.missed.is_empty());
        assert!(loaded.current.is_none());
    }

    #[test]
    fn departed_people_are_dropped_on_resume() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db);
        let roster = vec![person("Ada Lovelace"), person("Alan Turing"), person("Grace Hopper")];
        let state = GameState::fresh(roster.clone());

        store.save(&state);
        let reduced: Vec<Person> = roster
            .iter()
            .filter(|p| p.name != "Alan Turing")
            .cloned()
            .collect();
        let loaded = store.load(&reduced).unwrap();

        assert_eq!(loaded.roster.len(), 2);
        assert_eq!(loaded.main_queue.len(), 2);
        assert!(loaded.main_queue.iter().all(|p| p.name != "Alan Turing"));
    }

    #[test]
    fn empty_roster_cannot_resume() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db);
        let roster = vec![person("Ada Lovelace")];
        store.save(&GameState::fresh(roster));

        assert!(store.load(&[]).is_none());
    }

    #[test]
    fn absent_or_corrupt_snapshot_loads_as_none() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db.clone());
        let roster = vec![person("Ada Lovelace")];

        assert!(store.load(&roster).is_none());

        db.db
            .insert(SESSION_KEY.as_bytes(), &b"[not, a, snapshot"[..])
            .unwrap();
        assert!(store.load(&roster).is_none());
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db);
        let roster = vec![person("Ada Lovelace")];
        store.save(&GameState::fresh(roster.clone()));
        assert!(store.load(&roster).is_some());

        store.clear();
        assert!(store.load(&roster).is_none());
    }

    #[test]
    fn persisted_bytes_contain_no_pii() {
        let (db, _dir) = open_temp_db();
        let store = SessionStore::new(db.clone());
        let roster = vec![
            Person::new(
                "Zelda Fitzgerald",
                "Novelist",
                Some("Montgomery".to_string()),
                "https://pics/zelda.jpg",
            ),
            person("Ada Lovelace"),
        ];
        store.save(&sample_state(&roster));

        let bytes = db.db.get(SESSION_KEY.as_bytes()).unwrap().unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        for fragment in ["Zelda", "Fitzgerald", "Novelist", "Montgomery", "zelda.jpg", "Ada"] {
            assert!(!raw.contains(fragment), "found {:?} in persisted bytes", fragment);
        }
    }
}
