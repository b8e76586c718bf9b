//! Roster acquisition
//!
//! The engine is fed a list of [`Person`] records by a [`RosterSource`].
//! Host-specific extraction (whatever directory UI or export format is in
//! play) lives behind that one interface; the engine never sees where the
//! roster came from. [`JsonRosterFile`] is the bundled implementation: a JSON
//! array exported from a directory page.
//!
//! Malformed entries are skipped with a warning, never fatal. Entries whose
//! names collapse to the same identity id are deduplicated here; the engine
//! treats unique ids as a precondition.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::NamedeckError;
use crate::identity::identity_slug;

/// One directory entry, freshly extracted. Never persisted; only its
/// name hash ever reaches storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Display name, the natural identity key
    pub name: String,
    /// Job title
    pub role: String,
    /// Office or region, when the directory exposes one
    pub location: Option<String>,
    /// Photo reference shown on the card
    pub photo_url: String,
    /// Stable answer id within one extraction pass
    pub identity_id: String,
}

impl Person {
    /// Build a person, deriving the identity id from the name.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        location: Option<String>,
        photo_url: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let identity_id = identity_slug(&name);
        Self {
            name,
            role: role.into(),
            location,
            photo_url: photo_url.into(),
            identity_id,
        }
    }
}

/// Source of directory entries for a game.
pub trait RosterSource {
    /// Fetch a fresh roster. Implementations validate entries; the engine
    /// expects non-empty names, roles, and photo references.
    fn fetch(&self) -> Result<Vec<Person>, NamedeckError>;
}

/// Raw roster entry as found in an export file. Fields are optional so one
/// bad entry cannot fail the whole parse.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

/// Roster read from a JSON array export.
pub struct JsonRosterFile {
    path: PathBuf,
}

impl JsonRosterFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RosterSource for JsonRosterFile {
    fn fetch(&self) -> Result<Vec<Person>, NamedeckError> {
        let content = std::fs::read_to_string(&self.path)?;
        let raw: Vec<RawEntry> = serde_json::from_str(&content)
            .map_err(|e| NamedeckError::Roster(format!("unreadable roster file: {}", e)))?;

        let total = raw.len();
        let mut people: Vec<Person> = Vec::new();
        for (index, entry) in raw.into_iter().enumerate() {
            match validate(entry) {
                Some(person) => {
                    if people.iter().any(|p| p.identity_id == person.identity_id) {
                        warn!(index, "skipping roster entry with duplicate identity");
                        continue;
                    }
                    people.push(person);
                }
                None => warn!(index, "skipping malformed roster entry"),
            }
        }

        debug!(usable = people.len(), total, "loaded roster");
        Ok(people)
    }
}

fn validate(entry: RawEntry) -> Option<Person> {
    let name = non_blank(entry.name)?;
    let role = non_blank(entry.role)?;
    let photo_url = non_blank(entry.photo_url)?;
    let location = entry.location.and_then(|l| {
        let l = l.trim().to_string();
        if l.is_empty() {
            None
        } else {
            Some(l)
        }
    });
    Some(Person::new(name, role, location, photo_url))
}

fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_roster(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_valid_entries() {
        let (_dir, path) = write_roster(
            r#"[
                {"name": "Ada Lovelace", "role": "Engineer", "location": "London", "photo_url": "https://pics/ada.jpg"},
                {"name": "Alan Turing", "role": "Researcher", "photo_url": "https://pics/alan.jpg"}
            ]"#,
        );

        let people = JsonRosterFile::new(&path).fetch().unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].identity_id, "adalovelace");
        assert_eq!(people[0].location.as_deref(), Some("London"));
        assert_eq!(people[1].location, None);
    }

    #[test]
    fn skips_entries_missing_required_fields() {
        let (_dir, path) = write_roster(
            r#"[
                {"name": "Ada Lovelace", "role": "Engineer", "photo_url": "https://pics/ada.jpg"},
                {"name": "  ", "role": "Ghost", "photo_url": "https://pics/ghost.jpg"},
                {"name": "No Photo", "role": "Engineer"},
                {"role": "Anonymous", "photo_url": "https://pics/anon.jpg"}
            ]"#,
        );

        let people = JsonRosterFile::new(&path).fetch().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Ada Lovelace");
    }

    #[test]
    fn collapses_duplicate_identities() {
        let (_dir, path) = write_roster(
            r#"[
                {"name": "Ada Lovelace", "role": "Engineer", "photo_url": "https://pics/ada1.jpg"},
                {"name": "ADA LOVELACE", "role": "Engineer", "photo_url": "https://pics/ada2.jpg"}
            ]"#,
        );

        let people = JsonRosterFile::new(&path).fetch().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].photo_url, "https://pics/ada1.jpg");
    }

    #[test]
    fn unreadable_file_is_a_roster_error() {
        let (_dir, path) = write_roster("not json at all");
        let err = JsonRosterFile::new(&path).fetch().unwrap_err();
        assert!(matches!(err, NamedeckError::Roster(_)));
    }
}
