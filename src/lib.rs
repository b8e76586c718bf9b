//! Namedeck - flashcards engine for learning colleague names
//!
//! Quizzes you on a directory roster: a photo, four names, pick the right
//! one. Misses come back around until every face is matched; progress
//! accumulates across sessions so names you already know get flagged.
//!
//! ## Architecture
//!
//! ```text
//! RosterSource (host-specific extraction)
//!     ↓ Vec<Person>
//! GameEngine (queue/retry state machine)
//!     ↕
//! GameDb (sled)
//! ├── mastery   long-term correctness records
//! └── session   in-flight game snapshot
//! ```
//!
//! ## Privacy
//!
//! Nothing personally identifiable is ever persisted. Both stored documents
//! key people by a non-reversible name digest ([`identity::name_hash`]);
//! full records exist only in memory, rebuilt on every run from a fresh
//! roster fetch. A saved game referencing people who have since left the
//! directory simply drops them on resume.
//!
//! ## Storage layout
//!
//! ```text
//! ~/.local/share/namedeck/
//! ├── progress.sled/         # Mastery + session documents
//! └── config.toml            # Configuration
//! ```

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod identity;
pub mod roster;

// Re-exports
pub use config::Config;
pub use db::mastery::{MasteryStats, MasteryStore};
pub use db::session::SessionStore;
pub use db::GameDb;
pub use engine::{
    AnswerOption, Card, FinalReport, GameEngine, GameState, ScheduledAdvance, SessionStats, Turn,
    Verdict,
};
pub use error::NamedeckError;
pub use roster::{JsonRosterFile, Person, RosterSource};
