//! Game engine
//!
//! Runs one flashcards session over a roster: a FIFO work queue with
//! round-robin retry. Every person starts in the queue; a correct answer
//! retires them, an incorrect answer sends them to the back of the queue to
//! come around again. The game completes when the queue drains.
//!
//! ## Lifecycle
//!
//! ```text
//! start(roster)          resume from session store, or shuffle fresh
//!     ↓
//! next() ──────────────→ Card { person, is_retry, already_mastered }
//!     ↓                      or Complete(FinalReport) when the queue is empty
//! options()              correct person + shuffled distractors
//!     ↓
//! answer(id) ──────────→ Verdict + ScheduledAdvance   (engine locks)
//!     ↓  UI waits delay
//! advance(token)         engine unlocks; stale tokens are discarded
//!     ↓
//! next() ...
//! ```
//!
//! The engine owns its [`GameState`] outright; there is no ambient global
//! session. Every answer is persisted through the session store before the
//! verdict is returned, so a closed game resumes where it left off.

mod pacing;

pub use pacing::ScheduledAdvance;

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::Config;
use crate::db::mastery::MasteryStore;
use crate::db::session::SessionStore;
use crate::db::GameDb;
use crate::error::NamedeckError;
use crate::identity::{name_hash, NameHash};
use crate::roster::Person;

/// One active session. Owned exclusively by a [`GameEngine`]; the session
/// store only ever sees a hash projection of it.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The full game roster, fixed at start; accuracy denominator and
    /// distractor pool
    pub roster: Vec<Person>,
    /// FIFO work queue; incorrect answers requeue at the back
    pub main_queue: VecDeque<Person>,
    /// Hashes ever shown this session. Monotonic; entries are only added.
    pub seen_hashes: BTreeSet<NameHash>,
    pub correct_answers: u32,
    /// People answered incorrectly at least once, deduplicated by hash.
    /// End-of-game review only; never restored across sessions.
    pub missed: Vec<Person>,
    /// The person currently on the card, if one is showing
    pub current: Option<Person>,
    pub game_over: bool,
}

impl GameState {
    /// Fresh state with the whole roster queued in the given order.
    pub fn fresh(roster: Vec<Person>) -> Self {
        Self {
            main_queue: roster.iter().cloned().collect(),
            roster,
            seen_hashes: BTreeSet::new(),
            correct_answers: 0,
            missed: Vec::new(),
            current: None,
            game_over: false,
        }
    }
}

/// A flashcard ready to show
#[derive(Debug, Clone)]
pub struct Card {
    pub person: Person,
    /// Whether this person already came around this session (a retry)
    pub is_retry: bool,
    /// Whether long-term mastery already covers this person
    pub already_mastered: bool,
}

/// One answer option as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOption {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl AnswerOption {
    fn from_person(person: &Person) -> Self {
        Self {
            id: person.identity_id.clone(),
            name: person.name.clone(),
            role: person.role.clone(),
        }
    }
}

/// Result of scoring an answer
#[derive(Debug, Clone)]
pub struct Verdict {
    pub correct: bool,
    /// Identity id of the right answer, for highlighting
    pub correct_id: String,
    /// Redeem after the feedback delay to unlock the next card
    pub advance: ScheduledAdvance,
}

/// What `next()` yields
#[derive(Debug, Clone)]
pub enum Turn {
    Card(Card),
    Complete(FinalReport),
}

/// End-of-game summary
#[derive(Debug, Clone)]
pub struct FinalReport {
    pub total: usize,
    pub correct: u32,
    /// Percent of the roster answered correctly, rounded to nearest integer
    pub accuracy: u32,
    pub missed: Vec<Person>,
    pub perfect: bool,
}

/// Live counters for the stats row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub remaining: usize,
    pub correct: u32,
    pub missed: usize,
}

/// The flashcards state machine
pub struct GameEngine {
    mastery: MasteryStore,
    session: SessionStore,
    option_count: usize,
    correct_delay: Duration,
    incorrect_delay: Duration,
    state: Option<GameState>,
    /// Set between `answer` and `advance`; blocks double scoring
    locked: bool,
    /// Bumped on every start/reset; stale advance tokens fail the match
    generation: u64,
}

impl GameEngine {
    pub fn new(db: GameDb, config: &Config) -> Self {
        Self {
            mastery: MasteryStore::new(db.clone(), config),
            session: SessionStore::new(db),
            option_count: config.option_count.max(1),
            correct_delay: Duration::from_millis(config.correct_delay_ms),
            incorrect_delay: Duration::from_millis(config.incorrect_delay_ms),
            state: None,
            locked: false,
            generation: 0,
        }
    }

    /// Begin a session: resume the saved game if it is still compatible with
    /// the roster, otherwise shuffle fresh. The resulting state is persisted
    /// immediately.
    ///
    /// An empty roster is the one user-visible failure in the engine; there
    /// is nothing to quiz.
    pub fn start(&mut self, roster: Vec<Person>) -> Result<(), NamedeckError> {
        if roster.is_empty() {
            return Err(NamedeckError::EmptyRoster);
        }
        self.generation += 1;
        self.locked = false;

        let (state, resumed) = match self.session.load(&roster) {
            Some(saved) if !saved.main_queue.is_empty() && !saved.roster.is_empty() => {
                (saved, true)
            }
            _ => {
                let mut shuffled = roster;
                shuffled.shuffle(&mut rand::thread_rng());
                (GameState::fresh(shuffled), false)
            }
        };

        info!(
            total = state.roster.len(),
            remaining = state.main_queue.len(),
            resumed,
            "game started"
        );
        self.session.save(&state);
        self.state = Some(state);
        Ok(())
    }

    /// Pop the next card off the queue, or complete the game when the queue
    /// has drained. Refused while an answer is waiting to advance.
    pub fn next(&mut self) -> Result<Turn, NamedeckError> {
        if self.locked {
            return Err(NamedeckError::AnswerLocked);
        }
        let state = self.state.as_mut().ok_or(NamedeckError::NotStarted)?;

        let person = match state.main_queue.pop_front() {
            Some(person) => person,
            None => {
                state.game_over = true;
                state.current = None;
                self.session.save(state);
                let report = final_report(state);
                info!(
                    correct = report.correct,
                    accuracy = report.accuracy,
                    missed = report.missed.len(),
                    "game complete"
                );
                return Ok(Turn::Complete(report));
            }
        };

        // Seen before this pop means the card is a retry
        let is_retry = !state.seen_hashes.insert(name_hash(&person.name));
        let already_mastered = self.mastery.is_mastered(&person.name);
        state.current = Some(person.clone());
        debug!(remaining = state.main_queue.len(), is_retry, "showing card");

        Ok(Turn::Card(Card {
            person,
            is_retry,
            already_mastered,
        }))
    }

    /// Answer set for the current card: the asked person plus shuffled
    /// distractors, the whole set shuffled again so the correct position is
    /// uniformly random. A small roster simply yields fewer options.
    pub fn options(&self) -> Result<Vec<AnswerOption>, NamedeckError> {
        let state = self.state.as_ref().ok_or(NamedeckError::NotStarted)?;
        let current = state.current.as_ref().ok_or(NamedeckError::NoActiveCard)?;

        let mut rng = rand::thread_rng();
        let mut others: Vec<&Person> = state
            .roster
            .iter()
            .filter(|person| person.identity_id != current.identity_id)
            .collect();
        others.shuffle(&mut rng);

        let mut options: Vec<AnswerOption> = std::iter::once(current)
            .chain(others.into_iter().take(self.option_count - 1))
            .map(AnswerOption::from_person)
            .collect();
        options.shuffle(&mut rng);
        Ok(options)
    }

    /// Score the selected option against the current card.
    ///
    /// Correct answers retire the person and feed long-term mastery;
    /// incorrect answers requeue them at the back (unless already queued)
    /// and note them for the review list. The updated state is persisted
    /// before the verdict is returned, and the engine locks until the
    /// verdict's advance token is redeemed.
    pub fn answer(&mut self, selected_id: &str) -> Result<Verdict, NamedeckError> {
        if self.locked {
            return Err(NamedeckError::AnswerLocked);
        }
        let state = self.state.as_mut().ok_or(NamedeckError::NotStarted)?;
        let current = state.current.clone().ok_or(NamedeckError::NoActiveCard)?;

        let correct = selected_id == current.identity_id;
        let delay = if correct {
            state.correct_answers += 1;
            let count = self.mastery.record_correct(&current.name);
            debug!(count, "correct answer");
            self.correct_delay
        } else {
            let hash = name_hash(&current.name);
            if !state.missed.iter().any(|p| name_hash(&p.name) == hash) {
                state.missed.push(current.clone());
            }
            if !state.main_queue.iter().any(|p| name_hash(&p.name) == hash) {
                state.main_queue.push_back(current.clone());
            }
            debug!(remaining = state.main_queue.len(), "incorrect answer, requeued");
            self.incorrect_delay
        };

        self.session.save(state);
        self.locked = true;
        Ok(Verdict {
            correct,
            correct_id: current.identity_id,
            advance: ScheduledAdvance::new(self.generation, delay),
        })
    }

    /// Redeem an advance token, unlocking the next card. Returns whether the
    /// token belonged to the current game; a stale token (issued before a
    /// reset or restart) is discarded without touching state.
    pub fn advance(&mut self, token: ScheduledAdvance) -> bool {
        if token.generation != self.generation {
            debug!("discarding stale advance token from a previous game");
            return false;
        }
        self.locked = false;
        true
    }

    /// Abandon the current session and start over with a fresh roster.
    /// Long-term mastery is untouched; clear it separately when the user
    /// really wants to forget everything.
    pub fn reset(&mut self, roster: Vec<Person>) -> Result<(), NamedeckError> {
        self.session.clear();
        self.start(roster)
    }

    /// Live counters for the stats row. Zeros before `start`.
    pub fn stats(&self) -> SessionStats {
        match &self.state {
            Some(state) => SessionStats {
                remaining: state.main_queue.len(),
                correct: state.correct_answers,
                missed: state.missed.len(),
            },
            None => SessionStats::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.as_ref().map_or(false, |state| state.game_over)
    }

    /// Read access to the live state, if a game has been started.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// The long-term mastery store backing this engine.
    pub fn mastery(&self) -> &MasteryStore {
        &self.mastery
    }
}

fn final_report(state: &GameState) -> FinalReport {
    let total = state.roster.len();
    let accuracy = if total == 0 {
        0
    } else {
        ((state.correct_answers as f64 / total as f64) * 100.0).round() as u32
    };
    FinalReport {
        total,
        correct: state.correct_answers,
        accuracy,
        missed: state.missed.clone(),
        perfect: state.missed.is_empty(),
    }
}
