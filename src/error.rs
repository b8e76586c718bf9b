//! Error types for namedeck
//!
//! Storage failures deliberately do not appear here: the stores degrade to
//! "no data" with a warning instead of erroring, so a flaky disk can cost
//! saved progress but never a playable game.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NamedeckError {
    #[error("no usable people in roster")]
    EmptyRoster,

    #[error("game has not been started")]
    NotStarted,

    #[error("no card is currently showing")]
    NoActiveCard,

    #[error("answer already submitted, waiting to advance")]
    AnswerLocked,

    #[error("roster error: {0}")]
    Roster(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sled::Error),
}
