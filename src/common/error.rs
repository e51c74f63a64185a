use thiserror::Error;

use crate::domain::result::MatchResult;

/// Error taxonomy for the tournament engine.
///
/// Every fallible operation in the core returns one of these variants; the
/// engine never silently substitutes a default value for an invalid state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArbiterError {
    #[error("matchup result pair ({0:?}, {1:?}) is not a legal combination")]
    InvalidResult(MatchResult, MatchResult),

    #[error("round {0} contains unset results, cannot continue")]
    IncompleteRound(u32),

    #[error("players {0} and {1} have already been paired in round {2}")]
    DuplicatePairing(i64, i64, u32),

    #[error("assigning a color to player {0} would create three consecutive identical colors")]
    ColorStreakViolation(i64),

    #[error("swiss assigner exhausted all {0} brute-force attempts without a legal pairing")]
    PairingExhausted(u32),

    #[error("odd player counts are not supported, got {0} players")]
    OddRosterUnsupported(usize),

    #[error("no completed rounds yet, standings could not be calculated")]
    NoCompletedRounds,

    #[error("unknown tie-break method: {0}")]
    UnknownTieBreakMethod(String),

    #[error("unreadable score literal: {0:?}")]
    UnreadableScore(String),

    #[error("could not match player from column value: {0:?}")]
    UnknownPlayer(String),

    #[error("round index mismatch: expected {expected}, got {actual}")]
    RoundIndexMismatch { expected: u32, actual: u32 },

    #[error("invalid tournament configuration: {0}")]
    InvalidConfig(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<csv::Error> for ArbiterError {
    fn from(err: csv::Error) -> Self {
        ArbiterError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for ArbiterError {
    fn from(err: std::io::Error) -> Self {
        ArbiterError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArbiterError>;
