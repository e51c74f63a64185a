use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::common::error::ArbiterError;

/// Score expressed in half-point units (2 == 1.0, 1 == 0.5).
///
/// Kept as an integer rather than `f64` so tie-break sums compare exactly;
/// see the floating-point note in the design docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct HalfPoints(pub i64);

impl HalfPoints {
    pub const ZERO: Self = HalfPoints(0);
    pub const HALF: Self = HalfPoints(1);
    pub const ONE: Self = HalfPoints(2);

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 2.0
    }

    pub fn from_rounds(rounds: u32) -> Self {
        HalfPoints(rounds as i64 * 2)
    }
}

impl Add for HalfPoints {
    type Output = HalfPoints;
    fn add(self, rhs: Self) -> Self::Output {
        HalfPoints(self.0 + rhs.0)
    }
}

impl AddAssign for HalfPoints {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for HalfPoints {
    type Output = HalfPoints;
    fn sub(self, rhs: Self) -> Self::Output {
        HalfPoints(self.0 - rhs.0)
    }
}

impl std::iter::Sum for HalfPoints {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HalfPoints::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for HalfPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}

/// Board color. `White` scores first in every pair representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Signed contribution to a color-history ledger (White = +1, Black = -1).
    pub fn sign(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

/// Outcome recorded on one side of a [`Matchup`](crate::domain::matchup::Matchup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
    Unset,
    Walkover,
}

/// The five legal unordered `{white, black}` result pairs (§4.1).
const LEGAL_PAIRS: [[MatchResult; 2]; 5] = [
    [MatchResult::Win, MatchResult::Loss],
    [MatchResult::Win, MatchResult::Walkover],
    [MatchResult::Walkover, MatchResult::Walkover],
    [MatchResult::Draw, MatchResult::Draw],
    [MatchResult::Unset, MatchResult::Unset],
];

/// Validates a `(white, black)` result pair against the legal set in §4.1.
pub fn validate_result_pair(white: MatchResult, black: MatchResult) -> Result<(), ArbiterError> {
    let matches = LEGAL_PAIRS.iter().any(|pair| {
        (pair[0] == white && pair[1] == black) || (pair[0] == black && pair[1] == white)
    });
    if matches {
        Ok(())
    } else {
        Err(ArbiterError::InvalidResult(white, black))
    }
}

/// Per-side score used for standings (§4.1 table): independent of the
/// opposite side's result, since the legal-pair invariant already pins it.
pub fn standings_score(result: MatchResult) -> HalfPoints {
    match result {
        MatchResult::Win => HalfPoints::ONE,
        MatchResult::Draw => HalfPoints::HALF,
        MatchResult::Loss | MatchResult::Walkover | MatchResult::Unset => HalfPoints::ZERO,
    }
}

/// Per-side valuation used when summing opponents' scores for Modified
/// Median / Solkoff (§4.5.1): a flat mapping distinct from [`standings_score`]
/// because a walkover here values at half a point rather than zero.
pub fn model_score(result: MatchResult) -> HalfPoints {
    match result {
        MatchResult::Win => HalfPoints::ONE,
        MatchResult::Draw | MatchResult::Walkover => HalfPoints::HALF,
        MatchResult::Loss | MatchResult::Unset => HalfPoints::ZERO,
    }
}
