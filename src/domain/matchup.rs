use serde::{Deserialize, Serialize};

use crate::common::error::ArbiterError;
use crate::domain::result::{self, Color, HalfPoints, MatchResult};

/// One side of a matchup: the player occupying a color, with their result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMatch {
    pub player_id: i64,
    pub result: MatchResult,
}

impl PlayerMatch {
    pub fn new(player_id: i64, result: MatchResult) -> Self {
        PlayerMatch { player_id, result }
    }

    pub fn unset(player_id: i64) -> Self {
        PlayerMatch::new(player_id, MatchResult::Unset)
    }
}

/// A single game between two players, one per [`Color`]. The `(white, black)`
/// result pair must always belong to the legal set in §4.1; any write
/// revalidates via [`Matchup::set_results`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    white: PlayerMatch,
    black: PlayerMatch,
}

impl Matchup {
    pub fn new(white: PlayerMatch, black: PlayerMatch) -> Result<Self, ArbiterError> {
        result::validate_result_pair(white.result, black.result)?;
        Ok(Matchup { white, black })
    }

    pub fn unset(white_id: i64, black_id: i64) -> Self {
        Matchup {
            white: PlayerMatch::unset(white_id),
            black: PlayerMatch::unset(black_id),
        }
    }

    pub fn side(&self, color: Color) -> &PlayerMatch {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn white(&self) -> &PlayerMatch {
        &self.white
    }

    pub fn black(&self) -> &PlayerMatch {
        &self.black
    }

    pub fn player_ids(&self) -> (i64, i64) {
        (self.white.player_id, self.black.player_id)
    }

    /// Unordered pair, used for duplicate-pairing checks.
    pub fn unordered_pair(&self) -> (i64, i64) {
        let (a, b) = self.player_ids();
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn color_of(&self, player_id: i64) -> Option<Color> {
        if self.white.player_id == player_id {
            Some(Color::White)
        } else if self.black.player_id == player_id {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_unset(&self) -> bool {
        self.white.result == MatchResult::Unset
    }

    pub fn is_walkover_pair(&self) -> bool {
        self.white.result == MatchResult::Walkover || self.black.result == MatchResult::Walkover
    }

    /// Rewrites the result for whichever side `player_id` occupies, leaving
    /// the opposite side's result untouched, then revalidates.
    ///
    /// Both sides start `Unset`, and the legal set (§4.1) never contains a
    /// pair with exactly one `Unset` side, so a single-sided write is only
    /// checked against the legal set once *both* sides hold a real result;
    /// until then the matchup is simply incomplete. This lets a caller record
    /// one side now and the other later (or correct an already-complete
    /// side), rather than requiring both results atomically.
    pub fn set_result(&mut self, player_id: i64, result: MatchResult) -> Result<(), ArbiterError> {
        let color = self
            .color_of(player_id)
            .ok_or_else(|| ArbiterError::UnknownPlayer(player_id.to_string()))?;
        let (new_white, new_black) = match color {
            Color::White => (result, self.black.result),
            Color::Black => (self.white.result, result),
        };
        if new_white != MatchResult::Unset && new_black != MatchResult::Unset {
            result::validate_result_pair(new_white, new_black)?;
        }
        match color {
            Color::White => self.white.result = result,
            Color::Black => self.black.result = result,
        }
        Ok(())
    }

    pub fn standings_score(&self, color: Color) -> HalfPoints {
        result::standings_score(self.side(color).result)
    }

    pub fn model_score(&self, color: Color) -> HalfPoints {
        result::model_score(self.side(color).result)
    }
}
