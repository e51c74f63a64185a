use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::error::ArbiterError;
use crate::domain::matchup::Matchup;
use crate::domain::result::{Color, HalfPoints};

/// One round of a tournament: a fixed set of matchups, none of which may
/// share a player. `index` is 1-based, matching the round-file numbering
/// used by CSV import/export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub index: u32,
    matchups: Vec<Matchup>,
}

impl Round {
    pub fn new(index: u32, matchups: Vec<Matchup>) -> Result<Self, ArbiterError> {
        let mut seen = HashSet::new();
        for m in &matchups {
            let (w, b) = m.player_ids();
            if !seen.insert(w) || !seen.insert(b) {
                return Err(ArbiterError::DuplicatePairing(w, b, index));
            }
        }
        Ok(Round { index, matchups })
    }

    pub fn matchups(&self) -> &[Matchup] {
        &self.matchups
    }

    pub fn matchups_mut(&mut self) -> &mut [Matchup] {
        &mut self.matchups
    }

    pub fn player_ids(&self) -> HashSet<i64> {
        self.matchups
            .iter()
            .flat_map(|m| {
                let (w, b) = m.player_ids();
                [w, b]
            })
            .collect()
    }

    pub fn matchup_for_player(&self, player_id: i64) -> Option<&Matchup> {
        self.matchups
            .iter()
            .find(|m| m.color_of(player_id).is_some())
    }

    pub fn matchup_for_player_mut(&mut self, player_id: i64) -> Option<&mut Matchup> {
        self.matchups
            .iter_mut()
            .find(|m| m.color_of(player_id).is_some())
    }

    /// Every player's standings score for this round, 0 for anyone not
    /// paired. Unset results contribute `HalfPoints::ZERO`.
    pub fn standings_scores(&self) -> Vec<(i64, HalfPoints)> {
        self.matchups
            .iter()
            .flat_map(|m| {
                let (w, b) = m.player_ids();
                [
                    (w, m.standings_score(Color::White)),
                    (b, m.standings_score(Color::Black)),
                ]
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.matchups.iter().all(|m| !m.is_unset())
    }

    pub fn record_result(&mut self, player_id: i64, result: crate::domain::result::MatchResult) -> Result<(), ArbiterError> {
        let matchup = self
            .matchup_for_player_mut(player_id)
            .ok_or_else(|| ArbiterError::UnknownPlayer(player_id.to_string()))?;
        matchup.set_result(player_id, result)
    }
}
