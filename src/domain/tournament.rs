use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::common::error::ArbiterError;
use crate::domain::history::{self, Until};
use crate::domain::player::Player;
use crate::domain::result::{HalfPoints, MatchResult};
use crate::domain::round::Round;
use crate::service::{berger, swiss, tiebreak};

/// Which generator produces each round. Replaces runtime polymorphism over
/// assigner variants with a tagged dispatch in [`Tournament::generate_next_round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundSystem {
    Swiss,
    Berger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieBreakSwiss {
    ModifiedMedian,
    Solkoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieBreakRoundRobin {
    SonnebornBerger,
    Koya,
}

/// A single player's row in a standings report (§6.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub identifier: i64,
    pub display_name: String,
    pub score: HalfPoints,
    pub tie_breaks: Vec<(String, f64)>,
}

/// The tournament aggregate: the sole mutable owner of its players and
/// rounds (§9's re-architecture away from cyclic back-references).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub name: String,
    players: Vec<Player>,
    rounds: Vec<Round>,
    pub round_count: u32,
    pub round_system: RoundSystem,
    pub tie_break_swiss: Vec<TieBreakSwiss>,
    pub tie_break_round_robin: Vec<TieBreakRoundRobin>,
}

impl Tournament {
    pub fn new(
        name: impl Into<String>,
        players: Vec<Player>,
        round_count: u32,
        round_system: RoundSystem,
        tie_break_swiss: Vec<TieBreakSwiss>,
        tie_break_round_robin: Vec<TieBreakRoundRobin>,
    ) -> Result<Self, ArbiterError> {
        if players.len() % 2 != 0 {
            return Err(ArbiterError::OddRosterUnsupported(players.len()));
        }
        Ok(Tournament {
            name: name.into(),
            players,
            rounds: Vec::new(),
            round_count,
            round_system,
            tie_break_swiss,
            tie_break_round_robin,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn player_ids(&self) -> Vec<i64> {
        self.players.iter().map(|p| p.identifier).collect()
    }

    fn rank_index(&self) -> HashMap<i64, usize> {
        self.players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.identifier, i))
            .collect()
    }

    pub fn get_round_by_index(&self, index: u32) -> Option<&Round> {
        self.rounds.get(index.checked_sub(1)? as usize)
    }

    pub fn last_complete_round_index(&self) -> Option<u32> {
        history::last_complete_round_index(&self.rounds)
    }

    /// Appends a generated or externally-built round, enforcing §4.6:
    /// the index must continue the sequence and no unordered pair may ever
    /// repeat across the tournament. The round is discarded on violation.
    #[tracing::instrument(skip(self, round), fields(index = round.index))]
    pub fn append_round(&mut self, round: Round) -> Result<(), ArbiterError> {
        let expected = self.rounds.len() as u32 + 1;
        if round.index != expected {
            tracing::warn!(expected, actual = round.index, "round index mismatch, rejecting append");
            return Err(ArbiterError::RoundIndexMismatch {
                expected,
                actual: round.index,
            });
        }
        let mut seen: std::collections::HashSet<(i64, i64)> = std::collections::HashSet::new();
        for r in &self.rounds {
            for m in r.matchups() {
                seen.insert(m.unordered_pair());
            }
        }
        for m in round.matchups() {
            let pair = m.unordered_pair();
            if !seen.insert(pair) {
                tracing::warn!(a = pair.0, b = pair.1, "duplicate pairing, rolling back append");
                return Err(ArbiterError::DuplicatePairing(pair.0, pair.1, round.index));
            }
        }
        tracing::debug!(matchups = round.matchups().len(), "round appended");
        self.rounds.push(round);
        Ok(())
    }

    pub fn record_result(
        &mut self,
        round_idx: u32,
        player_id: i64,
        result: MatchResult,
    ) -> Result<(), ArbiterError> {
        let round = self
            .rounds
            .get_mut(round_idx.checked_sub(1).ok_or_else(|| {
                ArbiterError::RoundIndexMismatch {
                    expected: round_idx,
                    actual: round_idx,
                }
            })? as usize)
            .ok_or(ArbiterError::RoundIndexMismatch {
                expected: round_idx,
                actual: round_idx,
            })?;
        round.record_result(player_id, result)
    }

    pub fn validate_no_incomplete_match_results_in_rounds(&self) -> Result<(), ArbiterError> {
        for round in &self.rounds {
            if !round.is_complete() {
                return Err(ArbiterError::IncompleteRound(round.index));
            }
        }
        Ok(())
    }

    pub fn standings(&self, until: Until) -> Result<Vec<(i64, HalfPoints)>, ArbiterError> {
        history::standings(&self.rounds, &self.player_ids(), until)
    }

    /// Dispatches to the Swiss or Berger generator (§4.6) and appends the
    /// result, revalidating the tournament's invariants.
    #[tracing::instrument(skip(self, rng), fields(tournament = %self.name, round_system = ?self.round_system))]
    pub fn generate_next_round(&mut self, rng: &mut StdRng) -> Result<(), ArbiterError> {
        self.validate_no_incomplete_match_results_in_rounds()?;
        let next_index = self.rounds.len() as u32 + 1;
        tracing::info!(next_index, "generating next round");

        match self.round_system {
            // Berger produces the entire schedule in one shot (§4.3); once
            // it exists there is nothing further to generate.
            RoundSystem::Berger if self.rounds.is_empty() => {
                for round in berger::generate_schedule(&self.player_ids())? {
                    self.append_round(round)?;
                }
                Ok(())
            }
            RoundSystem::Berger => Ok(()),
            RoundSystem::Swiss if self.rounds.is_empty() => {
                self.append_round(initial_round(&self.players))
            }
            RoundSystem::Swiss => {
                let round = self.generate_swiss_round(next_index, rng)?;
                self.append_round(round)
            }
        }
    }

    fn generate_swiss_round(&self, next_index: u32, rng: &mut StdRng) -> Result<Round, ArbiterError> {
        let player_ids = self.player_ids();
        let standing_order = self.standing_order()?;
        let opponents = history::opponents(&self.rounds, &player_ids, Until::Latest)?;
        let color_counts = history::color_counts(&self.rounds, &player_ids, Until::Latest)?;
        let last_colors = history::color_sequences(&self.rounds, &player_ids, Until::Latest)?;
        let rank_index = self.rank_index();
        swiss::generate_round(
            next_index,
            &standing_order,
            &opponents,
            &color_counts,
            &last_colors,
            &rank_index,
            rng,
        )
    }

    /// Player identifiers ordered by current score descending, secondary
    /// initial rank (§4.4.2 step 1).
    fn standing_order(&self) -> Result<Vec<i64>, ArbiterError> {
        let scores: HashMap<i64, HalfPoints> =
            history::standings(&self.rounds, &self.player_ids(), Until::Latest)?
                .into_iter()
                .collect();
        let rank_index = self.rank_index();
        let mut ids = self.player_ids();
        ids.sort_by(|&a, &b| {
            scores[&b]
                .cmp(&scores[&a])
                .then_with(|| rank_index[&a].cmp(&rank_index[&b]))
        });
        Ok(ids)
    }

    fn tie_break_round_slice(&self) -> &[Round] {
        match self.last_complete_round_index() {
            Some(idx) => &self.rounds[..idx as usize],
            None => &[],
        }
    }

    pub fn calculate_tie_breaks_swiss(&self) -> HashMap<TieBreakSwiss, HashMap<i64, f64>> {
        let rounds = self.tie_break_round_slice();
        let (mm, solk) =
            tiebreak::modified_median_solkoff(rounds, &self.player_ids(), self.round_count);
        let mut out = HashMap::new();
        out.insert(TieBreakSwiss::ModifiedMedian, mm);
        out.insert(TieBreakSwiss::Solkoff, solk);
        out
    }

    pub fn calculate_tie_breaks_round_robin(&self) -> HashMap<TieBreakRoundRobin, HashMap<i64, f64>> {
        let rounds = self.tie_break_round_slice();
        let (sonne, koya) =
            tiebreak::sonneborn_berger_koya(rounds, &self.player_ids(), self.round_count);
        let mut out = HashMap::new();
        out.insert(TieBreakRoundRobin::SonnebornBerger, sonne);
        out.insert(TieBreakRoundRobin::Koya, koya);
        out
    }

    /// Builds the full standings report (§6.3): players in descending score
    /// order, each row annotated with every configured tie-break.
    pub fn standings_report(&self) -> Result<Vec<StandingsRow>, ArbiterError> {
        let table = self.standings(Until::LatestComplete)?;
        let by_id: HashMap<i64, &Player> =
            self.players.iter().map(|p| (p.identifier, p)).collect();

        let swiss_breaks = self.calculate_tie_breaks_swiss();
        let rr_breaks = self.calculate_tie_breaks_round_robin();

        let rows = table
            .into_iter()
            .map(|(id, score)| {
                let mut tie_breaks = Vec::new();
                for method in &self.tie_break_swiss {
                    let name = match method {
                        TieBreakSwiss::ModifiedMedian => "modified_median",
                        TieBreakSwiss::Solkoff => "solkoff",
                    };
                    let value = swiss_breaks[method].get(&id).copied().unwrap_or(0.0);
                    tie_breaks.push((name.to_string(), value));
                }
                for method in &self.tie_break_round_robin {
                    let name = match method {
                        TieBreakRoundRobin::SonnebornBerger => "sonneborn_berger",
                        TieBreakRoundRobin::Koya => "koya",
                    };
                    let value = rr_breaks[method].get(&id).copied().unwrap_or(0.0);
                    tie_breaks.push((name.to_string(), value));
                }
                StandingsRow {
                    identifier: id,
                    display_name: by_id.get(&id).map(|p| p.display_name()).unwrap_or_default(),
                    score,
                    tie_breaks,
                }
            })
            .collect();
        Ok(rows)
    }
}

/// Builds an `StdRng` from a caller-supplied seed so pairing runs are
/// reproducible in tests (§5).
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Pairs the bottom half against the top half, White going to the bottom
/// half player (§4.4.5 house rule).
fn initial_round(players: &[Player]) -> Round {
    let middle = players.len() / 2;
    let (top, bottom) = players.split_at(middle);
    let matchups = top
        .iter()
        .zip(bottom.iter())
        .map(|(t, b)| {
            crate::domain::matchup::Matchup::unset(b.identifier, t.identifier)
        })
        .collect();
    Round::new(1, matchups).expect("initial round pairs disjoint players by construction")
}
