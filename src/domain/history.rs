use std::collections::HashMap;

use crate::common::error::ArbiterError;
use crate::domain::result::HalfPoints;
use crate::domain::round::Round;

/// How far into a round list a history query should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    /// Every round recorded so far, complete or not.
    Latest,
    /// Up to and including the last fully-resolved round.
    LatestComplete,
    /// Up to and including the round at this 1-based index.
    Index(u32),
}

fn resolve_count(rounds: &[Round], until: Until) -> Result<usize, ArbiterError> {
    match until {
        Until::Latest => Ok(rounds.len()),
        Until::Index(n) => Ok(n as usize),
        Until::LatestComplete => last_complete_round_index(rounds)
            .map(|n| n as usize)
            .ok_or(ArbiterError::NoCompletedRounds),
    }
}

/// The index of the latest round whose matchups are all resolved, or `None`
/// if no round has been completed yet.
pub fn last_complete_round_index(rounds: &[Round]) -> Option<u32> {
    rounds.iter().filter(|r| r.is_complete()).map(|r| r.index).max()
}

/// Every opponent each player has faced in `rounds[..until]`, keyed by player
/// id, in the order the games were played.
pub fn opponents(
    rounds: &[Round],
    player_ids: &[i64],
    until: Until,
) -> Result<HashMap<i64, Vec<i64>>, ArbiterError> {
    let count = resolve_count(rounds, until)?;
    let mut map: HashMap<i64, Vec<i64>> = player_ids.iter().map(|&p| (p, Vec::new())).collect();
    for round in rounds.iter().take(count) {
        for m in round.matchups() {
            let (w, b) = m.player_ids();
            map.entry(w).or_default().push(b);
            map.entry(b).or_default().push(w);
        }
    }
    Ok(map)
}

/// Whether `a` and `b` have already met in the recorded opponent lists.
pub fn has_played(opponents: &HashMap<i64, Vec<i64>>, a: i64, b: i64) -> bool {
    opponents.get(&a).is_some_and(|ops| ops.contains(&b))
}

/// `(white_games, black_games)` per player across `rounds[..until]`.
/// Walkovers don't count toward either color, matching §4.1's "walkovers
/// don't count toward color balance".
pub fn color_counts(
    rounds: &[Round],
    player_ids: &[i64],
    until: Until,
) -> Result<HashMap<i64, (u32, u32)>, ArbiterError> {
    let count = resolve_count(rounds, until)?;
    let mut map: HashMap<i64, (u32, u32)> = player_ids.iter().map(|&p| (p, (0, 0))).collect();
    for round in rounds.iter().take(count) {
        for m in round.matchups() {
            if m.is_walkover_pair() {
                continue;
            }
            let (w, b) = m.player_ids();
            map.entry(w).or_insert((0, 0)).0 += 1;
            map.entry(b).or_insert((0, 0)).1 += 1;
        }
    }
    Ok(map)
}

/// Each player's color history in round order, skipping walkovers, most
/// recent last. Used to compute the color-streak veto sets (§4.4.1).
pub fn color_sequences(
    rounds: &[Round],
    player_ids: &[i64],
    until: Until,
) -> Result<HashMap<i64, Vec<crate::domain::result::Color>>, ArbiterError> {
    let count = resolve_count(rounds, until)?;
    let mut map: HashMap<i64, Vec<crate::domain::result::Color>> =
        player_ids.iter().map(|&p| (p, Vec::new())).collect();
    for round in rounds.iter().take(count) {
        for m in round.matchups() {
            if m.is_walkover_pair() {
                continue;
            }
            let (w, b) = m.player_ids();
            map.entry(w).or_default().push(crate::domain::result::Color::White);
            map.entry(b).or_default().push(crate::domain::result::Color::Black);
        }
    }
    Ok(map)
}

/// Cumulative standings-table score per player over `rounds[..until]`,
/// sorted by descending score (ties keep the players' relative order).
/// Players with no recorded games still appear, at zero.
pub fn standings(
    rounds: &[Round],
    player_ids: &[i64],
    until: Until,
) -> Result<Vec<(i64, HalfPoints)>, ArbiterError> {
    let count = resolve_count(rounds, until)?;
    let mut totals: HashMap<i64, HalfPoints> =
        player_ids.iter().map(|&p| (p, HalfPoints::ZERO)).collect();
    for round in rounds.iter().take(count) {
        for (player_id, score) in round.standings_scores() {
            *totals.entry(player_id).or_insert(HalfPoints::ZERO) += score;
        }
    }
    let mut ordered: Vec<(i64, HalfPoints)> = player_ids
        .iter()
        .map(|&p| (p, totals.get(&p).copied().unwrap_or(HalfPoints::ZERO)))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ordered)
}

/// For every player: the ids of opponents they defeated and the ids they
/// drew with, plus a per-opponent standings-score lookup used by
/// Sonneborn-Berger/Koya. Walkovers count as neither a win nor a draw here,
/// matching the flat standings-score table.
pub fn player_defeated_drawn(
    rounds: &[Round],
    player_ids: &[i64],
) -> (
    HashMap<i64, (Vec<i64>, Vec<i64>)>,
    HashMap<i64, HashMap<i64, HalfPoints>>,
) {
    let mut defeated_drawn: HashMap<i64, (Vec<i64>, Vec<i64>)> =
        player_ids.iter().map(|&p| (p, (Vec::new(), Vec::new()))).collect();
    let mut scores: HashMap<i64, HashMap<i64, HalfPoints>> =
        player_ids.iter().map(|&p| (p, HashMap::new())).collect();

    for round in rounds {
        for m in round.matchups() {
            let (w, b) = m.player_ids();
            let score_w = m.standings_score(crate::domain::result::Color::White);
            let score_b = m.standings_score(crate::domain::result::Color::Black);
            record_defeated_drawn(&mut defeated_drawn, w, b, score_w);
            record_defeated_drawn(&mut defeated_drawn, b, w, score_b);
            scores.entry(w).or_default().insert(b, score_w);
            scores.entry(b).or_default().insert(w, score_b);
        }
    }
    (defeated_drawn, scores)
}

fn record_defeated_drawn(
    map: &mut HashMap<i64, (Vec<i64>, Vec<i64>)>,
    player: i64,
    opponent: i64,
    score: HalfPoints,
) {
    let entry = map.entry(player).or_default();
    if score == HalfPoints::ONE {
        entry.0.push(opponent);
    } else if score == HalfPoints::HALF {
        entry.1.push(opponent);
    }
}
