use std::collections::HashMap;

use crate::domain::history::{self, Until};
use crate::domain::result::HalfPoints;
use crate::domain::round::Round;

/// `{Modified Median, Solkoff}` over `rounds`, which the caller has already
/// truncated to the last complete round (§4.5.3). `round_count` is the
/// configured target round count, falling back to `rounds.len()` when unset.
pub fn modified_median_solkoff(
    rounds: &[Round],
    player_ids: &[i64],
    round_count: u32,
) -> (HashMap<i64, f64>, HashMap<i64, f64>) {
    let model_scores = model_scores_by_player(rounds, player_ids);
    let opponents = history::opponents(rounds, player_ids, Until::Latest)
        .expect("Until::Latest never fails to resolve");

    // §8.8: fewer than 3 rounds played discards nothing at all, regardless
    // of where the player's score sits relative to the threshold.
    let played_rounds = rounds.len();
    let discards_per_side = if played_rounds < 3 {
        0
    } else if played_rounds < 9 {
        1
    } else {
        2
    };
    let threshold = HalfPoints(round_count as i64);

    let mut modified_median = HashMap::new();
    let mut solkoff = HashMap::new();
    for &player in player_ids {
        let gains: Vec<HalfPoints> = opponents
            .get(&player)
            .into_iter()
            .flatten()
            .map(|opp| *model_scores.get(opp).unwrap_or(&HalfPoints::ZERO))
            .collect();
        let player_score = *model_scores.get(&player).unwrap_or(&HalfPoints::ZERO);

        let mut trimmed = gains.clone();
        for _ in 0..discards_per_side {
            if player_score > threshold {
                drop_extreme(&mut trimmed, true);
            } else if player_score < threshold {
                drop_extreme(&mut trimmed, false);
            } else {
                drop_extreme(&mut trimmed, false);
                drop_extreme(&mut trimmed, true);
            }
        }

        let sum: HalfPoints = trimmed.into_iter().sum();
        modified_median.insert(player, sum.as_f64());
        solkoff.insert(player, gains.into_iter().sum::<HalfPoints>().as_f64());
    }
    (modified_median, solkoff)
}

fn model_scores_by_player(rounds: &[Round], player_ids: &[i64]) -> HashMap<i64, HalfPoints> {
    let mut totals: HashMap<i64, HalfPoints> =
        player_ids.iter().map(|&p| (p, HalfPoints::ZERO)).collect();
    for round in rounds {
        for m in round.matchups() {
            let (w, b) = m.player_ids();
            *totals.entry(w).or_insert(HalfPoints::ZERO) +=
                crate::domain::result::model_score(m.white().result);
            *totals.entry(b).or_insert(HalfPoints::ZERO) +=
                crate::domain::result::model_score(m.black().result);
        }
    }
    totals
}

/// Removes the first occurrence of the minimum (`take_min`) or maximum value.
fn drop_extreme(scores: &mut Vec<HalfPoints>, take_min: bool) {
    if scores.is_empty() {
        return;
    }
    let target = if take_min {
        *scores.iter().min().unwrap()
    } else {
        *scores.iter().max().unwrap()
    };
    if let Some(pos) = scores.iter().position(|&s| s == target) {
        scores.remove(pos);
    }
}

/// `{Sonneborn-Berger, Koya}` over `rounds`, already truncated to the last
/// complete round.
pub fn sonneborn_berger_koya(
    rounds: &[Round],
    player_ids: &[i64],
    round_count: u32,
) -> (HashMap<i64, f64>, HashMap<i64, f64>) {
    let (defeated_drawn, game_scores) = history::player_defeated_drawn(rounds, player_ids);
    let standings: HashMap<i64, HalfPoints> =
        history::standings(rounds, player_ids, Until::Latest)
            .expect("Until::Latest never fails to resolve")
            .into_iter()
            .collect();
    let threshold = HalfPoints(round_count as i64).as_f64();

    let mut sonneborn_berger = HashMap::new();
    let mut koya = HashMap::new();
    for &player in player_ids {
        let (defeated, drawn) = defeated_drawn.get(&player).cloned().unwrap_or_default();
        let sonne: f64 = defeated
            .iter()
            .map(|opp| standings.get(opp).copied().unwrap_or(HalfPoints::ZERO).as_f64())
            .sum::<f64>()
            + drawn
                .iter()
                .map(|opp| standings.get(opp).copied().unwrap_or(HalfPoints::ZERO).as_f64() * 0.5)
                .sum::<f64>();
        sonneborn_berger.insert(player, sonne);

        let mut koya_total = 0.0;
        for opp in defeated.iter().chain(drawn.iter()) {
            let opp_score = standings.get(opp).copied().unwrap_or(HalfPoints::ZERO).as_f64();
            if opp_score >= threshold {
                koya_total += game_scores
                    .get(&player)
                    .and_then(|m| m.get(opp))
                    .copied()
                    .unwrap_or(HalfPoints::ZERO)
                    .as_f64();
            }
        }
        koya.insert(player, koya_total);
    }
    (sonneborn_berger, koya)
}
