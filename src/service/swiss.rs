use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::common::error::ArbiterError;
use crate::domain::matchup::{Matchup, PlayerMatch};
use crate::domain::result::Color;
use crate::domain::round::Round;

const BRUTE_FORCE_LIMIT: u32 = 10;

/// Everything the assigner needs about tournament history, computed once per
/// `generate_round` call and shared read-only across every brute-force
/// attempt and DFS frame.
struct Context<'a> {
    opponents: &'a HashMap<i64, Vec<i64>>,
    color_counts: &'a HashMap<i64, (u32, u32)>,
    last_colors: &'a HashMap<i64, Vec<Color>>,
    rank_index: &'a HashMap<i64, usize>,
    veto_white: HashSet<i64>,
    veto_black: HashSet<i64>,
    top2: HashSet<i64>,
}

impl<'a> Context<'a> {
    fn new(
        standing_order: &[i64],
        opponents: &'a HashMap<i64, Vec<i64>>,
        color_counts: &'a HashMap<i64, (u32, u32)>,
        last_colors: &'a HashMap<i64, Vec<Color>>,
        rank_index: &'a HashMap<i64, usize>,
    ) -> Self {
        let mut veto_white = HashSet::new();
        let mut veto_black = HashSet::new();
        for (&player, colors) in last_colors {
            if colors.len() >= 2 {
                let last_two = &colors[colors.len() - 2..];
                if last_two[0] == Color::White && last_two[1] == Color::White {
                    veto_white.insert(player);
                } else if last_two[0] == Color::Black && last_two[1] == Color::Black {
                    veto_black.insert(player);
                }
            }
        }
        let top2 = standing_order.iter().take(2).copied().collect();
        Context {
            opponents,
            color_counts,
            last_colors,
            rank_index,
            veto_white,
            veto_black,
            top2,
        }
    }

    fn has_played(&self, a: i64, b: i64) -> bool {
        self.opponents.get(&a).is_some_and(|ops| ops.contains(&b))
    }

    fn same_veto_set(&self, a: i64, b: i64) -> bool {
        (self.veto_white.contains(&a) && self.veto_white.contains(&b))
            || (self.veto_black.contains(&a) && self.veto_black.contains(&b))
    }

    fn is_forbidden(&self, higher: i64, candidate: i64, paired: &HashSet<i64>) -> bool {
        paired.contains(&candidate)
            || self.has_played(higher, candidate)
            || self.same_veto_set(higher, candidate)
    }

    /// Decides `(white, black)` for an accepted pairing per §4.4.1 item 4,
    /// with color-streak vetoes taking precedence.
    fn assign_colors(&self, higher: i64, lower: i64) -> Result<(i64, i64), ArbiterError> {
        let higher_forced_black = self.veto_white.contains(&higher);
        let higher_forced_white = self.veto_black.contains(&higher);
        let lower_forced_black = self.veto_white.contains(&lower);
        let lower_forced_white = self.veto_black.contains(&lower);

        if higher_forced_black && lower_forced_black {
            return Err(ArbiterError::ColorStreakViolation(higher));
        }
        if higher_forced_white && lower_forced_white {
            return Err(ArbiterError::ColorStreakViolation(lower));
        }
        if higher_forced_black {
            return Ok((lower, higher));
        }
        if higher_forced_white {
            return Ok((higher, lower));
        }
        if lower_forced_black {
            return Ok((higher, lower));
        }
        if lower_forced_white {
            return Ok((lower, higher));
        }

        let (hw, hb) = self.color_counts.get(&higher).copied().unwrap_or((0, 0));
        let (lw, lb) = self.color_counts.get(&lower).copied().unwrap_or((0, 0));
        let white_diff = hw as i64 - lw as i64;
        if white_diff > 0 {
            return Ok((lower, higher));
        } else if white_diff < 0 {
            return Ok((higher, lower));
        }
        let black_diff = hb as i64 - lb as i64;
        if black_diff > 0 {
            return Ok((lower, higher));
        } else if black_diff < 0 {
            return Ok((higher, lower));
        }

        let higher_ideal = self.last_color_of(higher).map(Color::opposite);
        let lower_ideal = self.last_color_of(lower).map(Color::opposite);
        match (higher_ideal, lower_ideal) {
            (Some(Color::White), Some(Color::Black)) => return Ok((higher, lower)),
            (Some(Color::Black), Some(Color::White)) => return Ok((lower, higher)),
            _ => {}
        }

        if self.rank_index.get(&higher) < self.rank_index.get(&lower) {
            Ok((lower, higher))
        } else {
            Ok((higher, lower))
        }
    }

    fn last_color_of(&self, player: i64) -> Option<Color> {
        self.last_colors.get(&player).and_then(|c| c.last().copied())
    }

    fn would_create_streak(&self, player: i64, color: Color) -> bool {
        self.last_colors
            .get(&player)
            .is_some_and(|colors| colors.len() >= 2 && colors[colors.len() - 2..] == [color, color])
    }
}

/// Generates the next Swiss round from `standing_order` (current score desc,
/// secondary initial rank), retrying with a bounded randomized restart
/// (§4.4.4) when the deterministic pass can't complete a legal pairing.
#[tracing::instrument(skip(opponents, color_counts, last_colors, rank_index, rng))]
pub fn generate_round(
    next_index: u32,
    standing_order: &[i64],
    opponents: &HashMap<i64, Vec<i64>>,
    color_counts: &HashMap<i64, (u32, u32)>,
    last_colors: &HashMap<i64, Vec<Color>>,
    rank_index: &HashMap<i64, usize>,
    rng: &mut StdRng,
) -> Result<Round, ArbiterError> {
    if standing_order.len() % 2 != 0 {
        return Err(ArbiterError::OddRosterUnsupported(standing_order.len()));
    }
    let ctx = Context::new(standing_order, opponents, color_counts, last_colors, rank_index);

    let mut order = standing_order.to_vec();
    for attempt in 1..=BRUTE_FORCE_LIMIT {
        let mut pool = order.clone();
        let mut assignments: Vec<(i64, i64)> = Vec::with_capacity(pool.len() / 2);
        if pair_pool(&mut pool, &mut assignments, &ctx).is_ok() {
            if attempt > 1 {
                tracing::info!(round = next_index, attempt, "pairing succeeded after restart");
            }
            return build_round(next_index, assignments);
        }
        tracing::debug!(round = next_index, attempt, "brute-force attempt failed, retrying");
        if attempt < BRUTE_FORCE_LIMIT {
            let (locked, rest) = order.split_at_mut(2.min(order.len()));
            let _ = locked;
            rest.shuffle(rng);
        }
    }
    tracing::warn!(round = next_index, limit = BRUTE_FORCE_LIMIT, "swiss assigner exhausted all brute-force attempts");
    Err(ArbiterError::PairingExhausted(BRUTE_FORCE_LIMIT))
}

fn build_round(index: u32, assignments: Vec<(i64, i64)>) -> Result<Round, ArbiterError> {
    let matchups = assignments
        .into_iter()
        .map(|(w, b)| Matchup::new(PlayerMatch::unset(w), PlayerMatch::unset(b)))
        .collect::<Result<Vec<_>, _>>()?;
    Round::new(index, matchups)
}

/// The depth-first matcher of §4.4.2, falling back to back-swap recovery
/// (§4.4.3) when the head of the pool has no legal direct candidate.
/// Returns `Err(())` to signal "this attempt failed", a local sentinel
/// distinct from the public `ArbiterError` surfaced only after every
/// brute-force attempt is spent.
fn pair_pool(pool: &mut Vec<i64>, assignments: &mut Vec<(i64, i64)>, ctx: &Context) -> Result<(), ()> {
    if pool.is_empty() {
        return Ok(());
    }
    let higher = pool[0];
    let paired: HashSet<i64> = HashSet::new();
    if let Some(idx) = (1..pool.len()).find(|&i| !ctx.is_forbidden(higher, pool[i], &paired)) {
        let lower = pool.remove(idx);
        pool.remove(0);
        let Ok((white, black)) = ctx.assign_colors(higher, lower) else {
            pool.insert(0, higher);
            pool.insert(idx.min(pool.len()), lower);
            return try_backswap(higher, pool, assignments, ctx);
        };
        assignments.push((white, black));
        match pair_pool(pool, assignments, ctx) {
            Ok(()) => Ok(()),
            Err(()) => {
                assignments.pop();
                pool.insert(0, higher);
                pool.insert(1, lower);
                try_backswap(higher, pool, assignments, ctx)
            }
        }
    } else {
        try_backswap(higher, pool, assignments, ctx)
    }
}

/// Walks previously-assigned matchups backwards, swapping a disturbed side
/// out for `stuck` when it's legal to, and continuing the DFS with the
/// displaced player back in the pool (§4.4.3).
fn try_backswap(stuck: i64, pool: &mut Vec<i64>, assignments: &mut Vec<(i64, i64)>, ctx: &Context) -> Result<(), ()> {
    pool.retain(|&p| p != stuck);

    for i in (0..assignments.len()).rev() {
        let (white, black) = assignments[i];
        for &(keep, displaced) in &[(white, black), (black, white)] {
            if ctx.top2.contains(&keep) || ctx.top2.contains(&displaced) {
                continue;
            }
            if ctx.has_played(keep, stuck) || ctx.same_veto_set(keep, stuck) {
                continue;
            }
            let Ok((new_white, new_black)) = ctx.assign_colors(keep, stuck) else {
                continue;
            };
            if ctx.would_create_streak(new_white, Color::White)
                || ctx.would_create_streak(new_black, Color::Black)
            {
                continue;
            }

            tracing::debug!(stuck, keep, displaced, "attempting back-swap recovery");
            let saved = assignments[i];
            assignments[i] = (new_white, new_black);
            pool.insert(0, displaced);

            match pair_pool(pool, assignments, ctx) {
                Ok(()) => return Ok(()),
                Err(()) => {
                    assignments[i] = saved;
                    pool.remove(0);
                }
            }
        }
    }
    pool.push(stuck);
    Err(())
}
