use crate::common::error::ArbiterError;
use crate::domain::matchup::{Matchup, PlayerMatch};
use crate::domain::round::Round;

/// Builds the full Berger round-robin schedule for `players`, already sorted
/// by initial rank, and returns `n - 1` fully unset rounds ready to be
/// appended to a [`Tournament`](crate::domain::tournament::Tournament).
///
/// <https://en.wikipedia.org/wiki/Round-robin_tournament#Berger_tables>
pub fn generate_schedule(players: &[i64]) -> Result<Vec<Round>, ArbiterError> {
    let n = players.len();
    if n % 2 != 0 {
        return Err(ArbiterError::OddRosterUnsupported(n));
    }
    let half = n / 2;
    let mut seats = players.to_vec();

    let mut rounds = Vec::with_capacity(n.saturating_sub(1));
    for r in 1..n {
        let pairs = pair_round(&seats, r, half);
        let matchups = pairs
            .into_iter()
            .map(|(white, black)| {
                Matchup::new(PlayerMatch::unset(white), PlayerMatch::unset(black))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rounds.push(Round::new(r as u32, matchups)?);
        rotate(&mut seats, half);
    }
    Ok(rounds)
}

/// Pairs the current seating for round `r` (1-based). Even rounds swap the
/// first pair's color anchor; all other pairs keep seat order.
fn pair_round(seats: &[i64], r: usize, half: usize) -> Vec<(i64, i64)> {
    let n = seats.len();
    let mut pairs = Vec::with_capacity(half);
    if r % 2 == 1 {
        for i in 0..half {
            pairs.push((seats[i], seats[n - 1 - i]));
        }
    } else {
        pairs.push((seats[n - 1], seats[0]));
        for i in 1..half {
            pairs.push((seats[i], seats[n - 1 - i]));
        }
    }
    pairs
}

/// Detaches the last seat, rotates the remainder left by `half` positions,
/// then reappends the detached seat.
fn rotate(seats: &mut Vec<i64>, half: usize) {
    let last = seats.pop().expect("seats non-empty");
    seats.rotate_left(half);
    seats.push(last);
}
