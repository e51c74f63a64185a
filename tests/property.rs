//! Property-based sweeps over the Swiss assigner and Berger scheduler,
//! checking the pairing invariants of §8 across randomized rosters and
//! seeds rather than the fixed cases in `integration.rs`.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pawn_arbiter::domain::player::Player;
use pawn_arbiter::domain::result::MatchResult;
use pawn_arbiter::domain::tournament::seeded_rng;
use pawn_arbiter::service::berger;
use pawn_arbiter::{ArbiterError, RoundSystem, Tournament};

fn players(n: i64) -> Vec<Player> {
    (1..=n)
        .map(|i| Player::new(i, format!("First{i}"), format!("Last{i}")))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Invariants 1, 2 and 4 (sequential indices, no repeated pair, no
    /// three-in-a-row color streak) across random roster sizes, round
    /// counts and result outcomes.
    #[test]
    fn swiss_rounds_stay_legal_under_randomized_play(
        half_roster in 2usize..9,
        round_count in 2u32..6,
        pairing_seed in any::<u64>(),
        result_seed in any::<u64>(),
    ) {
        let n = (half_roster * 2) as i64;
        let mut tournament = Tournament::new(
            "Property Open",
            players(n),
            round_count,
            RoundSystem::Swiss,
            vec![],
            vec![],
        ).unwrap();
        let mut pairing_rng = seeded_rng(pairing_seed);
        let mut result_rng = StdRng::seed_from_u64(result_seed);

        let mut seen_pairs: HashSet<(i64, i64)> = HashSet::new();
        let mut colors: std::collections::HashMap<i64, Vec<pawn_arbiter::domain::result::Color>> =
            std::collections::HashMap::new();

        for _ in 0..round_count {
            match tournament.generate_next_round(&mut pairing_rng) {
                Ok(()) => {}
                Err(ArbiterError::PairingExhausted(_)) | Err(ArbiterError::ColorStreakViolation(_)) => break,
                Err(other) => prop_assert!(false, "unexpected failure: {other:?}"),
            }
            let idx = tournament.rounds().len() as u32;
            let round = tournament.get_round_by_index(idx).unwrap().clone();
            for m in round.matchups() {
                let pair = m.unordered_pair();
                prop_assert!(seen_pairs.insert(pair), "pair {pair:?} repeated");
                let (w, b) = m.player_ids();
                colors.entry(w).or_default().push(pawn_arbiter::domain::result::Color::White);
                colors.entry(b).or_default().push(pawn_arbiter::domain::result::Color::Black);

                let (rw, rb) = match result_rng.gen_range(0..3) {
                    0 => (MatchResult::Win, MatchResult::Loss),
                    1 => (MatchResult::Loss, MatchResult::Win),
                    _ => (MatchResult::Draw, MatchResult::Draw),
                };
                tournament.record_result(idx, w, rw).unwrap();
                tournament.record_result(idx, b, rb).unwrap();
            }
        }

        for (i, round) in tournament.rounds().iter().enumerate() {
            prop_assert_eq!(round.index, i as u32 + 1);
        }
        for seq in colors.values() {
            for window in seq.windows(3) {
                prop_assert!(
                    !(window[0] == window[1] && window[1] == window[2]),
                    "three consecutive identical colors: {window:?}"
                );
            }
        }
    }

    /// The Berger schedule never repeats a pair and always produces exactly
    /// `n - 1` rounds, for any even roster size.
    #[test]
    fn berger_schedule_never_repeats_a_pair(half_roster in 2usize..30) {
        let n = half_roster * 2;
        let ids: Vec<i64> = (1..=n as i64).collect();
        let schedule = berger::generate_schedule(&ids).unwrap();
        prop_assert_eq!(schedule.len(), n - 1);

        let mut seen = HashSet::new();
        for round in &schedule {
            prop_assert_eq!(round.matchups().len(), n / 2);
            for m in round.matchups() {
                prop_assert!(seen.insert(m.unordered_pair()), "pair repeated: {:?}", m.unordered_pair());
            }
        }
    }
}
