use std::io::{Read, Write};

use crate::common::error::ArbiterError;
use crate::domain::matchup::{Matchup, PlayerMatch};
use crate::domain::player::Player;
use crate::domain::result::MatchResult;
use crate::domain::round::Round;

const HEADER: [&str; 4] = ["white", "score_white", "black", "score_black"];

/// Parses one of the score literals in §6.2's table.
pub fn parse_score(literal: &str) -> Result<MatchResult, ArbiterError> {
    match literal.trim().to_lowercase().as_str() {
        "1" => Ok(MatchResult::Win),
        "0" => Ok(MatchResult::Loss),
        "0.5" | "0,5" => Ok(MatchResult::Draw),
        "wo" | "walkover" => Ok(MatchResult::Walkover),
        "" | "unset" => Ok(MatchResult::Unset),
        other => Err(ArbiterError::UnreadableScore(other.to_string())),
    }
}

fn score_literal(result: MatchResult) -> &'static str {
    match result {
        MatchResult::Win => "1",
        MatchResult::Loss => "0",
        MatchResult::Draw => "0.5",
        MatchResult::Walkover => "wo",
        MatchResult::Unset => "",
    }
}

/// Matches a CSV column value against `players` by integer identifier or
/// exact case-insensitive full name.
pub fn match_player<'a>(token: &str, players: &'a [Player]) -> Option<&'a Player> {
    let sanitized = token.trim().to_lowercase();
    if let Ok(id) = sanitized.parse::<i64>() {
        if let Some(p) = players.iter().find(|p| p.identifier == id) {
            return Some(p);
        }
    }
    players
        .iter()
        .find(|p| p.display_name().to_lowercase() == sanitized)
}

/// Reads one round document (header + matchup rows, §6.2) from any
/// `std::io::Read` into a [`Round`] at `index`. Directory walking and
/// `round_folder` resolution belong to the external CLI/persistence
/// collaborator, not the core.
pub fn read_csv<R: Read>(reader: R, index: u32, players: &[Player]) -> Result<Round, ArbiterError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut matchups = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 4 {
            return Err(ArbiterError::Csv(format!(
                "expected 4 columns, got {}",
                record.len()
            )));
        }
        let white = match_player(&record[0], players)
            .ok_or_else(|| ArbiterError::UnknownPlayer(record[0].to_string()))?;
        let black = match_player(&record[2], players)
            .ok_or_else(|| ArbiterError::UnknownPlayer(record[2].to_string()))?;
        let white_result = parse_score(&record[1])?;
        let black_result = parse_score(&record[3])?;
        matchups.push(Matchup::new(
            PlayerMatch::new(white.identifier, white_result),
            PlayerMatch::new(black.identifier, black_result),
        )?);
    }
    Round::new(index, matchups)
}

/// Writes `round`'s matchups (header + rows, §6.2) to any `std::io::Write`.
pub fn write_csv<W: Write>(round: &Round, writer: W) -> Result<(), ArbiterError> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(HEADER)?;
    for m in round.matchups() {
        let (white, black) = m.player_ids();
        writer.write_record([
            white.to_string(),
            score_literal(m.white().result).to_string(),
            black.to_string(),
            score_literal(m.black().result).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
