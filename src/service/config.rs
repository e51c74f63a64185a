use serde::Deserialize;

use crate::common::error::ArbiterError;
use crate::domain::tournament::{RoundSystem, TieBreakRoundRobin, TieBreakSwiss};

/// Parsed `[general]` / `[players]` document (§6.1). Field names match the
/// on-disk TOML exactly; everything else is normalized afterward.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    general: GeneralSection,
    players: PlayersSection,
}

#[derive(Debug, Deserialize)]
struct GeneralSection {
    title: String,
    year: i32,
    count: i32,
    rounds: u32,
    round_system: String,
    folder: Option<String>,
    round_folder: Option<String>,
    tie_break_methods_swiss: Option<Vec<String>>,
    tie_break_methods_round_robin: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PlayersSection {
    ids: Vec<i64>,
}

/// Fully-normalized tournament configuration, ready to seed a
/// [`Tournament`](crate::domain::tournament::Tournament).
#[derive(Debug, Clone)]
pub struct TournamentConfig {
    pub title: String,
    pub year: i32,
    pub count: i32,
    pub round_count: u32,
    pub round_system: RoundSystem,
    pub folder: Option<String>,
    pub round_folder: Option<String>,
    pub tie_break_swiss: Vec<TieBreakSwiss>,
    pub tie_break_round_robin: Vec<TieBreakRoundRobin>,
    pub player_ids: Vec<i64>,
}

pub fn load(path: &std::path::Path) -> Result<TournamentConfig, ArbiterError> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

pub fn parse(contents: &str) -> Result<TournamentConfig, ArbiterError> {
    let file: ConfigFile =
        toml::from_str(contents).map_err(|e| ArbiterError::InvalidConfig(e.to_string()))?;

    let round_system = match file.general.round_system.to_lowercase().as_str() {
        "swiss" => RoundSystem::Swiss,
        "berger" => RoundSystem::Berger,
        other => {
            return Err(ArbiterError::InvalidConfig(format!(
                "unknown round_system: {other:?}"
            )))
        }
    };

    let tie_break_swiss = file
        .general
        .tie_break_methods_swiss
        .unwrap_or_default()
        .iter()
        .map(|name| parse_tie_break_swiss(name))
        .collect::<Result<Vec<_>, _>>()?;

    let tie_break_round_robin = file
        .general
        .tie_break_methods_round_robin
        .unwrap_or_default()
        .iter()
        .map(|name| parse_tie_break_round_robin(name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TournamentConfig {
        title: file.general.title,
        year: file.general.year,
        count: file.general.count,
        round_count: file.general.rounds,
        round_system,
        folder: file.general.folder,
        round_folder: file.general.round_folder,
        tie_break_swiss,
        tie_break_round_robin,
        player_ids: file.players.ids,
    })
}

fn parse_tie_break_swiss(name: &str) -> Result<TieBreakSwiss, ArbiterError> {
    match name.to_lowercase().as_str() {
        "modified_median" => Ok(TieBreakSwiss::ModifiedMedian),
        "solkoff" => Ok(TieBreakSwiss::Solkoff),
        other => Err(ArbiterError::UnknownTieBreakMethod(other.to_string())),
    }
}

fn parse_tie_break_round_robin(name: &str) -> Result<TieBreakRoundRobin, ArbiterError> {
    match name.to_lowercase().as_str() {
        "sonneborn_berger" => Ok(TieBreakRoundRobin::SonnebornBerger),
        "koya" => Ok(TieBreakRoundRobin::Koya),
        other => Err(ArbiterError::UnknownTieBreakMethod(other.to_string())),
    }
}
