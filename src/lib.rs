pub mod common;
pub mod domain;
pub mod service;

pub use common::error::{ArbiterError, Result};
pub use domain::tournament::{RoundSystem, StandingsRow, TieBreakRoundRobin, TieBreakSwiss, Tournament};
