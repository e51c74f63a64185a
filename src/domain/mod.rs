pub mod history;
pub mod matchup;
pub mod player;
pub mod result;
pub mod round;
pub mod tournament;
