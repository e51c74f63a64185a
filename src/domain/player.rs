use serde::{Deserialize, Serialize};

/// A tournament participant. Identity lives in `identifier`; names are
/// display-only and never consulted by the pairing or scoring logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub identifier: i64,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
}

impl Player {
    pub fn new(identifier: i64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Player {
            identifier,
            first_name: first_name.into(),
            last_name: last_name.into(),
            active: true,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
