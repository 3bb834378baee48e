use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    Operator, // Server operator, receives clip notices
    Player,   // Regular player
}

impl PlayerRole {
    pub fn is_privileged(&self) -> bool {
        matches!(self, PlayerRole::Operator)
    }
}

impl std::fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerRole::Operator => write!(f, "op"),
            PlayerRole::Player => write!(f, "player"),
        }
    }
}
