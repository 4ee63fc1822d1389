use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The game rejects inputs that would reverse the snake into itself.
    pub fn is_opposite(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    pub timestamp_ms: i64,
    pub direction: Direction,
}

/// One submitted run, exactly as the client reported it. Timestamps are
/// client wall-clock and may lie; nothing here is pre-validated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySession {
    pub score: i64,
    pub duration_ms: i64,
    #[serde(default)]
    pub apples_eaten: i64,
    #[serde(default)]
    pub input_events: Vec<InputEvent>,
}

/// Rolling history the caller fetched from the player store.
/// `average_score == 0` marks a brand-new player with nothing to compare
/// against.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBaseline {
    pub average_score: f64,
    pub games_played: i64,
}
