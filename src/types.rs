//! Core session types shared across all modules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    /// A mutating operation received an empty or missing required argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, SessionError>;

// ---------------------------------------------------------------------------
// Facing direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One connected participant's transient presence state within a room.
///
/// Doubles as the inbound payload for `register`/`move` commands, so every
/// field beyond the identifiers is optional on the wire. `timestamp` is the
/// client-supplied last-update time in milliseconds; it is stored as received,
/// with no per-player monotonicity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub room_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub is_moving: bool,
    #[serde(default)]
    pub animation: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        room_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            username: username.into(),
            x: 0.0,
            y: 0.0,
            direction: Direction::default(),
            is_moving: false,
            animation: String::new(),
            timestamp: 0,
        }
    }

    /// Overwrite every movement-related field from `update` as one unit.
    ///
    /// Identity fields (`id`, `room_id`, `username`) are left untouched.
    pub fn apply_movement(&mut self, update: &Player) {
        self.x = update.x;
        self.y = update.y;
        self.direction = update.direction;
        self.is_moving = update.is_moving;
        self.animation = update.animation.clone();
        self.timestamp = update.timestamp;
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub active_rooms: usize,
    pub total_players: usize,
}
