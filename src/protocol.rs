//! Session wire protocol.
//!
//! This module owns **every message that crosses the dispatch boundary**
//! between the session registry and any consumer (WebSocket bridge, another
//! server, a test harness…).
//!
//! ## Channel namespaces
//!
//! | Topic                     | Direction       | Payload                |
//! |---------------------------|-----------------|------------------------|
//! | `queue/roomCreated`       | server → caller | [`RoomAck`]            |
//! | `queue/joinResult`        | server → caller | [`RoomAck`]            |
//! | `rooms/{roomId}/players`  | server → room   | [`PlayersSnapshot`]    |
//!
//! ## Design rules
//!
//! 1. Every struct must be `Serialize + Deserialize` with camelCase JSON.
//! 2. No lock types or registry internals leak out — snapshots only.
//! 3. A snapshot always carries the **full** player mapping for its room;
//!    subscribers replace, never patch.

use crate::types::Player;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Inbound requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub username: String,
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub username: String,
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    pub room_id: String,
    pub player_id: String,
}

/// Every command the dispatch layer can feed into the session agent.
///
/// `register` and `move` carry the full [`Player`] payload shape; on
/// `register` the coordinates are ignored (the spawn provider decides).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionCommand {
    CreateRoom(CreateRoomRequest),
    JoinRoom(JoinRoomRequest),
    Register(Player),
    Move(Player),
    LeaveRoom(LeaveRoomRequest),
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Acknowledgement for room creation/join commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAck {
    pub room_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RoomAck {
    pub fn ok(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            success: true,
            message: None,
        }
    }

    pub fn rejected(room_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Full current player mapping for one room, pushed after every state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersSnapshot {
    pub room_id: String,
    pub players: HashMap<String, Player>,
}

// ---------------------------------------------------------------------------
// Topic helpers
// ---------------------------------------------------------------------------

/// All broadcast topics used by the session protocol.
pub mod topics {
    pub const ROOM_CREATED: &str = "queue/roomCreated";
    pub const JOIN_RESULT: &str = "queue/joinResult";

    /// Per-room player-state topic.
    pub fn room_players(room_id: &str) -> String {
        format!("rooms/{}/players", room_id)
    }
}
