//! Dispatch integration – SessionAgent drives the registry from a command
//! channel and fans room snapshots out to broadcast subscribers.
//!
//! ## Command contract (inbound)
//!
//! | Command      | Payload keys                         | Effect                       |
//! |--------------|--------------------------------------|------------------------------|
//! | `createRoom` | username, roomId                     | idempotent create + ack      |
//! | `joinRoom`   | username, roomId                     | create-if-absent + ack       |
//! | `register`   | id, roomId, username                 | `register_player` + snapshot |
//! | `move`       | id, roomId, x, y, direction, …       | `move_player` + snapshot     |
//! | `leaveRoom`  | roomId, playerId                     | `leave_room` + snapshot      |
//!
//! ## Event contract (outbound)
//!
//! | Topic                    | Payload type        |
//! |--------------------------|---------------------|
//! | `queue/roomCreated`      | `RoomAck`           |
//! | `queue/joinResult`       | `RoomAck`           |
//! | `rooms/{roomId}/players` | `PlayersSnapshot`   |
//!
//! The agent is transport-agnostic: how commands are framed (WebSocket,
//! STOMP, stdin…) and how events reach subscribers is the embedding layer's
//! concern. Register/move against a room that was never created produce no
//! snapshot at all — the registry reports "nothing happened" and the agent
//! stays quiet.

use crate::protocol::{topics, PlayersSnapshot, RoomAck, SessionCommand};
use crate::registry::SessionRegistry;
use crate::room::Room;
use bytes::Bytes;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionAgentConfig {
    /// Bound of the inbound command queue.
    pub command_capacity: usize,
    /// Bound of the outbound broadcast ring; slow subscribers lag, they do
    /// not block the agent.
    pub broadcast_capacity: usize,
}

impl Default for SessionAgentConfig {
    fn default() -> Self {
        Self {
            command_capacity: 256,
            broadcast_capacity: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound event
// ---------------------------------------------------------------------------

/// One serialized broadcast payload. `Bytes` so fanning out to many
/// subscribers clones cheaply.
#[derive(Debug, Clone)]
pub struct OutboundEvent {
    pub topic: String,
    pub payload: Bytes,
}

// ---------------------------------------------------------------------------
// SessionAgent
// ---------------------------------------------------------------------------

/// Wraps a [`SessionRegistry`] and drives it from dispatch commands.
///
/// Call [`SessionAgent::run`] inside a Tokio task to start the agent.
pub struct SessionAgent {
    registry: Arc<SessionRegistry>,
    commands: mpsc::Receiver<SessionCommand>,
    outbound: broadcast::Sender<OutboundEvent>,
}

/// Handles for feeding the agent and listening to it.
pub struct SessionAgentHandles {
    pub commands: mpsc::Sender<SessionCommand>,
    pub outbound: broadcast::Sender<OutboundEvent>,
}

impl SessionAgent {
    pub fn new(
        config: SessionAgentConfig,
        registry: Arc<SessionRegistry>,
    ) -> (Self, SessionAgentHandles) {
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
        let (outbound_tx, _) = broadcast::channel(config.broadcast_capacity);
        let agent = Self {
            registry,
            commands: command_rx,
            outbound: outbound_tx.clone(),
        };
        let handles = SessionAgentHandles {
            commands: command_tx,
            outbound: outbound_tx,
        };
        (agent, handles)
    }

    /// Drain commands until the channel closes or SIGINT arrives.
    pub async fn run(mut self) {
        info!("SessionAgent active");
        loop {
            tokio::select! {
                maybe_cmd = self.commands.recv() => {
                    match maybe_cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => {
                            info!("SessionAgent command channel closed; stopping");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("SessionAgent shutting down (SIGINT)");
                    break;
                }
            }
        }
    }

    fn handle_command(&self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::CreateRoom(req) => {
                if req.room_id.is_empty() {
                    warn!("Invalid roomId in createRoom from user: {}", req.username);
                    self.publish(topics::ROOM_CREATED, &RoomAck::rejected("", "Invalid roomId"));
                    return;
                }
                match self.registry.create_room(&req.room_id) {
                    Ok(()) => {
                        self.publish(topics::ROOM_CREATED, &RoomAck::ok(&req.room_id));
                    }
                    Err(e) => {
                        self.publish(
                            topics::ROOM_CREATED,
                            &RoomAck::rejected(&req.room_id, e.to_string()),
                        );
                    }
                }
            }
            SessionCommand::JoinRoom(req) => {
                if req.room_id.is_empty() {
                    warn!("Invalid roomId in joinRoom from user: {}", req.username);
                    self.publish(topics::JOIN_RESULT, &RoomAck::rejected("", "Invalid roomId"));
                    return;
                }
                if !self.registry.room_exists(&req.room_id) {
                    info!("Room {} doesn't exist; creating for join", req.room_id);
                    if let Err(e) = self
                        .registry
                        .add_room(&req.room_id, Room::new(&req.room_id))
                    {
                        self.publish(
                            topics::JOIN_RESULT,
                            &RoomAck::rejected(&req.room_id, e.to_string()),
                        );
                        return;
                    }
                }
                info!("Player {} joining room {}", req.username, req.room_id);
                self.publish(topics::JOIN_RESULT, &RoomAck::ok(&req.room_id));
            }
            SessionCommand::Register(player) => {
                let room_id = player.room_id.clone();
                if self.registry.register_player(player) {
                    self.broadcast_players(&room_id);
                }
            }
            SessionCommand::Move(update) => {
                if self.registry.move_player(&update) {
                    self.broadcast_players(&update.room_id);
                }
            }
            SessionCommand::LeaveRoom(req) => {
                if req.room_id.is_empty() || req.player_id.is_empty() {
                    warn!("Invalid leaveRoom payload");
                    return;
                }
                self.registry.leave_room(&req.room_id, &req.player_id);
                // The snapshot is empty when the leave emptied the room;
                // subscribers clear their local state from it.
                self.broadcast_players(&req.room_id);
            }
        }
    }

    fn broadcast_players(&self, room_id: &str) {
        let snapshot = PlayersSnapshot {
            room_id: room_id.to_string(),
            players: self.registry.players_in_room(room_id),
        };
        debug!(
            "Broadcasting {} player(s) for room {}",
            snapshot.players.len(),
            room_id
        );
        self.publish(&topics::room_players(room_id), &snapshot);
    }

    /// Serialize `payload` and push it on the broadcast channel.
    ///
    /// Errors are logged and swallowed — a missing subscriber or a failed
    /// serialisation must not take the agent down.
    fn publish<T: serde::Serialize>(&self, topic: &str, payload: &T) {
        match serde_json::to_vec(payload) {
            Ok(bytes) => {
                let event = OutboundEvent {
                    topic: topic.to_string(),
                    payload: Bytes::from(bytes),
                };
                if self.outbound.send(event).is_err() {
                    debug!("No subscribers for topic {}", topic);
                }
            }
            Err(e) => warn!("Failed to serialise event for {}: {}", topic, e),
        }
    }
}
