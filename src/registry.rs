//! SessionRegistry – the process-wide table of rooms and their players.
//!
//! ## Locking discipline
//!
//! The registry holds one `RwLock` around the room table; each [`Room`] holds
//! its own `RwLock` around its player table. The hot path (`register_player`,
//! `move_player`, reads) takes the room-table lock in **read** mode and does
//! all player mutation under the target room's own lock, so traffic on
//! different rooms never serializes. `leave_room`, `create_room` and
//! `add_room` take the room-table lock in **write** mode: leave must decide
//! "room is now empty → drop it" atomically with respect to an in-flight
//! register, and the write lock excludes exactly those readers.
//!
//! Lock order is always room table → player table; nothing ever takes them in
//! the other order, and no lock is held across I/O.

use crate::room::Room;
use crate::spawn::SpawnPointSource;
use crate::types::{Player, RegistryStats, Result, SessionError};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub struct SessionRegistry {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    spawn: Arc<dyn SpawnPointSource>,
}

impl SessionRegistry {
    pub fn new(spawn: Arc<dyn SpawnPointSource>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            spawn,
        }
    }

    // -----------------------------------------------------------------------
    // Room lifecycle
    // -----------------------------------------------------------------------

    pub fn room_exists(&self, room_id: &str) -> bool {
        self.rooms.read().contains_key(room_id)
    }

    /// Create an empty room if absent (idempotent create).
    pub fn create_room(&self, room_id: &str) -> Result<()> {
        if room_id.is_empty() {
            return Err(SessionError::InvalidArgument("room id must not be empty"));
        }
        let mut rooms = self.rooms.write();
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Room::new(room_id)));
        info!("Room created (or already exists): {}", room_id);
        Ok(())
    }

    /// Insert a pre-built room, unconditionally replacing any existing one.
    pub fn add_room(&self, room_id: &str, room: Room) -> Result<()> {
        if room_id.is_empty() {
            return Err(SessionError::InvalidArgument("room id must not be empty"));
        }
        self.rooms.write().insert(room_id.to_string(), Arc::new(room));
        info!("Added room: {}", room_id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Player lifecycle
    // -----------------------------------------------------------------------

    /// Apply a `register` command.
    ///
    /// A new (room, id) pair is inserted at the spawn provider's coordinates;
    /// a repeat registration only refreshes the username. Missing ids or an
    /// unknown room are absorbed with a warning — duplicate or out-of-order
    /// messages must not crash the session. Returns whether room state
    /// changed, i.e. whether the caller should broadcast a snapshot.
    pub fn register_player(&self, player: Player) -> bool {
        if player.id.is_empty() || player.room_id.is_empty() {
            warn!("Ignoring register with missing player or room id");
            return false;
        }

        // Hold the table read lock across the insert so the room cannot be
        // garbage-collected between lookup and mutation.
        let rooms = self.rooms.read();
        let Some(room) = rooms.get(&player.room_id) else {
            warn!("Register for nonexistent room: {}", player.room_id);
            return false;
        };

        let username = player.username.clone();
        let room_id = player.room_id.clone();
        let inserted = room.register_player(player, || self.spawn.spawn_coordinates());
        if inserted {
            info!(
                "New player {} in room {} ({} total)",
                username,
                room_id,
                room.len()
            );
        }
        true
    }

    /// Apply a `move` command: whole-record overwrite of the player's
    /// movement fields. Unknown room or player is a silent no-op (`false`).
    pub fn move_player(&self, update: &Player) -> bool {
        let rooms = self.rooms.read();
        let Some(room) = rooms.get(&update.room_id) else {
            warn!("Move for nonexistent room: {}", update.room_id);
            return false;
        };

        let applied = room.apply_movement(update);
        if !applied {
            warn!("Move for unknown player {} in room {}", update.id, update.room_id);
        }
        applied
    }

    /// Remove a player; drop the room from the table once it is empty.
    ///
    /// Idempotent: an absent room or player is not an error.
    pub fn leave_room(&self, room_id: &str, player_id: &str) {
        let mut rooms = self.rooms.write();
        let Some(room) = rooms.get(room_id) else {
            debug!("Leave for nonexistent room: {}", room_id);
            return;
        };

        room.remove_player(player_id);
        debug!("Removed player {} from room {}", player_id, room_id);

        if room.is_empty() {
            rooms.remove(room_id);
            info!("Room removed (no players left): {}", room_id);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Snapshot of a room's player mapping; empty if the room is unknown.
    pub fn players_in_room(&self, room_id: &str) -> HashMap<String, Player> {
        match self.rooms.read().get(room_id) {
            Some(room) => room.players(),
            None => HashMap::new(),
        }
    }

    pub fn player_by_id(&self, room_id: &str, player_id: &str) -> Option<Player> {
        self.rooms.read().get(room_id)?.player(player_id)
    }

    pub fn stats(&self) -> RegistryStats {
        let rooms = self.rooms.read();
        RegistryStats {
            active_rooms: rooms.len(),
            total_players: rooms.values().map(|r| r.len()).sum(),
        }
    }
}
