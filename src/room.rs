//! Room: a named session bucket owning its concurrent player table.

use crate::types::Player;
use log::debug;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// An isolated, named grouping of players sharing one map instance.
///
/// The room exclusively owns its player table; all mutation goes through the
/// methods below, each of which holds the table's write lock for the duration
/// of the change so readers never observe a half-written record. Players keep
/// only the room *id*, never a reference back to the room, so rooms and
/// players serialize independently for broadcast.
pub struct Room {
    pub id: String,
    players: RwLock<HashMap<String, Player>>,
}

impl Room {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the entry for `player.id`.
    pub fn add_player(&self, player: Player) {
        self.players.write().insert(player.id.clone(), player);
    }

    /// Remove a player if present. Removing an unknown id is not an error.
    pub fn remove_player(&self, id: &str) -> Option<Player> {
        self.players.write().remove(id)
    }

    /// Insert-or-update for the `register` command.
    ///
    /// A new player is placed at the coordinates `spawn` yields; an existing
    /// player only has its username refreshed — re-registration must never
    /// teleport someone back to spawn. Returns `true` if the player was newly
    /// inserted.
    pub fn register_player<F>(&self, mut incoming: Player, spawn: F) -> bool
    where
        F: FnOnce() -> (f64, f64),
    {
        let mut players = self.players.write();
        match players.entry(incoming.id.clone()) {
            Entry::Occupied(mut e) => {
                let existing = e.get_mut();
                debug!(
                    "Player {} already in room {} at ({:.1}, {:.1})",
                    existing.id, self.id, existing.x, existing.y
                );
                existing.username = incoming.username;
                false
            }
            Entry::Vacant(v) => {
                let (x, y) = spawn();
                incoming.x = x;
                incoming.y = y;
                v.insert(incoming);
                true
            }
        }
    }

    /// Overwrite a player's movement fields in place, as one unit.
    ///
    /// Returns `false` (no-op) if no player with `update.id` is present.
    pub fn apply_movement(&self, update: &Player) -> bool {
        let mut players = self.players.write();
        match players.get_mut(&update.id) {
            Some(existing) => {
                existing.apply_movement(update);
                true
            }
            None => false,
        }
    }

    /// Momentarily-consistent snapshot of the player table for broadcast.
    pub fn players(&self) -> HashMap<String, Player> {
        self.players.read().clone()
    }

    pub fn player(&self, id: &str) -> Option<Player> {
        self.players.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.read().is_empty()
    }
}
