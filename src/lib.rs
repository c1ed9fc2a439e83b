//! Hive Session
//!
//! An in-memory room/player session registry for a shared-map multiplayer
//! presence feature, packaged as a standalone library plus a thin
//! JSON-lines server binary.
//!
//! ## Architecture
//!
//! ```text
//! SessionAgent  (dispatch.rs)  ← command intake, snapshot fanout
//!   └── SessionRegistry  (registry.rs)  ← room table, operation contracts
//!         └── Room  (room.rs)           ← per-room player table
//!               └── Player  (types.rs)
//!         └── SpawnPointSource (spawn.rs) ← initial (x, y) for new players
//! ```
//!
//! State is ephemeral: the registry starts empty and is discarded on
//! shutdown. Rooms are created on demand and dropped as soon as their last
//! player leaves. The crate speaks no transport of its own — WebSocket/STOMP
//! framing, auth and the actual push to subscribers live in the embedding
//! dispatch layer.

// Protocol types are always available (no server feature needed).
pub mod protocol;
pub mod types;

// Server-side modules require the `server` feature.
#[cfg(feature = "server")]
pub mod dispatch;
#[cfg(feature = "server")]
pub mod registry;
#[cfg(feature = "server")]
pub mod room;
#[cfg(feature = "server")]
pub mod spawn;

// Convenience re-exports (server only)
#[cfg(feature = "server")]
pub use dispatch::{OutboundEvent, SessionAgent, SessionAgentConfig, SessionAgentHandles};
#[cfg(feature = "server")]
pub use registry::SessionRegistry;
#[cfg(feature = "server")]
pub use room::Room;
#[cfg(feature = "server")]
pub use spawn::{FixedSpawn, MapLayoutSpawns, SpawnPointSource, FALLBACK_SPAWN};
pub use types::{Direction, Player, RegistryStats, SessionError};
