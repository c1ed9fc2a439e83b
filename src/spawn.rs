//! Spawn points: SpawnPointSource trait, map-layout parsing, fixed fallback.

use log::{debug, warn};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Coordinate handed out when no spawn data is available.
pub const FALLBACK_SPAWN: (f64, f64) = (400.0, 300.0);

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Anything that can supply an initial (x, y) for a newly registered player.
///
/// Best-effort by contract: implementations must always return a valid pair
/// and never surface an error to the registry.
pub trait SpawnPointSource: Send + Sync {
    fn spawn_coordinates(&self) -> (f64, f64);
}

// ---------------------------------------------------------------------------
// Fixed spawn
// ---------------------------------------------------------------------------

/// Constant spawn coordinate. Default is [`FALLBACK_SPAWN`].
#[derive(Debug, Clone, Copy)]
pub struct FixedSpawn {
    pub x: f64,
    pub y: f64,
}

impl FixedSpawn {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for FixedSpawn {
    fn default() -> Self {
        let (x, y) = FALLBACK_SPAWN;
        Self { x, y }
    }
}

impl SpawnPointSource for FixedSpawn {
    fn spawn_coordinates(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Map-layout spawns
// ---------------------------------------------------------------------------

/// Spawn points parsed from a static Tiled-style JSON map layout.
///
/// Scans every object-group layer for objects whose name contains "spawn"
/// (case-insensitive) and hands the collected points out round-robin so
/// simultaneous joiners spread out. Missing or malformed layout data degrades
/// to [`FALLBACK_SPAWN`] with a logged warning; no error reaches callers.
pub struct MapLayoutSpawns {
    points: Vec<(f64, f64)>,
    next: AtomicUsize,
}

impl MapLayoutSpawns {
    /// Read and parse a layout file once at startup.
    pub fn from_layout_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_layout_str(&raw),
            Err(e) => {
                warn!("Failed to read map layout {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn from_layout_str(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(layout) => Self::from_layout_value(&layout),
            Err(e) => {
                warn!("Malformed map layout JSON: {}", e);
                Self::empty()
            }
        }
    }

    pub fn from_layout_value(layout: &serde_json::Value) -> Self {
        let points = collect_spawn_objects(layout);
        if points.is_empty() {
            warn!("Map layout contains no spawn objects; using fallback spawn");
        } else {
            debug!("Loaded {} spawn point(s) from map layout", points.len());
        }
        Self {
            points,
            next: AtomicUsize::new(0),
        }
    }

    fn empty() -> Self {
        Self {
            points: Vec::new(),
            next: AtomicUsize::new(0),
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

impl SpawnPointSource for MapLayoutSpawns {
    fn spawn_coordinates(&self) -> (f64, f64) {
        if self.points.is_empty() {
            return FALLBACK_SPAWN;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.points[i % self.points.len()]
    }
}

// ---------------------------------------------------------------------------
// Layout parsing
// ---------------------------------------------------------------------------

/// Walk `layers[] → type == "objectgroup" → objects[]` and pull out every
/// object whose name mentions "spawn".
fn collect_spawn_objects(layout: &serde_json::Value) -> Vec<(f64, f64)> {
    let mut points = Vec::new();

    let layers = match layout.get("layers").and_then(|l| l.as_array()) {
        Some(layers) => layers,
        None => return points,
    };

    for layer in layers {
        let is_objectgroup = layer
            .get("type")
            .and_then(|t| t.as_str())
            .map(|t| t == "objectgroup")
            .unwrap_or(false);
        if !is_objectgroup {
            continue;
        }

        let Some(objects) = layer.get("objects").and_then(|o| o.as_array()) else {
            continue;
        };

        for obj in objects {
            let name = obj.get("name").and_then(|n| n.as_str()).unwrap_or("");
            if !name.to_ascii_lowercase().contains("spawn") {
                continue;
            }
            let (Some(x), Some(y)) = (
                obj.get("x").and_then(|v| v.as_f64()),
                obj.get("y").and_then(|v| v.as_f64()),
            ) else {
                continue;
            };
            points.push((x, y));
        }
    }

    points
}
