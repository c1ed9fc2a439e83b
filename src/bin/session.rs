//! hive-session-server binary
//!
//! Runs the session registry behind a JSON-lines command interface: one
//! [`SessionCommand`] per line on stdin, one `{topic, payload}` event per
//! line on stdout. A transport bridge (WebSocket gateway, test harness…)
//! pipes through this process.
//!
//! ## Configuration (CLI / env / TOML via `config` crate)
//!
//! | Key                          | Default   | Description                      |
//! |------------------------------|-----------|----------------------------------|
//! | `SESSION_MAP_LAYOUT`         | *(none)*  | Tiled JSON map with spawn points |
//! | `SESSION_CONFIG`             | *(none)*  | Optional TOML settings file      |
//! | `SESSION_COMMAND_CAPACITY`   | `256`     | Inbound command queue bound      |
//! | `SESSION_BROADCAST_CAPACITY` | `256`     | Outbound broadcast ring bound    |

use anyhow::{Context, Result};
use clap::Parser;
use hive_session::{
    dispatch::{SessionAgent, SessionAgentConfig, SessionAgentHandles},
    protocol::SessionCommand,
    registry::SessionRegistry,
    spawn::{FixedSpawn, MapLayoutSpawns, SpawnPointSource},
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "hive-session-server", about = "Shared-map session registry", version)]
struct Args {
    /// Tiled-style JSON map layout providing spawn points
    #[arg(long, env = "SESSION_MAP_LAYOUT")]
    map_layout: Option<PathBuf>,

    /// Optional TOML settings file (keys below; env SESSION_* overrides)
    #[arg(long, env = "SESSION_CONFIG")]
    config: Option<PathBuf>,

    /// Inbound command queue bound
    #[arg(long, env = "SESSION_COMMAND_CAPACITY", default_value_t = 256)]
    command_capacity: usize,

    /// Outbound broadcast ring bound
    #[arg(long, env = "SESSION_BROADCAST_CAPACITY", default_value_t = 256)]
    broadcast_capacity: usize,
}

/// Settings file shape; every key is optional and CLI args win.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    map_layout: Option<PathBuf>,
    command_capacity: Option<usize>,
    broadcast_capacity: Option<usize>,
}

fn load_settings(path: &PathBuf) -> Result<FileSettings> {
    config::Config::builder()
        .add_source(config::File::from(path.clone()))
        .add_source(config::Environment::with_prefix("SESSION"))
        .build()
        .with_context(|| format!("Failed to load settings from {}", path.display()))?
        .try_deserialize()
        .context("Invalid settings file")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hive_session=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => FileSettings::default(),
    };

    let map_layout = args.map_layout.or(settings.map_layout);
    let agent_config = SessionAgentConfig {
        command_capacity: settings.command_capacity.unwrap_or(args.command_capacity),
        broadcast_capacity: settings
            .broadcast_capacity
            .unwrap_or(args.broadcast_capacity),
    };

    log::info!(
        "Starting hive-session-server (map_layout={:?}, command_capacity={}, broadcast_capacity={})",
        map_layout,
        agent_config.command_capacity,
        agent_config.broadcast_capacity,
    );

    // Spawn provider: map layout when given, fixed fallback otherwise
    let spawn: Arc<dyn SpawnPointSource> = match map_layout {
        Some(path) => Arc::new(MapLayoutSpawns::from_layout_file(path)),
        None => Arc::new(FixedSpawn::default()),
    };

    let registry = Arc::new(SessionRegistry::new(spawn));
    let (agent, handles) = SessionAgent::new(agent_config, registry);
    let SessionAgentHandles { commands, outbound } = handles;

    // stdin → commands. Dropping the sender on EOF closes the agent loop.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<SessionCommand>(line) {
                        Ok(cmd) => {
                            if commands.send(cmd).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => log::warn!("Ignoring malformed command line: {}", e),
                    }
                }
                Ok(None) => {
                    log::info!("stdin closed; no further commands");
                    break;
                }
                Err(e) => {
                    log::warn!("stdin read error: {}", e);
                    break;
                }
            }
        }
    });

    // events → stdout
    let mut events = outbound.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let payload: serde_json::Value =
                        serde_json::from_slice(&event.payload).unwrap_or(serde_json::Value::Null);
                    let line = serde_json::json!({
                        "topic": event.topic,
                        "payload": payload,
                    });
                    println!("{}", line);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    log::warn!("stdout bridge lagged; dropped {} event(s)", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Run until stdin EOF or SIGINT (handled inside the agent loop)
    agent.run().await;
    Ok(())
}
