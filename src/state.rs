use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use uuid::Uuid;

use crate::debug_builders::DebugOverlay;
use crate::physics::{PhysicsWorld, VehicleSnapshot};

/// Client -> server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Ping,
    /// Re-initialize every vehicle: spawn pose, zero velocity.
    Reset,
}

/// Server -> client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Welcome { client_id: String },
    Snapshot(Snapshot),
    Pong,
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
    pub debug: Option<DebugOverlay>,
}

/// Work queued by client tasks, drained by the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ResetVehicles,
}

#[derive(Default)]
pub struct SharedGameState {
    pub tick: u64,
    pub clients: HashMap<Uuid, UnboundedSender<String>>,
    pub commands: Vec<Command>,
}

impl SharedGameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.insert(id, tx);
        id
    }

    pub fn remove_client(&mut self, id: &Uuid) {
        self.clients.remove(id);
    }

    pub fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn snapshot(&self, physics: &PhysicsWorld) -> Snapshot {
        Snapshot {
            tick: self.tick,
            vehicles: physics.vehicle_snapshots(),
            debug: physics.debug_snapshot(),
        }
    }

    /// Serialize one snapshot and send it to every client. Clients whose
    /// channel has closed are dropped.
    pub fn broadcast_snapshot(&mut self, physics: &PhysicsWorld) -> Result<usize, serde_json::Error> {
        if self.clients.is_empty() {
            return Ok(0);
        }

        let json = serde_json::to_string(&ServerMessage::Snapshot(self.snapshot(physics)))?;

        self.clients.retain(|id, tx| {
            let alive = tx.send(json.clone()).is_ok();
            if !alive {
                debug!("Dropping closed client {}", id);
            }
            alive
        });
        Ok(self.clients.len())
    }
}
