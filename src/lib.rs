//! Raycast spring-damper vehicle suspension on top of rapier, plus a small
//! fixed-tick host that streams suspension state to WebSocket observers.

pub mod config;
pub mod debug_builders;
pub mod error;
pub mod logging;
pub mod net;
pub mod physics;
pub mod state;
pub mod suspension;
pub mod terrain;
pub mod tick;
pub mod vehicle;
