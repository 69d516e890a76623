use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::physics::PhysicsWorld;
use crate::state::{Command, SharedGameState};

/// Fixed-timestep host loop: drain commands, step, broadcast. Returns the
/// last tick number once `shutdown` resolves.
///
/// `shutdown` is polled across iterations, so a signal that lands while a
/// tick is being processed ends the loop at the next check.
pub async fn run(
    physics: Arc<Mutex<PhysicsWorld>>,
    state: Arc<Mutex<SharedGameState>>,
    dt: f32,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    let mut ticker = interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("👋 Shutting down");
                return state.lock().await.tick;
            }
        }

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        for command in game.drain_commands() {
            match command {
                Command::ResetVehicles => phys.reset_all(),
            }
        }

        phys.step(dt);

        // Advance tick + broadcast snapshot
        game.tick += 1;
        if let Err(e) = game.broadcast_snapshot(&phys) {
            warn!("snapshot serialization failed: {}", e);
        }
    }
}
