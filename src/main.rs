use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use suspension_server::config::SimConfig;
use suspension_server::logging;
use suspension_server::net;
use suspension_server::physics::PhysicsWorld;
use suspension_server::state::SharedGameState;
use suspension_server::tick;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    info!("🚀 Starting suspension server...");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(&path),
        None => {
            info!("No config path given, using defaults");
            Ok(SimConfig::default())
        }
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let listener = match net::bind(&config.server.bind).await {
        Ok(l) => l,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let physics = {
        let mut world = PhysicsWorld::new(
            &config.world,
            config.suspension.ground_filter,
            config.debug.clone(),
        );
        world.spawn_vehicle("vehicle-0", config.vehicle_config());
        Arc::new(Mutex::new(world))
    };

    tokio::spawn(net::serve(listener, Arc::clone(&state)));

    let last = tick::run(physics, state, config.tick_dt(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("ctrl-c handler failed: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;
    info!("Stopped after {} ticks", last);
    ExitCode::SUCCESS
}
