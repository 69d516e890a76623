use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::error::{ServerError, ServerResult};
use crate::state::{ClientMessage, Command, ServerMessage, SharedGameState};

pub async fn bind(addr: &str) -> ServerResult<TcpListener> {
    let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })?;
    info!("🌐 WebSocket listening on ws://{}", listener.local_addr()?);
    Ok(listener)
}

/// Accept observers forever. A failing connection only ends itself.
pub async fn serve(listener: TcpListener, state: Arc<Mutex<SharedGameState>>) {
    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("accept failed: {}", e);
                continue;
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(raw, peer, state).await {
                warn!("connection {} ended with error: {}", peer, e);
            }
        });
    }
}

async fn handle_connection(
    raw: TcpStream,
    peer: SocketAddr,
    state: Arc<Mutex<SharedGameState>>,
) -> ServerResult<()> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let client_id = state.lock().await.register_client(tx.clone());

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    info!("🟢 Observer connected: {} ({})", client_id, peer);
    let _ = tx.send(serde_json::to_string(&ServerMessage::Welcome { client_id: client_id.to_string() })?);

    // -------------------------------
    // 2) Receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                debug!("read error from {}: {}", client_id, e);
                break;
            }
        };

        let Ok(text) = msg.to_text() else { continue };
        if text.is_empty() {
            continue;
        }

        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Ping) => {
                let _ = tx.send(serde_json::to_string(&ServerMessage::Pong)?);
            }
            Ok(ClientMessage::Reset) => {
                info!("🔄 Reset requested by {}", client_id);
                state.lock().await.push_command(Command::ResetVehicles);
            }
            Err(e) => debug!("ignoring message from {}: {}", client_id, e),
        }
    }

    info!("🔴 Observer disconnected: {}", client_id);
    state.lock().await.remove_client(&client_id);
    Ok(())
}
