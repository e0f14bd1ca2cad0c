//! Test server harness: an in-process stand-in for the inference service.
//!
//! Spins up a real Axum WebSocket server on a random port so the channel
//! and session are exercised over actual connections.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use url::Url;

/// Shared state for the stub's socket handlers.
#[derive(Clone)]
struct StubState {
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    outbound_tx: broadcast::Sender<String>,
    auto_reply: Option<String>,
    shutdown_rx: watch::Receiver<bool>,
}

/// A stub inference service with control handles.
pub struct InferenceStub {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    outbound_tx: broadcast::Sender<String>,
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: JoinHandle<()>,
}

impl InferenceStub {
    /// Start a stub that records inbound frames and replies with nothing.
    pub async fn start() -> Self {
        Self::start_with_auto_reply(None).await
    }

    /// Start a stub that answers every inbound frame with `reply`.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or the server fails to bind.
    pub async fn start_with_auto_reply(reply: Option<String>) -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let received = Arc::new(Mutex::new(Vec::new()));
        let (outbound_tx, _) = broadcast::channel(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let state = StubState {
            received: received.clone(),
            outbound_tx: outbound_tx.clone(),
            auto_reply: reply,
            shutdown_rx: shutdown_rx.clone(),
        };

        let app = Router::new()
            .route("/nn/ws", get(ws_handler))
            .with_state(state);

        let listener = TcpListener::bind(addr).await.expect("failed to bind");
        let actual_addr = listener.local_addr().expect("failed to get local addr");

        let mut serve_shutdown_rx = shutdown_rx;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = serve_shutdown_rx.wait_for(|stop| *stop).await;
                })
                .await
                .expect("server error");
        });

        // Give the server a moment to start.
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr: actual_addr,
            received,
            outbound_tx,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// The WebSocket endpoint clients should connect to.
    pub fn endpoint(&self) -> Url {
        Url::parse(&format!("ws://{}/nn/ws", self.addr)).expect("stub url is valid")
    }

    /// Frames received from the client so far, parsed as JSON.
    pub fn received(&self) -> Vec<serde_json::Value> {
        self.received.lock().expect("received lock").clone()
    }

    /// Push a raw text frame to every connected client.
    pub fn push_frame(&self, raw: &str) {
        // No receivers just means no client is connected yet.
        let _ = self.outbound_tx.send(raw.to_string());
    }

    /// Gracefully shut down the stub, closing client connections.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        let _ = tokio::time::timeout(tokio::time::Duration::from_secs(5), self.handle).await;
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<StubState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: StubState) {
    let mut outbound = state.outbound_tx.subscribe();
    let mut shutdown = state.shutdown_rx.clone();
    loop {
        tokio::select! {
            // Close live connections on shutdown so graceful shutdown can
            // finish and clients observe the peer going away.
            // Fires when the flag flips to true or the stub is dropped.
            _ = shutdown.changed() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
            frame = outbound.recv() => match frame {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                        state.received.lock().expect("received lock").push(value);
                    }
                    if let Some(reply) = &state.auto_reply {
                        if socket.send(Message::Text(reply.clone().into())).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }
}
