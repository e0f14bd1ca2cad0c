//! # Inference Transport Channel
//!
//! One persistent duplex WebSocket connection to the inference service for
//! the lifetime of a session.
//!
//! ## Message Protocol
//!
//! ### Client -> Server (one frame per export tick)
//!
//! - `{"pixels": [<784 floats in [0,1]>]}` (row-major 28x28)
//!
//! ### Server -> Client (one frame per prediction)
//!
//! - `{"p1": {"label": ..., "confidence": ...}, "p2": {...}, "p3": {...}}`
//!
//! Delivery is fire-and-forget in both directions: sends are at-most-once
//! per tick with no acknowledgement, and a malformed inbound frame is
//! dropped without disturbing the connection. Once the channel reaches
//! `Closed` - locally, by the peer, or through a transport error - it stays
//! Closed; there is no reconnection.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use ink_core::{FeatureVector, Prediction};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Handshake not yet completed.
    Connecting,
    /// Connected; sends are transmitted.
    Open,
    /// Connection is gone and will not come back this session.
    Closed,
}

/// Errors raised while establishing the channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The WebSocket handshake failed.
    #[error("Connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Outgoing wire frame wrapping one feature vector.
#[derive(Debug, Serialize)]
struct FeatureMessage<'a> {
    pixels: &'a FeatureVector,
}

/// The outbound half of the duplex channel, plus the lifecycle state.
///
/// `send` honors the core invariant: a feature vector is transmitted iff
/// the channel is Open, and a tick whose channel is not Open silently
/// drops its data. No queueing, no retry.
#[derive(Debug)]
pub struct InferenceChannel {
    state: ChannelState,
    writer: Option<SplitSink<WsStream, Message>>,
}

/// The inbound half: a stream of parsed predictions.
///
/// Kept separate from [`InferenceChannel`] so the session loop can poll
/// for predictions while the outbound half stays free for sends.
#[derive(Debug)]
pub struct PredictionFrames {
    reader: Option<SplitStream<WsStream>>,
}

impl InferenceChannel {
    /// Open the persistent connection to the inference service.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Connect`] if the handshake fails. Callers
    /// that want the specified silent-degradation behavior pair this with
    /// [`InferenceChannel::closed`].
    pub async fn open(endpoint: &Url) -> Result<(Self, PredictionFrames), ChannelError> {
        tracing::debug!(%endpoint, "Connecting to inference service");
        let (socket, _response) = connect_async(endpoint.as_str()).await?;
        tracing::info!(%endpoint, "Inference channel connected");

        let (writer, reader) = socket.split();
        Ok((
            Self {
                state: ChannelState::Open,
                writer: Some(writer),
            },
            PredictionFrames {
                reader: Some(reader),
            },
        ))
    }

    /// A channel that never connected. Sends are no-ops, the inbound
    /// stream is empty; the rest of the pipeline runs undisturbed.
    #[must_use]
    pub fn closed() -> (Self, PredictionFrames) {
        (
            Self {
                state: ChannelState::Closed,
                writer: None,
            },
            PredictionFrames { reader: None },
        )
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether sends currently transmit.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Send one feature vector as a single text frame, fire-and-forget.
    ///
    /// A no-op unless the channel is Open. A transport failure during the
    /// write closes the channel for the rest of the session.
    pub async fn send(&mut self, features: &FeatureVector) {
        if self.state != ChannelState::Open {
            tracing::trace!("Dropping export: channel not open");
            return;
        }
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        let frame = match serde_json::to_string(&FeatureMessage { pixels: features }) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize feature vector: {e}");
                return;
            }
        };

        if let Err(e) = writer.send(Message::Text(frame)).await {
            tracing::warn!("Send failed, closing channel: {e}");
            self.state = ChannelState::Closed;
            self.writer = None;
        }
    }

    /// Note that the peer (or transport) ended the connection.
    ///
    /// Called by the session when the inbound stream runs dry so that
    /// subsequent sends degrade to no-ops.
    pub fn mark_closed(&mut self) {
        if self.state != ChannelState::Closed {
            tracing::info!("Inference channel closed by peer");
            self.state = ChannelState::Closed;
            self.writer = None;
        }
    }

    /// Request an orderly close if Connecting or Open. Idempotent.
    pub async fn close(&mut self) {
        if self.state == ChannelState::Closed {
            return;
        }
        if let Some(mut writer) = self.writer.take() {
            // Best effort: the session is over either way.
            let _ = writer.close().await;
        }
        self.state = ChannelState::Closed;
        tracing::info!("Inference channel closed");
    }
}

impl PredictionFrames {
    /// Next prediction from the service, or `None` once the connection is
    /// gone (and on every call thereafter).
    ///
    /// Frames that fail to parse as a prediction are logged and skipped;
    /// one bad frame never affects the next.
    pub async fn next_prediction(&mut self) -> Option<Prediction> {
        let reader = self.reader.as_mut()?;

        while let Some(item) = reader.next().await {
            match item {
                Ok(Message::Text(text)) => match Prediction::from_json(&text) {
                    Ok(prediction) => {
                        tracing::debug!(top = %prediction.top().label, "Prediction received");
                        return Some(prediction);
                    }
                    Err(e) => {
                        tracing::warn!("Discarding malformed prediction frame: {e}");
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {
                    // Binary/ping/pong frames are not part of the protocol.
                }
                Err(e) => {
                    tracing::warn!("Inbound stream error: {e}");
                    break;
                }
            }
        }

        self.reader = None;
        None
    }
}
