//! The streaming session: one task, three event sources.
//!
//! All pipeline state lives on a single tokio task; pointer events, the
//! frame clock, and inbound predictions interleave through one `select!`
//! loop, so the drawing surface has exactly one writer and no locking.
//! Within a frame tick, extraction happens-before the send of that tick's
//! vector; across ticks, sends leave in firing order. Prediction replies
//! carry no correlation id - the sink simply holds the newest one received.

use ink_core::{
    extract, ExportGate, PointerEvent, Prediction, PredictionSink, StrokeCapture,
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::channel::{InferenceChannel, PredictionFrames};
use crate::config::ClientConfig;

/// Commands the presentation layer can feed into a running session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    /// A pointer event on the drawing surface.
    Pointer(PointerEvent),
    /// Wipe the drawing surface.
    Clear,
    /// End the session: stop the loop, detach inputs, close the channel.
    Shutdown,
}

/// Handle to a running session.
///
/// Dropping every handle has the same effect as [`SessionHandle::shutdown`]:
/// the command channel closes and the session tears down.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    predictions: watch::Receiver<Option<Prediction>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Feed one pointer event. Silently dropped if the session has ended.
    pub fn pointer(&self, event: PointerEvent) {
        let _ = self.commands.send(SessionCommand::Pointer(event));
    }

    /// Wipe the drawing surface.
    pub fn clear(&self) {
        let _ = self.commands.send(SessionCommand::Clear);
    }

    /// Watch the latest prediction (`None` until the first result).
    ///
    /// Last write wins: a slow observer sees only the newest value.
    #[must_use]
    pub fn predictions(&self) -> watch::Receiver<Option<Prediction>> {
        self.predictions.clone()
    }

    /// Tear the session down and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
        let _ = self.task.await;
    }
}

/// The session state machine. Constructed and run only via [`Session::spawn`].
pub struct Session {
    capture: StrokeCapture,
    gate: ExportGate,
    sink: PredictionSink,
    channel: InferenceChannel,
    frames: PredictionFrames,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    predictions: watch::Sender<Option<Prediction>>,
    frame_interval: Duration,
}

impl Session {
    /// Connect and start a session on its own task.
    ///
    /// If the connection cannot be established the session still runs -
    /// strokes render and the gate fires, but every send is a silent no-op.
    /// That mirrors the behavior after a mid-session disconnect: this
    /// pipeline never surfaces transport trouble as an error.
    #[must_use]
    pub fn spawn(config: ClientConfig) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (prediction_tx, prediction_rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let (channel, frames) = match InferenceChannel::open(&config.endpoint).await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("Starting session without a connection: {e}");
                    InferenceChannel::closed()
                }
            };

            let session = Session {
                capture: StrokeCapture::new(),
                gate: ExportGate::with_interval(config.export_interval_ms),
                sink: PredictionSink::new(),
                channel,
                frames,
                commands: command_rx,
                predictions: prediction_tx,
                frame_interval: config.frame_interval,
            };
            session.run().await;
        });

        SessionHandle {
            commands: command_tx,
            predictions: prediction_rx,
            task,
        }
    }

    async fn run(mut self) {
        let epoch = Instant::now();
        let mut frame = tokio::time::interval(self.frame_interval);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut inbound_open = self.channel.is_open();

        tracing::debug!("Session loop started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Pointer(event)) => self.capture.pointer(event),
                    Some(SessionCommand::Clear) => self.capture.clear(),
                    Some(SessionCommand::Shutdown) | None => break,
                },
                _ = frame.tick() => {
                    let now_ms = u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if self.gate.should_fire(now_ms) {
                        let features = extract(self.capture.surface());
                        tracing::trace!(
                            coverage = f64::from(features.coverage()),
                            "Export tick"
                        );
                        self.channel.send(&features).await;
                    }
                },
                prediction = self.frames.next_prediction(), if inbound_open => {
                    match prediction {
                        Some(prediction) => {
                            self.sink.set(prediction);
                            let _ = self.predictions.send(self.sink.latest().cloned());
                        }
                        None => {
                            // Peer is gone; keep polling and drawing, but
                            // every further send becomes a no-op.
                            inbound_open = false;
                            self.channel.mark_closed();
                        }
                    }
                },
            }
        }

        // Mandatory teardown: returning stops the frame clock, dropping
        // the receiver detaches the pointer bindings, and the channel gets
        // an orderly close.
        self.channel.close().await;
        tracing::debug!("Session loop ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    /// A session whose connection is refused still captures strokes and
    /// shuts down cleanly - transport trouble is never an error here.
    #[tokio::test]
    async fn test_session_runs_degraded_without_connection() {
        let endpoint = Url::parse("ws://127.0.0.1:1/nn/ws").expect("valid url");
        let mut config = ClientConfig::new(endpoint);
        config.export_interval_ms = 10;
        config.frame_interval = Duration::from_millis(2);

        let handle = Session::spawn(config);
        handle.pointer(PointerEvent::Down { x: 40.0, y: 40.0 });
        handle.pointer(PointerEvent::Move { x: 200.0, y: 200.0 });
        handle.pointer(PointerEvent::Up);
        handle.clear();

        // Let a few gate fires happen with the channel closed.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let predictions = handle.predictions();
        assert!(predictions.borrow().is_none());

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown should not hang");
    }
}
