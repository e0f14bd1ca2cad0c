//! # Digit-Ink Client Library
//!
//! The async edge of the digit-ink pipeline: one persistent WebSocket
//! connection to the inference service, and a single-task session loop that
//! interleaves pointer events, the frame clock, and inbound predictions.
//! This library is used by both the binary and integration tests.

pub mod channel;
pub mod config;
pub mod session;

pub use channel::{ChannelError, ChannelState, InferenceChannel, PredictionFrames};
pub use config::ClientConfig;
pub use session::{Session, SessionCommand, SessionHandle};
