//! # Digit-Ink Core
//!
//! Core logic for the digit-ink streaming pipeline: turn raw pointer input
//! into a bounded-rate sequence of fixed-size MNIST feature vectors.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  ink-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Stroke Capture  │  Feature Extractor       │
//! │  - Pointer FSM   │  - 280x280 -> 28x28 box  │
//! │  - Brush render  │  - Grayscale [0,1]       │
//! ├─────────────────────────────────────────────┤
//! │  Export Gate     │  Prediction Sink         │
//! │  - 150ms floor   │  - Ranked top-3          │
//! │  - Poll, no timer│  - Last-write-wins       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and deterministic; the async transport
//! and session loop live in `ink-client`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod error;
pub mod feature;
pub mod prediction;
pub mod schedule;
pub mod surface;

pub use capture::{PointerEvent, StrokeCapture, StrokeState};
pub use error::{CoreError, CoreResult};
pub use feature::{extract, FeatureVector, FEATURE_LEN, GRID_SIZE};
pub use prediction::{Label, Prediction, PredictionEntry, PredictionSink};
pub use schedule::{ExportGate, EXPORT_INTERVAL_MS};
pub use surface::{Brush, DrawingSurface, SURFACE_SIZE};

/// Ink core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
