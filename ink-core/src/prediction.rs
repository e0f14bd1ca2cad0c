//! Prediction results and the sink that holds the latest one.
//!
//! The inference service replies with its top three guesses per feature
//! vector. Replies carry no correlation id, so a result is simply "the
//! newest one received" and replaces its predecessor wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A digit label as the inference service reports it.
///
/// Some deployments send labels as integers, others as strings; both
/// appear on the wire, so the model accepts either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    /// Numeric label (0-9).
    Digit(u8),
    /// String label, e.g. `"7"`.
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One ranked guess: a label and the model's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    /// The predicted digit.
    pub label: Label,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

/// A complete prediction: exactly three entries ranked by descending
/// confidence (`p1` is the model's best guess).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Rank 1 (highest confidence).
    pub p1: PredictionEntry,
    /// Rank 2.
    pub p2: PredictionEntry,
    /// Rank 3.
    pub p3: PredictionEntry,
}

impl Prediction {
    /// Parse a prediction from a raw wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] if the payload does not match
    /// the expected `{"p1": .., "p2": .., "p3": ..}` shape. A malformed
    /// frame affects that frame only; callers drop it and move on.
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        serde_json::from_str(raw).map_err(CoreError::from)
    }

    /// The entries in rank order.
    #[must_use]
    pub fn ranked(&self) -> [&PredictionEntry; 3] {
        [&self.p1, &self.p2, &self.p3]
    }

    /// The model's best guess.
    #[must_use]
    pub fn top(&self) -> &PredictionEntry {
        &self.p1
    }
}

/// Holds the latest prediction for display. Pure storage: `set` replaces
/// wholesale, `latest` is `None` until the first result arrives.
#[derive(Debug, Default)]
pub struct PredictionSink {
    latest: Option<Prediction>,
}

impl PredictionSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held prediction. No merging, last write wins.
    pub fn set(&mut self, prediction: Prediction) {
        self.latest = Some(prediction);
    }

    /// The most recent prediction, or `None` before the first result.
    #[must_use]
    pub fn latest(&self) -> Option<&Prediction> {
        self.latest.as_ref()
    }
}
