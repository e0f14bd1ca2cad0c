//! Stroke capture: pointer events in, ink on the surface out.
//!
//! Owns the drawing surface and the "is a stroke active" flag. All
//! rendering is destructive and cumulative; there is no per-stroke vector
//! history to undo.

use serde::{Deserialize, Serialize};

use crate::surface::{Brush, DrawingSurface};

/// Whether a stroke is currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeState {
    /// No stroke in progress; move events are ignored.
    Idle,
    /// Pointer is down and ink is flowing.
    Active,
}

/// A pointer event from the presentation layer.
///
/// Coordinates are in surface pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Pointer pressed: a new stroke begins here.
    Down {
        /// X position on the surface.
        x: f32,
        /// Y position on the surface.
        y: f32,
    },
    /// Pointer moved: extend the active stroke, if any.
    Move {
        /// X position on the surface.
        x: f32,
        /// Y position on the surface.
        y: f32,
    },
    /// Pointer released: the stroke ends.
    Up,
    /// Pointer left the surface: the stroke ends.
    Leave,
}

/// Tracks pointer state and renders ink onto its surface.
#[derive(Debug)]
pub struct StrokeCapture {
    surface: DrawingSurface,
    state: StrokeState,
    /// Tail of the active ink path; `None` between strokes.
    last_point: Option<(f32, f32)>,
    brush: Brush,
}

impl StrokeCapture {
    /// Create a capture over a fresh blank surface with the default brush.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: DrawingSurface::new(),
            state: StrokeState::Idle,
            last_point: None,
            brush: Brush::default(),
        }
    }

    /// Process one pointer event.
    pub fn pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => {
                self.state = StrokeState::Active;
                self.last_point = Some((x, y));
            }
            PointerEvent::Move { x, y } => {
                if self.state != StrokeState::Active {
                    // Spurious move before any down; not an error.
                    tracing::trace!(x = f64::from(x), y = f64::from(y), "Ignoring move while idle");
                    return;
                }
                if let Some(from) = self.last_point {
                    self.surface.draw_segment(from, (x, y), &self.brush);
                }
                self.last_point = Some((x, y));
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.state = StrokeState::Idle;
                self.last_point = None;
            }
        }
    }

    /// Wipe the surface to the background color.
    ///
    /// Stroke state is untouched: a stroke in progress continues onto the
    /// cleared surface.
    pub fn clear(&mut self) {
        self.surface.clear();
        tracing::debug!("Surface cleared");
    }

    /// Current stroke state.
    #[must_use]
    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Whether a stroke is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == StrokeState::Active
    }

    /// The drawing surface, for the extractor to read.
    #[must_use]
    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }
}

impl Default for StrokeCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::surface::SURFACE_SIZE;

    fn inked_pixels(capture: &StrokeCapture) -> usize {
        (0..SURFACE_SIZE)
            .flat_map(|y| (0..SURFACE_SIZE).map(move |x| (x, y)))
            .filter(|&(x, y)| capture.surface().pixel(x, y)[0] > 0)
            .count()
    }

    #[test]
    fn test_starts_idle() {
        let capture = StrokeCapture::new();
        assert_eq!(capture.state(), StrokeState::Idle);
        assert!(!capture.is_active());
    }

    #[test]
    fn test_down_activates_up_deactivates() {
        let mut capture = StrokeCapture::new();
        capture.pointer(PointerEvent::Down { x: 50.0, y: 50.0 });
        assert!(capture.is_active());

        capture.pointer(PointerEvent::Up);
        assert!(!capture.is_active());
    }

    #[test]
    fn test_leave_ends_stroke() {
        let mut capture = StrokeCapture::new();
        capture.pointer(PointerEvent::Down { x: 50.0, y: 50.0 });
        capture.pointer(PointerEvent::Leave);
        assert!(!capture.is_active());

        // A move after leave must not draw.
        capture.pointer(PointerEvent::Move { x: 100.0, y: 100.0 });
        assert_eq!(inked_pixels(&capture), 0);
    }

    #[test]
    fn test_stale_move_is_noop() {
        let mut capture = StrokeCapture::new();
        capture.pointer(PointerEvent::Move { x: 100.0, y: 100.0 });
        assert!(!capture.is_active());
        assert_eq!(inked_pixels(&capture), 0);
    }

    #[test]
    fn test_down_alone_lays_no_ink() {
        let mut capture = StrokeCapture::new();
        capture.pointer(PointerEvent::Down { x: 140.0, y: 140.0 });
        assert_eq!(inked_pixels(&capture), 0);
    }

    #[test]
    fn test_move_while_active_draws() {
        let mut capture = StrokeCapture::new();
        capture.pointer(PointerEvent::Down { x: 50.0, y: 140.0 });
        capture.pointer(PointerEvent::Move { x: 230.0, y: 140.0 });
        assert!(inked_pixels(&capture) > 0);
    }

    #[test]
    fn test_clear_keeps_stroke_state() {
        let mut capture = StrokeCapture::new();
        capture.pointer(PointerEvent::Down { x: 50.0, y: 50.0 });
        capture.pointer(PointerEvent::Move { x: 100.0, y: 100.0 });

        capture.clear();
        assert!(capture.is_active());
        assert_eq!(inked_pixels(&capture), 0);

        // The live stroke keeps drawing onto the cleared surface.
        capture.pointer(PointerEvent::Move { x: 150.0, y: 150.0 });
        assert!(inked_pixels(&capture) > 0);
    }

    fn arb_event() -> impl Strategy<Value = PointerEvent> {
        prop_oneof![
            (0f32..280.0, 0f32..280.0).prop_map(|(x, y)| PointerEvent::Down { x, y }),
            (0f32..280.0, 0f32..280.0).prop_map(|(x, y)| PointerEvent::Move { x, y }),
            Just(PointerEvent::Up),
            Just(PointerEvent::Leave),
        ]
    }

    proptest! {
        /// After any event sequence, the state is Active iff the last
        /// state-changing event was a down not yet followed by up/leave.
        #[test]
        fn test_state_follows_last_transition(events in prop::collection::vec(arb_event(), 0..64)) {
            let mut capture = StrokeCapture::new();
            for event in &events {
                capture.pointer(*event);
            }

            let expected = events
                .iter()
                .rev()
                .find_map(|e| match e {
                    PointerEvent::Down { .. } => Some(StrokeState::Active),
                    PointerEvent::Up | PointerEvent::Leave => Some(StrokeState::Idle),
                    PointerEvent::Move { .. } => None,
                })
                .unwrap_or(StrokeState::Idle);

            prop_assert_eq!(capture.state(), expected);
        }
    }
}
