//! The persistent drawing surface.
//!
//! A fixed 280x280 RGBA raster that strokes render onto destructively.
//! There is no vector history: once ink lands on the surface the only way
//! back is [`DrawingSurface::clear`].

use image::{Rgba, RgbaImage};

/// Side length of the square drawing surface in pixels.
pub const SURFACE_SIZE: u32 = 280;

/// Background color: opaque black, matching the zero value MNIST expects
/// for empty space.
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Ink color: opaque white.
const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The fixed round brush used for all stroke rendering.
///
/// Segments are rendered by stamping filled discs along their length,
/// which produces round caps and round joins by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Disc radius in pixels (stroke width is twice this).
    pub radius: f32,
    /// Ink color stamped onto the surface.
    pub ink: Rgba<u8>,
}

impl Default for Brush {
    /// The 20px-wide white brush the digit canvas draws with.
    fn default() -> Self {
        Self {
            radius: 10.0,
            ink: INK,
        }
    }
}

/// A mutable 2D raster of fixed dimensions.
///
/// Single owner is the stroke capture; lifetime is the session. Cleared on
/// explicit command, never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSurface {
    pixels: RgbaImage,
}

impl DrawingSurface {
    /// Create a blank surface filled with the background color.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::from_pixel(SURFACE_SIZE, SURFACE_SIZE, BACKGROUND),
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Read one pixel.
    ///
    /// # Panics
    ///
    /// Panics on out-of-bounds coordinates; in-crate callers cannot
    /// produce them (the extractor iterates the fixed grid and the brush
    /// clamps).
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Wipe the surface back to the background color.
    ///
    /// Does not touch stroke state; a stroke in progress keeps drawing
    /// onto the freshly cleared raster.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = BACKGROUND;
        }
    }

    /// Render one stroke segment from `from` to `to` with the given brush.
    ///
    /// Rendering is cumulative: ink is stamped over whatever is already on
    /// the surface. Coordinates outside the raster are clamped away disc
    /// by disc, so strokes may run off the edge without error.
    pub fn draw_segment(&mut self, from: (f32, f32), to: (f32, f32), brush: &Brush) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let length = (dx * dx + dy * dy).sqrt();

        // One stamp per pixel of travel keeps the line gap-free for any
        // radius >= 1; a zero-length segment still gets its cap.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = length.ceil().max(1.0) as u32;
        #[allow(clippy::cast_precision_loss)]
        let denom = steps as f32;
        for i in 0..=steps {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / denom;
            self.stamp(from.0 + dx * t, from.1 + dy * t, brush);
        }
    }

    /// Stamp one filled disc of ink centered at (`cx`, `cy`).
    fn stamp(&mut self, cx: f32, cy: f32, brush: &Brush) {
        let r = brush.radius;
        let r2 = r * r;

        #[allow(clippy::cast_precision_loss)]
        let size = SURFACE_SIZE as f32;
        if cx + r < 0.0 || cy + r < 0.0 || cx - r >= size || cy - r >= size {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let min_x = (cx - r).floor().max(0.0) as u32;
        #[allow(clippy::cast_possible_truncation)]
        let min_y = (cy - r).floor().max(0.0) as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_x = ((cx + r).ceil() as i64).clamp(0, i64::from(SURFACE_SIZE) - 1) as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_y = ((cy + r).ceil() as i64).clamp(0, i64::from(SURFACE_SIZE) - 1) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                #[allow(clippy::cast_precision_loss)]
                let (fx, fy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if fx * fx + fy * fy <= r2 {
                    self.pixels.put_pixel(x, y, brush.ink);
                }
            }
        }
    }
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}
