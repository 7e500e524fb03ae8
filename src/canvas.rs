//! Drawing surface abstraction
//!
//! [`Canvas2D`] is the subset of an HTML canvas 2D context the field
//! renderer needs. The browser host implements it over
//! `CanvasRenderingContext2d`; [`crate::recording::RecordingCanvas`]
//! implements it headless.
//!
//! Shadow state is shared context state that outlives a single draw call,
//! so the renderer only touches it through [`Glow`], which restores a zero
//! blur when dropped.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha, clamped into `[0, 1]`
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Formats as a CSS color string, e.g. `rgba(34, 211, 238, 0.8)`
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// 2D drawing context used by the renderer
pub trait Canvas2D {
    fn set_fill_color(&mut self, color: Rgba);

    fn set_stroke_color(&mut self, color: Rgba);

    fn set_line_width(&mut self, width: f64);

    fn set_shadow_color(&mut self, color: Rgba);

    /// Shadow blur radius; `0.0` disables the shadow
    fn set_shadow_blur(&mut self, blur: f64);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Fill a full circle using the current fill color
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64);

    /// Stroke a straight segment using the current stroke color and width
    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
}

/// Scoped shadow glow on a canvas
///
/// Sets the shadow color and blur on creation and resets the blur to zero
/// when dropped. Derefs to the wrapped canvas so draws happen through it.
pub struct Glow<'a, C: Canvas2D + ?Sized> {
    ctx: &'a mut C,
}

impl<'a, C: Canvas2D + ?Sized> Glow<'a, C> {
    pub fn begin(ctx: &'a mut C, color: Rgba, blur: f64) -> Self {
        ctx.set_shadow_color(color);
        ctx.set_shadow_blur(blur);
        Self { ctx }
    }
}

impl<C: Canvas2D + ?Sized> Deref for Glow<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.ctx
    }
}

impl<C: Canvas2D + ?Sized> DerefMut for Glow<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.ctx
    }
}

impl<C: Canvas2D + ?Sized> Drop for Glow<'_, C> {
    fn drop(&mut self) {
        self.ctx.set_shadow_blur(0.0);
    }
}
