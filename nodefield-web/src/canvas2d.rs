//! 2D canvas backend
//!
//! Implements the engine's [`Canvas2D`] drawing interface on a browser
//! `CanvasRenderingContext2d`.

use nodefield::{Canvas2D, Rgba};
use web_sys::CanvasRenderingContext2d;

/// Drawing context of an HTML canvas
pub struct WebCanvas {
    ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Canvas2D for WebCanvas {
    fn set_fill_color(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_string());
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.to_string());
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_shadow_color(&mut self, color: Rgba) {
        self.ctx.set_shadow_color(&color.to_string());
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.ctx.set_shadow_blur(blur);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.ctx.begin_path();
        // Only fails for a negative radius, which config validation rules out
        if self
            .ctx
            .arc(cx, cy, radius, 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(x1, y1);
        self.ctx.line_to(x2, y2);
        self.ctx.stroke();
    }
}
