//! Headless canvas that records draw calls
//!
//! Used by the CLI to run the field without a browser and by tests to
//! assert on what a frame drew. Draw commands capture the style that was
//! in effect when they were issued.

use std::fmt;

use crate::canvas::{Canvas2D, Rgba};

/// A single recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillColor(Rgba),
    StrokeColor(Rgba),
    LineWidth(f64),
    ShadowColor(Rgba),
    ShadowBlur(f64),
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgba,
    },
    FillCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: Rgba,
        blur: f64,
    },
    StrokeLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Rgba,
        width: f64,
        blur: f64,
    },
}

/// CSS color with alpha rounded to three places, for stable logs
struct Rounded(Rgba);

impl fmt::Display for Rounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgba { r, g, b, a } = self.0;
        write!(f, "rgba({r}, {g}, {b}, {a:.3})")
    }
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::FillColor(c) => write!(f, "fill_color {}", Rounded(*c)),
            DrawCommand::StrokeColor(c) => write!(f, "stroke_color {}", Rounded(*c)),
            DrawCommand::LineWidth(w) => write!(f, "line_width {w:.3}"),
            DrawCommand::ShadowColor(c) => write!(f, "shadow_color {}", Rounded(*c)),
            DrawCommand::ShadowBlur(b) => write!(f, "shadow_blur {b}"),
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                ..
            } => write!(f, "fill_rect {x} {y} {width} {height}"),
            DrawCommand::FillCircle {
                cx, cy, radius, blur, ..
            } => write!(f, "fill_circle {cx:.3} {cy:.3} r={radius} blur={blur}"),
            DrawCommand::StrokeLine {
                x1,
                y1,
                x2,
                y2,
                width,
                blur,
                ..
            } => write!(
                f,
                "stroke_line {x1:.3} {y1:.3} -> {x2:.3} {y2:.3} w={width:.3} blur={blur}"
            ),
        }
    }
}

/// A [`Canvas2D`] that keeps every call in memory
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    fill: Rgba,
    stroke: Rgba,
    line_width: f64,
    shadow_blur: f64,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    /// Create an empty recorder with canvas default styles
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            fill: Rgba::new(0, 0, 0, 1.0),
            stroke: Rgba::new(0, 0, 0, 1.0),
            line_width: 1.0,
            shadow_blur: 0.0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping current style state
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn shadow_blur(&self) -> f64 {
        self.shadow_blur
    }

    /// Every recorded circle fill
    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
    }

    /// Every recorded line stroke
    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
    }

    /// Line strokes issued without a shadow (one per drawn link)
    pub fn plain_lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.lines()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { blur, .. } if *blur == 0.0))
    }

    /// Recorded commands, one per line
    pub fn to_log(&self) -> String {
        self.commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Canvas2D for RecordingCanvas {
    fn set_fill_color(&mut self, color: Rgba) {
        self.fill = color;
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.stroke = color;
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_shadow_color(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::ShadowColor(color));
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        self.shadow_blur = blur;
        self.commands.push(DrawCommand::ShadowBlur(blur));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            fill: self.fill,
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.commands.push(DrawCommand::FillCircle {
            cx,
            cy,
            radius,
            fill: self.fill,
            blur: self.shadow_blur,
        });
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.commands.push(DrawCommand::StrokeLine {
            x1,
            y1,
            x2,
            y2,
            stroke: self.stroke,
            width: self.line_width,
            blur: self.shadow_blur,
        });
    }
}
