//! Drawing of trails, nodes and links
//!
//! Node alphas shimmer with wall-clock time. The shimmer is cosmetic and
//! never feeds back into simulation state.

use crate::canvas::{Canvas2D, Glow};
use crate::config::FieldConfig;
use crate::node::{Node, SurfaceSize};
use crate::physics::Link;

/// Core shimmer: radians per millisecond
pub const CORE_SHIMMER_RATE: f64 = 0.008;
/// Core shimmer: phase offset per pixel of x
pub const CORE_SHIMMER_SPREAD: f64 = 0.01;
/// Core shimmer: alpha amplitude
pub const CORE_SHIMMER_DEPTH: f64 = 0.05;

/// Glow shimmer: radians per millisecond
pub const GLOW_SHIMMER_RATE: f64 = 0.01;
/// Glow shimmer: phase offset per pixel of y
pub const GLOW_SHIMMER_SPREAD: f64 = 0.01;
/// Glow shimmer: alpha amplitude
pub const GLOW_SHIMMER_DEPTH: f64 = 0.3;

/// Alpha of the core pass for a node at `x`
pub fn core_alpha(base: f64, now_ms: f64, x: f64) -> f64 {
    base + (now_ms * CORE_SHIMMER_RATE + x * CORE_SHIMMER_SPREAD).sin() * CORE_SHIMMER_DEPTH
}

/// Alpha of the glow pass for a node at `y`
pub fn glow_alpha(base: f64, now_ms: f64, y: f64) -> f64 {
    base + (now_ms * GLOW_SHIMMER_RATE + y * GLOW_SHIMMER_SPREAD).sin() * GLOW_SHIMMER_DEPTH
}

/// Cover the whole surface with the translucent trail color
pub fn draw_trail<C: Canvas2D + ?Sized>(ctx: &mut C, surface: SurfaceSize, config: &FieldConfig) {
    ctx.set_fill_color(config.palette.trail);
    ctx.fill_rect(0.0, 0.0, surface.width, surface.height);
}

/// Draw a node: an opaque core, then a blurred glow over it
pub fn draw_node<C: Canvas2D + ?Sized>(ctx: &mut C, node: &Node, config: &FieldConfig, now_ms: f64) {
    let palette = &config.palette;

    let core = palette
        .node_core
        .with_alpha(core_alpha(palette.node_core.a, now_ms, node.x));
    ctx.set_fill_color(core);
    ctx.fill_circle(node.x, node.y, config.node_radius);

    let mut glow = Glow::begin(ctx, palette.node_shadow, config.node_glow_blur);
    let fill = palette
        .node_glow
        .with_alpha(glow_alpha(palette.node_glow.a, now_ms, node.y));
    glow.set_fill_color(fill);
    glow.fill_circle(node.x, node.y, config.node_radius);
}

/// Stroke a link, then stroke it again with a glow
pub fn draw_link<C: Canvas2D + ?Sized>(
    ctx: &mut C,
    a: &Node,
    b: &Node,
    link: Link,
    config: &FieldConfig,
) {
    let palette = &config.palette;

    ctx.set_stroke_color(palette.link.with_alpha(link.alpha));
    ctx.set_line_width(link.width);
    ctx.stroke_line(a.x, a.y, b.x, b.y);

    let mut glow = Glow::begin(ctx, palette.link_shadow, config.links.glow_blur);
    glow.stroke_line(a.x, a.y, b.x, b.y);
}
