//! Per-frame node physics and link geometry
//!
//! A node step is explicit Euler with one frame as the time unit, followed
//! by edge reflection, clamping and a constant-magnitude push away from the
//! pointer. Links are pure geometry: every pair closer than the link radius
//! is joined, with alpha and width fading linearly with distance.

use crate::config::{LinkConfig, RepulsionConfig};
use crate::node::{Node, Pointer, SurfaceSize};

/// Advance one node by one frame
///
/// Reflection tests the pre-clamp position, so a node that lands exactly on
/// or beyond an edge reverses that axis. Repulsion is skipped when the node
/// sits exactly on the pointer.
pub fn step_node(node: &mut Node, surface: SurfaceSize, pointer: Pointer, repulsion: &RepulsionConfig) {
    let width = surface.width.max(0.0);
    let height = surface.height.max(0.0);

    node.x += node.vx;
    node.y += node.vy;

    if node.x < 0.0 || node.x > width {
        node.vx = -node.vx;
    }
    if node.y < 0.0 || node.y > height {
        node.vy = -node.vy;
    }

    node.x = node.x.clamp(0.0, width);
    node.y = node.y.clamp(0.0, height);

    let dx = node.x - pointer.x;
    let dy = node.y - pointer.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > 0.0 && dist < repulsion.radius {
        node.vx += dx / dist * repulsion.strength;
        node.vy += dy / dist * repulsion.strength;
    }
}

/// Styling of one drawn link
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub distance: f64,
    pub alpha: f64,
    pub width: f64,
}

/// The link between two nodes, if they are within the link radius
pub fn link_between(a: &Node, b: &Node, links: &LinkConfig) -> Option<Link> {
    let distance = a.distance_to(b);
    if distance >= links.radius {
        return None;
    }

    let closeness = 1.0 - distance / links.radius;
    Some(Link {
        distance,
        alpha: links.max_alpha * closeness,
        width: links.min_width + closeness * links.width_gain,
    })
}

/// Visit every unordered pair `i < j` that is linked
///
/// Returns the number of pairs checked, `n * (n - 1) / 2`.
pub fn for_each_link<F>(nodes: &[Node], links: &LinkConfig, mut f: F) -> usize
where
    F: FnMut(&Node, &Node, Link),
{
    let mut checked = 0;
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            checked += 1;
            if let Some(link) = link_between(a, b, links) {
                f(a, b, link);
            }
        }
    }
    checked
}
