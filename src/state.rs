//! Simulation state store
//!
//! Holds the nodes, the last pointer position and the surface size. It has
//! no behavior of its own beyond seeding; the frame driver mutates it.

use rand::Rng;

use crate::node::{Node, Pointer, SurfaceSize};

/// Seed `count` nodes uniformly over `[0, width] x [0, height]` with
/// velocities uniform in `[-speed, speed)` per axis
pub fn init_nodes<R: Rng>(
    rng: &mut R,
    count: usize,
    size: SurfaceSize,
    speed: f64,
) -> Vec<Node> {
    let width = size.width.max(0.0);
    let height = size.height.max(0.0);

    (0..count)
        .map(|_| Node {
            x: rng.random::<f64>() * width,
            y: rng.random::<f64>() * height,
            vx: (rng.random::<f64>() - 0.5) * 2.0 * speed,
            vy: (rng.random::<f64>() - 0.5) * 2.0 * speed,
        })
        .collect()
}

/// Nodes, pointer and surface for one engine instance
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    pub nodes: Vec<Node>,
    pub pointer: Pointer,
    pub surface: SurfaceSize,
}

impl FieldState {
    /// Empty state for a surface; nodes are seeded separately
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            nodes: Vec::new(),
            pointer: Pointer::default(),
            surface,
        }
    }

    /// State with an explicit node set, for replaying or testing a scene
    pub fn with_nodes(surface: SurfaceSize, nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            pointer: Pointer::default(),
            surface,
        }
    }

    /// Replace all nodes with a fresh random set at the current size
    pub fn reseed<R: Rng>(&mut self, rng: &mut R, count: usize, speed: f64) {
        self.nodes = init_nodes(rng, count, self.surface, speed);
    }

    /// Record new surface dimensions; nodes are left where they are
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.surface = SurfaceSize::new(width, height);
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Pointer::new(x, y);
    }

    /// Whether every node lies inside the current surface
    pub fn all_in_bounds(&self) -> bool {
        self.nodes.iter().all(|n| self.surface.contains(n.x, n.y))
    }

    /// Sum of node speeds
    pub fn total_speed(&self) -> f64 {
        self.nodes.iter().map(Node::speed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeds_requested_count_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let nodes = init_nodes(&mut rng, 60, SurfaceSize::new(800.0, 600.0), 0.25);

        assert_eq!(nodes.len(), 60);
        for node in &nodes {
            assert!((0.0..=800.0).contains(&node.x));
            assert!((0.0..=600.0).contains(&node.y));
            assert!((-0.25..=0.25).contains(&node.vx));
            assert!((-0.25..=0.25).contains(&node.vy));
        }
    }

    #[test]
    fn same_seed_same_nodes() {
        let size = SurfaceSize::new(640.0, 480.0);
        let a = init_nodes(&mut StdRng::seed_from_u64(42), 10, size, 0.25);
        let b = init_nodes(&mut StdRng::seed_from_u64(42), 10, size, 0.25);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_sized_surface_seeds_at_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        let nodes = init_nodes(&mut rng, 5, SurfaceSize::new(0.0, 0.0), 0.25);
        assert!(nodes.iter().all(|n| n.x == 0.0 && n.y == 0.0));
    }

    #[test]
    fn resize_does_not_move_nodes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = FieldState::new(SurfaceSize::new(800.0, 600.0));
        state.reseed(&mut rng, 20, 0.25);
        let before = state.nodes.clone();

        state.set_surface_size(200.0, 100.0);

        assert_eq!(state.nodes, before);
        assert_eq!(state.surface, SurfaceSize::new(200.0, 100.0));
    }

    #[test]
    fn pointer_defaults_to_origin_and_overwrites() {
        let mut state = FieldState::new(SurfaceSize::new(10.0, 10.0));
        assert_eq!(state.pointer, Pointer::new(0.0, 0.0));

        state.set_pointer(3.0, 4.0);
        state.set_pointer(5.0, 6.0);
        assert_eq!(state.pointer, Pointer::new(5.0, 6.0));
    }
}
