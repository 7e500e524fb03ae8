//! Frame driver: one tick of the field
//!
//! A tick drains pending host events, paints the trail, steps and draws each
//! node in order, then draws every link. Scheduling the next tick belongs
//! to [`crate::engine::Engine`]; the driver itself is host-agnostic and can
//! be ticked directly against any [`Canvas2D`].

use rand::Rng;

use crate::canvas::Canvas2D;
use crate::config::FieldConfig;
use crate::events::{EventInbox, EventSender};
use crate::node::SurfaceSize;
use crate::physics::{for_each_link, step_node};
use crate::render::{draw_link, draw_node, draw_trail};
use crate::state::FieldState;

/// What a single tick drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes_drawn: usize,
    pub links_drawn: usize,
    pub pairs_checked: usize,
}

/// Owns the simulation state and advances it one frame at a time
#[derive(Debug)]
pub struct FrameDriver {
    state: FieldState,
    config: FieldConfig,
    inbox: EventInbox,
    frames: u64,
}

impl FrameDriver {
    /// Driver over an existing state (nodes already placed)
    pub fn from_state(config: FieldConfig, state: FieldState) -> Self {
        Self {
            state,
            config,
            inbox: EventInbox::new(),
            frames: 0,
        }
    }

    /// Driver with `config.node_count` random nodes on `surface`
    pub fn seeded<R: Rng>(config: FieldConfig, surface: SurfaceSize, rng: &mut R) -> Self {
        let mut state = FieldState::new(surface);
        state.reseed(rng, config.node_count, config.initial_speed);
        Self::from_state(config, state)
    }

    /// A producer handle for host listeners
    pub fn sender(&self) -> EventSender {
        self.inbox.sender()
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Number of ticks run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fold pending resize and pointer events into the state
    pub fn apply_events(&mut self) {
        let pending = self.inbox.drain();
        if let Some(size) = pending.resize {
            tracing::debug!(width = size.width, height = size.height, "surface resized");
            self.state.set_surface_size(size.width, size.height);
        }
        if let Some(pointer) = pending.pointer {
            self.state.set_pointer(pointer.x, pointer.y);
        }
    }

    /// Run one frame against `ctx`; `now_ms` drives the node shimmer
    pub fn tick<C: Canvas2D + ?Sized>(&mut self, ctx: &mut C, now_ms: f64) -> FrameStats {
        self.apply_events();

        let config = &self.config;
        let surface = self.state.surface;
        let pointer = self.state.pointer;

        draw_trail(ctx, surface, config);

        for node in &mut self.state.nodes {
            step_node(node, surface, pointer, &config.repulsion);
            draw_node(ctx, node, config, now_ms);
        }

        let mut links_drawn = 0;
        let pairs_checked = for_each_link(&self.state.nodes, &config.links, |a, b, link| {
            draw_link(ctx, a, b, link, config);
            links_drawn += 1;
        });

        self.frames += 1;
        FrameStats {
            nodes_drawn: self.state.nodes.len(),
            links_drawn,
            pairs_checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FieldEvent;
    use crate::node::{Node, Pointer};
    use crate::recording::{DrawCommand, RecordingCanvas};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_node_driver() -> FrameDriver {
        let state = FieldState::with_nodes(
            SurfaceSize::new(800.0, 600.0),
            vec![
                Node::new(100.0, 100.0, 1.0, 0.0),
                Node::new(200.0, 100.0, -1.0, 0.0),
            ],
        );
        FrameDriver::from_state(FieldConfig::default(), state)
    }

    #[test]
    fn one_frame_draw_sequence() {
        let mut driver = two_node_driver();
        let mut canvas = RecordingCanvas::new();
        let stats = driver.tick(&mut canvas, 0.0);

        assert_eq!(
            stats,
            FrameStats {
                nodes_drawn: 2,
                links_drawn: 1,
                pairs_checked: 1,
            }
        );
        insta::assert_snapshot!(canvas.to_log(), @r"
        fill_color rgba(2, 6, 23, 0.150)
        fill_rect 0 0 800 600
        fill_color rgba(34, 211, 238, 0.992)
        fill_circle 101.000 100.000 r=4 blur=0
        shadow_color rgba(34, 211, 238, 0.800)
        shadow_blur 12
        fill_color rgba(56, 189, 248, 0.852)
        fill_circle 101.000 100.000 r=4 blur=12
        shadow_blur 0
        fill_color rgba(34, 211, 238, 0.996)
        fill_circle 199.000 100.000 r=4 blur=0
        shadow_color rgba(34, 211, 238, 0.800)
        shadow_blur 12
        fill_color rgba(56, 189, 248, 0.852)
        fill_circle 199.000 100.000 r=4 blur=12
        shadow_blur 0
        stroke_color rgba(56, 189, 248, 0.255)
        line_width 1.908
        stroke_line 101.000 100.000 -> 199.000 100.000 w=1.908 blur=0
        shadow_color rgba(56, 189, 248, 0.400)
        shadow_blur 4
        stroke_line 101.000 100.000 -> 199.000 100.000 w=1.908 blur=4
        shadow_blur 0
        ");
    }

    #[test]
    fn link_alpha_independent_of_node_order() {
        let a = Node::new(100.0, 300.0, 0.0, 0.0);
        let b = Node::new(250.0, 300.0, 0.0, 0.0);
        let surface = SurfaceSize::new(800.0, 600.0);

        let alpha_for = |nodes: Vec<Node>| {
            let mut driver =
                FrameDriver::from_state(FieldConfig::default(), FieldState::with_nodes(surface, nodes));
            driver.state_mut().set_pointer(-1000.0, -1000.0);
            let mut canvas = RecordingCanvas::new();
            driver.tick(&mut canvas, 0.0);
            let alpha = match canvas.plain_lines().next() {
                Some(DrawCommand::StrokeLine { stroke, .. }) => stroke.a,
                other => panic!("Expected a link, got {:?}", other),
            };
            alpha
        };

        let forward = alpha_for(vec![a, b]);
        let backward = alpha_for(vec![b, a]);
        assert_eq!(forward, backward);
        assert!((forward - 0.5 * (1.0 - 150.0 / 200.0)).abs() < 1e-12);
    }

    #[test]
    fn no_links_beyond_radius() {
        let state = FieldState::with_nodes(
            SurfaceSize::new(800.0, 600.0),
            vec![
                Node::new(0.0, 300.0, 0.0, 0.0),
                Node::new(200.0, 300.0, 0.0, 0.0),
                Node::new(400.0, 300.0, 0.0, 0.0),
                Node::new(700.0, 300.0, 0.0, 0.0),
            ],
        );
        let mut driver = FrameDriver::from_state(FieldConfig::default(), state);
        driver.state_mut().set_pointer(400.0, -10_000.0);
        let mut canvas = RecordingCanvas::new();
        let stats = driver.tick(&mut canvas, 0.0);

        assert_eq!(stats.pairs_checked, 6);
        assert_eq!(stats.links_drawn, 0);
        assert_eq!(canvas.lines().count(), 0);
    }

    #[test]
    fn trail_uses_size_from_latest_resize() {
        let mut driver = two_node_driver();
        let sender = driver.sender();
        sender.send(FieldEvent::Resize(SurfaceSize::new(300.0, 200.0)));
        sender.send(FieldEvent::Resize(SurfaceSize::new(150.0, 90.0)));

        let mut canvas = RecordingCanvas::new();
        driver.tick(&mut canvas, 0.0);

        assert!(matches!(
            canvas.commands()[1],
            DrawCommand::FillRect { width, height, .. } if width == 150.0 && height == 90.0
        ));
        // Nodes are clamped into the shrunk surface instead of rescaled
        assert!(driver.state().all_in_bounds());
        assert_eq!(driver.state().nodes[1].x, 150.0);
    }

    #[test]
    fn pointer_events_feed_repulsion() {
        let state = FieldState::with_nodes(
            SurfaceSize::new(800.0, 600.0),
            vec![Node::new(400.0, 300.0, 0.0, 0.0)],
        );
        let mut driver = FrameDriver::from_state(FieldConfig::default(), state);
        driver
            .sender()
            .send(FieldEvent::PointerMove(Pointer::new(350.0, 300.0)));

        driver.tick(&mut RecordingCanvas::new(), 0.0);

        assert_eq!(driver.state().pointer, Pointer::new(350.0, 300.0));
        assert_eq!(driver.state().nodes[0].vx, 0.25);
    }

    #[test]
    fn empty_field_only_paints_trail() {
        let mut driver = FrameDriver::from_state(
            FieldConfig::default(),
            FieldState::new(SurfaceSize::new(10.0, 10.0)),
        );
        let mut canvas = RecordingCanvas::new();
        let stats = driver.tick(&mut canvas, 0.0);

        assert_eq!(stats, FrameStats::default());
        assert_eq!(canvas.commands().len(), 2);
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn nodes_stay_in_bounds_across_frames() {
        let mut rng = StdRng::seed_from_u64(99);
        let config = FieldConfig {
            initial_speed: 25.0,
            ..FieldConfig::default()
        };
        let mut driver = FrameDriver::seeded(config, SurfaceSize::new(320.0, 240.0), &mut rng);
        let mut canvas = RecordingCanvas::new();

        for frame in 0..500 {
            if frame % 50 == 0 {
                let x = rng.random::<f64>() * 320.0;
                let y = rng.random::<f64>() * 240.0;
                driver.sender().send(FieldEvent::PointerMove(Pointer::new(x, y)));
            }
            canvas.clear();
            driver.tick(&mut canvas, frame as f64 * 16.0);
            assert!(driver.state().all_in_bounds(), "escaped on frame {frame}");
        }
    }
}
