//! nodefield - a pointer-reactive particle field for 2D canvases.
//!
//! Nodes drift across a surface, bounce off its edges, get pushed away from
//! the pointer and are joined by fading links when close. The crate is
//! host-agnostic: [`Engine`] drives the field through the [`Host`] trait,
//! and [`FrameDriver`] can be ticked directly against any [`Canvas2D`]
//! (see [`RecordingCanvas`] for headless runs and [`trace`] for golden
//! traces).

pub mod canvas;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod node;
pub mod physics;
pub mod recording;
pub mod render;
pub mod state;
pub mod trace;

pub use canvas::{Canvas2D, Glow, Rgba};
pub use config::{FieldConfig, LinkConfig, Palette, RepulsionConfig};
pub use driver::{FrameDriver, FrameStats};
pub use engine::{Engine, Phase};
pub use error::{ConfigError, FieldError, FieldResult, HostError, TraceError};
pub use events::{EventKind, EventSender, FieldEvent};
pub use host::Host;
pub use node::{Node, Pointer, SurfaceSize};
pub use recording::{DrawCommand, RecordingCanvas};
pub use state::FieldState;
pub use trace::{Divergence, RunSpec, Trace};
