//! Headless runs and position traces
//!
//! A [`RunSpec`] describes a seeded run (surface, frames, optional fixed
//! pointer, config). Recording it ticks a [`FrameDriver`] against a
//! [`RecordingCanvas`] and samples node positions into a [`Trace`]. The
//! physics uses only exact IEEE operations, so the same `RunSpec` always yields
//! the same trace and a saved trace works as a golden reference.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FieldConfig;
use crate::driver::{FrameDriver, FrameStats};
use crate::error::TraceError;
use crate::events::FieldEvent;
use crate::node::{Pointer, SurfaceSize};
use crate::recording::RecordingCanvas;

/// Simulated wall-clock step between headless frames
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// A reproducible headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub seed: u64,
    pub frames: u64,
    /// Sample positions every `every` frames (the last frame is always sampled)
    pub every: u64,
    pub surface: SurfaceSize,
    /// Pointer position held for the whole run; `None` keeps the `(0, 0)` default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<Pointer>,
    #[serde(default)]
    pub config: FieldConfig,
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            frames: 1000,
            every: 100,
            surface: SurfaceSize::new(800.0, 600.0),
            pointer: None,
            config: FieldConfig::default(),
        }
    }
}

impl RunSpec {
    /// Tick a fresh seeded driver `frames` times, calling `on_frame` after each
    pub fn run<F>(&self, mut on_frame: F) -> FrameDriver
    where
        F: FnMut(&FrameDriver, FrameStats),
    {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut driver = FrameDriver::seeded(self.config.clone(), self.surface, &mut rng);
        if let Some(pointer) = self.pointer {
            driver.sender().send(FieldEvent::PointerMove(pointer));
        }

        let mut canvas = RecordingCanvas::new();
        for frame in 0..self.frames {
            canvas.clear();
            let stats = driver.tick(&mut canvas, frame as f64 * FRAME_MS);
            on_frame(&driver, stats);
        }
        driver
    }

    /// Run and sample node positions into a trace
    pub fn record(&self) -> Trace {
        let every = self.every.max(1);
        let mut frames = Vec::new();

        self.run(|driver, stats| {
            let frame = driver.frames();
            if frame % every == 0 || frame == self.frames {
                frames.push(TraceFrame::capture(driver, stats));
            }
        });

        tracing::debug!(samples = frames.len(), seed = self.seed, "trace recorded");
        Trace {
            run: self.clone(),
            frames,
        }
    }
}

/// Node positions after one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    /// 1-based frame number
    pub frame: u64,
    /// Links drawn in this frame
    pub links: usize,
    pub nodes: Vec<[f64; 2]>,
}

impl TraceFrame {
    /// Snapshot the driver right after a tick
    pub fn capture(driver: &FrameDriver, stats: FrameStats) -> Self {
        Self {
            frame: driver.frames(),
            links: stats.links_drawn,
            nodes: driver.state().nodes.iter().map(|n| [n.x, n.y]).collect(),
        }
    }
}

/// A recorded run and its sampled frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub run: RunSpec,
    pub frames: Vec<TraceFrame>,
}

/// First point where two traces disagree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Divergence {
    #[error("expected {expected} sampled frames, got {actual}")]
    FrameCount { expected: usize, actual: usize },

    #[error("sample {index}: expected frame {expected}, got frame {actual}")]
    FrameNumber { index: usize, expected: u64, actual: u64 },

    #[error("frame {frame}: expected {expected} nodes, got {actual}")]
    NodeCount {
        frame: u64,
        expected: usize,
        actual: usize,
    },

    #[error("frame {frame}: expected {expected} links, got {actual}")]
    Links {
        frame: u64,
        expected: usize,
        actual: usize,
    },

    #[error("frame {frame}, node {node}: expected {expected:?}, got {actual:?}")]
    Position {
        frame: u64,
        node: usize,
        expected: [f64; 2],
        actual: [f64; 2],
    },
}

impl Trace {
    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), TraceError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let reader = BufReader::new(File::open(path)?);
        let trace: Self = serde_json::from_reader(reader)?;
        trace.run.config.validate()?;
        Ok(trace)
    }

    /// Re-run the run this trace was recorded from
    pub fn replay(&self) -> Trace {
        self.run.record()
    }

    /// Compare against `actual`; positions may differ by up to `tolerance`
    pub fn compare(&self, actual: &Trace, tolerance: f64) -> Option<Divergence> {
        if self.frames.len() != actual.frames.len() {
            return Some(Divergence::FrameCount {
                expected: self.frames.len(),
                actual: actual.frames.len(),
            });
        }

        for (index, (want, got)) in self.frames.iter().zip(&actual.frames).enumerate() {
            if want.frame != got.frame {
                return Some(Divergence::FrameNumber {
                    index,
                    expected: want.frame,
                    actual: got.frame,
                });
            }
            if want.nodes.len() != got.nodes.len() {
                return Some(Divergence::NodeCount {
                    frame: want.frame,
                    expected: want.nodes.len(),
                    actual: got.nodes.len(),
                });
            }
            if want.links != got.links {
                return Some(Divergence::Links {
                    frame: want.frame,
                    expected: want.links,
                    actual: got.links,
                });
            }
            for (node, (a, b)) in want.nodes.iter().zip(&got.nodes).enumerate() {
                let off = (a[0] - b[0]).abs().max((a[1] - b[1]).abs());
                // `!(off <= tolerance)` also catches NaN
                if !(off <= tolerance) {
                    return Some(Divergence::Position {
                        frame: want.frame,
                        node,
                        expected: *a,
                        actual: *b,
                    });
                }
            }
        }
        None
    }
}
