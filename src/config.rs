//! Field configuration
//!
//! All tunables of the animation live here. The defaults give the
//! stock look: 60 nodes, a 120px pointer repulsion radius and 200px
//! links. Every field carries `#[serde(default)]`, so a YAML or JSON file
//! only has to name the values it overrides:
//!
//! ```yaml
//! node_count: 90
//! repulsion:
//!   radius: 150.0
//! palette:
//!   trail: { r: 0, g: 0, b: 0, a: 0.1 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::Rgba;
use crate::error::ConfigError;

/// Pointer repulsion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepulsionConfig {
    /// Nodes strictly closer than this to the pointer are pushed
    pub radius: f64,
    /// Velocity added per frame along the pointer-to-node direction
    pub strength: f64,
}

impl Default for RepulsionConfig {
    fn default() -> Self {
        Self {
            radius: 120.0,
            strength: 0.25,
        }
    }
}

/// Proximity link parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Node pairs strictly closer than this are joined
    pub radius: f64,
    /// Line alpha at distance zero; falls linearly to 0 at `radius`
    pub max_alpha: f64,
    /// Line width at `radius`
    pub min_width: f64,
    /// Extra width at distance zero
    pub width_gain: f64,
    /// Shadow blur of the second stroke pass
    pub glow_blur: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            radius: 200.0,
            max_alpha: 0.5,
            min_width: 1.5,
            width_gain: 0.8,
            glow_blur: 4.0,
        }
    }
}

/// Colors used by the renderer
///
/// The alphas of `node_core` and `node_glow` are the centers their shimmer
/// oscillates around. The alpha of `link` is replaced by the distance fade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub trail: Rgba,
    pub node_core: Rgba,
    pub node_glow: Rgba,
    pub node_shadow: Rgba,
    pub link: Rgba,
    pub link_shadow: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            trail: Rgba::new(2, 6, 23, 0.15),
            node_core: Rgba::new(34, 211, 238, 0.95),
            node_glow: Rgba::new(56, 189, 248, 0.6),
            node_shadow: Rgba::new(34, 211, 238, 0.8),
            link: Rgba::new(56, 189, 248, 0.5),
            link_shadow: Rgba::new(56, 189, 248, 0.4),
        }
    }
}

/// Configuration for the particle field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of nodes seeded at mount
    pub node_count: usize,
    /// Initial velocity is uniform in `[-initial_speed, initial_speed)` per axis
    pub initial_speed: f64,
    /// Radius of the drawn node circle
    pub node_radius: f64,
    /// Shadow blur of the node glow pass
    pub node_glow_blur: f64,
    pub repulsion: RepulsionConfig,
    pub links: LinkConfig,
    pub palette: Palette,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            node_count: 60,
            initial_speed: 0.25,
            node_radius: 4.0,
            node_glow_blur: 12.0,
            repulsion: RepulsionConfig::default(),
            links: LinkConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl FieldConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        let text = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Check every numeric field is usable by the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("initial_speed", self.initial_speed)?;
        positive("node_radius", self.node_radius)?;
        non_negative("node_glow_blur", self.node_glow_blur)?;
        positive("repulsion.radius", self.repulsion.radius)?;
        non_negative("repulsion.strength", self.repulsion.strength)?;
        positive("links.radius", self.links.radius)?;
        unit_interval("links.max_alpha", self.links.max_alpha)?;
        positive("links.min_width", self.links.min_width)?;
        non_negative("links.width_gain", self.links.width_gain)?;
        non_negative("links.glow_blur", self.links.glow_blur)?;

        let palette = &self.palette;
        for (field, color) in [
            ("palette.trail", palette.trail),
            ("palette.node_core", palette.node_core),
            ("palette.node_glow", palette.node_glow),
            ("palette.node_shadow", palette.node_shadow),
            ("palette.link", palette.link),
            ("palette.link_shadow", palette.link_shadow),
        ] {
            unit_interval(field, color.a)?;
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite non-negative number, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite positive number, got {value}"),
        })
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must lie in [0, 1], got {value}"),
        })
    }
}
