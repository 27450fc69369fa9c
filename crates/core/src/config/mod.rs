use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{mapping::Palette, registry::ReleasePolicy, Result, VisualiserError};

/// Top-level configuration structure for the application.
///
/// The defaults are the values the visualiser was designed around; a JSON
/// file only needs to name the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualiserConfig {
    pub canvas: CanvasConfig,
    pub frame_rate: u32,
    /// Number of trailing steps a note stays tracked. Equal to the canvas
    /// width so a note is dropped as it scrolls off the left edge.
    pub window: u64,
    pub device: PathBuf,
    pub release_policy: ReleasePolicy,
    pub palette: Palette,
    pub decoration: DecorationConfig,
}

impl Default for VisualiserConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            frame_rate: 30,
            window: 640,
            device: PathBuf::from("/dev/midi2"),
            release_policy: ReleasePolicy::Oldest,
            palette: Palette::default(),
            decoration: DecorationConfig::default(),
        }
    }
}

impl VisualiserConfig {
    /// Loads a configuration file and validates it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(VisualiserError::msg("canvas dimensions must be non-zero"));
        }
        if self.frame_rate == 0 {
            return Err(VisualiserError::msg("frame rate must be non-zero"));
        }
        if self.window == 0 {
            return Err(VisualiserError::msg("pruning window must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Growth parameters for the per-note decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    pub ring_start: u32,
    pub ring_step: u32,
    pub scatter_ring_start: u32,
    pub scatter_ring_step: u32,
    pub scatter_mark_start: u32,
    pub scatter_mark_step: u32,
    pub scatter_mark_size: u32,
    /// Rings thinner than this radius are drawn one pixel wide, larger ones
    /// with this thickness.
    pub thickness_threshold: u32,
    pub point_size: u32,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            ring_start: 2,
            ring_step: 5,
            scatter_ring_start: 2,
            scatter_ring_step: 1,
            scatter_mark_start: 2,
            scatter_mark_step: 10,
            scatter_mark_size: 15,
            thickness_threshold: 10,
            point_size: 2,
        }
    }
}
