//! Editor configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock 900×1200 editor.

use crate::color::Color;
use crate::model::DashPattern;
use crate::presets;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid editor config: {0}")]
    Invalid(&'static str),
}

// ─── Style defaults ──────────────────────────────────────────────────────

/// Style values applied to newly created objects and reported by the
/// style getters while nothing is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleDefaults {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub stroke_dash_array: DashPattern,
    pub font_family: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            fill_color: presets::FILL_COLOR,
            stroke_color: presets::STROKE_COLOR,
            stroke_width: presets::STROKE_WIDTH,
            stroke_dash_array: DashPattern::new(),
            font_family: presets::FONT_FAMILY.into(),
        }
    }
}

// ─── Workspace / zoom ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    pub width: f64,
    pub height: f64,
    pub fill: Color,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 1200.0,
            fill: Color::WHITE,
        }
    }
}

impl WorkspaceConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoomConfig {
    /// Fraction of the container the fitted workspace may occupy.
    pub fit_margin: f64,
    /// Zoom-in / zoom-out increment.
    pub step: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            fit_margin: 0.85,
            step: 0.05,
            min: 0.2,
            max: 1.0,
        }
    }
}

impl ZoomConfig {
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

// ─── Editor ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub workspace: WorkspaceConfig,
    pub zoom: ZoomConfig,
    /// Distance pasted copies are shifted right and down from the copy.
    pub paste_offset: f64,
    pub defaults: StyleDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig::default(),
            zoom: ZoomConfig::default(),
            paste_offset: 10.0,
            defaults: StyleDefaults::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace.width <= 0.0 || self.workspace.height <= 0.0 {
            return Err(ConfigError::Invalid("workspace size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.zoom.fit_margin) || self.zoom.fit_margin == 0.0 {
            return Err(ConfigError::Invalid("fit margin must be in (0, 1]"));
        }
        if self.zoom.min <= 0.0 || self.zoom.min > self.zoom.max {
            return Err(ConfigError::Invalid("zoom range is empty"));
        }
        Ok(())
    }
}
