//! Brush configuration consumed by the stroke tools.

use serde::{Deserialize, Serialize};

use crate::core::errors::StrokeError;

/// How coverage builds up inside one stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PaintMode {
    /// Repeated coverage keeps adding ink, saturating at full
    #[default]
    Flow,
    /// Repeated coverage never exceeds a single full-strength pass
    Opacity,
}

/// Selects how the UI opacity is turned into an alpha scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolClass {
    /// Nonlinear pen curve driven by `opacity`
    Pen,
    /// Uses `alpha_scale` as given
    #[default]
    Brush,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrushConfig {
    pub paint_mode: PaintMode,
    pub tool_class: ToolClass,
    /// UI opacity (0-255), only read by pen-class tools
    pub opacity: u8,
    pub alpha_scale: f32,
    /// Resaturation toward the pure brush color (0.0 - 1.0)
    pub resat: f32,
    /// Pickup of canvas color (0.0 - 1.0)
    pub bleed: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            paint_mode: PaintMode::Flow,
            tool_class: ToolClass::Brush,
            opacity: 255,
            alpha_scale: 1.0,
            resat: 0.5,
            bleed: 0.5,
        }
    }
}

impl BrushConfig {
    /// Parse a JSON brush config and validate it
    pub fn from_json(json: &str) -> Result<Self, StrokeError> {
        let config: BrushConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StrokeError> {
        if !self.alpha_scale.is_finite() || self.alpha_scale <= 0.0 {
            return Err(StrokeError::InvalidConfig(
                "alphaScale must be a positive finite number".to_string(),
            ));
        }
        if !self.resat.is_finite() || !(0.0..=1.0).contains(&self.resat) {
            return Err(StrokeError::InvalidConfig(
                "resat must be in [0, 1]".to_string(),
            ));
        }
        if !self.bleed.is_finite() || !(0.0..=1.0).contains(&self.bleed) {
            return Err(StrokeError::InvalidConfig(
                "bleed must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
