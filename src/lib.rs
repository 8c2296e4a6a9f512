//! stroke-engine - pixel-level brush stroke compositing
//!
//! Accumulates a freehand stroke into a per-stroke scratch buffer and merges
//! it onto a color layer or a greyscale mask with tool-specific blend rules:
//! paint, eraser, dodge, burn, blur, direct color, watercolor, oil and smudge.
//!
//! ```no_run
//! use stroke_engine::{BrushConfig, LayerKind, StrokeEngine, ToolKind};
//!
//! let mut engine = StrokeEngine::new(ToolKind::Paint, BrushConfig::default())?;
//! engine.begin_stroke(LayerKind::Image, 512, 512)?;
//! // paint_dab(...) per sample, merge_onto_image(...) per frame
//! let dirty = engine.end_stroke()?;
//! # let _ = dirty;
//! # Ok::<(), stroke_engine::StrokeError>(())
//! ```

pub mod brush;
pub mod core;

pub use brush::{
    BlurTool, BurnTool, Dab, DirectColorTool, DodgeTool, EraserTool, LayerKind, LayerMut, OilTool,
    PaintTool, Reservoir, SampleHistory, Scratch, ScratchKind, SmudgeTool, StrokeEngine,
    StrokeSession, StrokeTool, ToolKind, WatercolorTool, MAX_COVERAGE,
};
pub use crate::core::color::ColorF;
pub use crate::core::config::{BrushConfig, PaintMode, ToolClass};
pub use crate::core::errors::StrokeError;
pub use crate::core::geometry::Rect;
pub use crate::core::raster::{GreyAlpha8, GreyImage, Grid, Rgba8, RgbaImage};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `stroke_engine=info`.
/// Returns `false` when a subscriber was already installed.
pub fn init_logging() -> bool {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stroke_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("stroke-engine logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging();
        assert!(!init_logging());
    }
}
