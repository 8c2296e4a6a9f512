//! Coverage-family dab painter
//!
//! Accumulates brush-tip masks into the 16-bit coverage scratch using either
//! flow (saturating build-up) or opacity (max ceiling) accumulation.

use super::session::StrokeSession;
use super::{Dab, MAX_COVERAGE};
use crate::core::config::{BrushConfig, PaintMode, ToolClass};
use crate::core::errors::StrokeError;

/// Pen opacity at or below which the alpha scale stays at its floor
const PEN_KNEE: u8 = 192;
/// Pen alpha scale below the knee
const PEN_MIN_SCALE: f32 = 0.5;
/// Effective alpha a pen reaches at full opacity
const PEN_MAX_ALPHA: u32 = 220;

/// Map the rasterizer's 1-255 dab alpha onto 5-255
pub fn rescale_dab_alpha(alpha: u8) -> f32 {
    let a = alpha.max(1) as f32;
    5.0 + (a - 1.0) * (250.0 / 254.0)
}

/// Alpha scale for the configured tool class
pub fn calc_alpha_scale(config: &BrushConfig) -> f32 {
    match config.tool_class {
        ToolClass::Pen => {
            if config.opacity <= PEN_KNEE {
                return PEN_MIN_SCALE;
            }
            let max_scale = PEN_MAX_ALPHA as f32 / 255.0;
            let t = (config.opacity - PEN_KNEE) as f32 / (255 - PEN_KNEE) as f32;
            PEN_MIN_SCALE + (max_scale - PEN_MIN_SCALE) * t
        }
        ToolClass::Brush => config.alpha_scale,
    }
}

/// Final per-dab alpha (1-255) fed to the accumulation policy
pub fn dab_alpha(alpha: u8, config: &BrushConfig) -> u32 {
    let scaled = (rescale_dab_alpha(alpha) * calc_alpha_scale(config)).ceil();
    let a = (scaled.max(1.0) as u32).min(255);
    match config.tool_class {
        ToolClass::Pen => a.min(PEN_MAX_ALPHA),
        ToolClass::Brush => a,
    }
}

/// Saturating integrator: keeps rising toward full coverage, never past it
#[inline]
pub(crate) fn flow_accumulate(old: u16, mask: u8, alpha: u32) -> u16 {
    let old = old as u32;
    let headroom = 255 - old / 255;
    let add = headroom * mask as u32 * alpha / 255;
    (old + add).min(MAX_COVERAGE as u32) as u16
}

/// Ceiling: repeated passes never exceed one full-strength pass
#[inline]
pub(crate) fn opacity_accumulate(old: u16, mask: u8, alpha: u32) -> u16 {
    let value = mask as u32 * alpha.min(255);
    (value as u16).max(old)
}

/// Stroke alpha of a coverage value, rounded to nearest
#[inline]
pub(crate) fn stroke_alpha_rounded(coverage: u16) -> u32 {
    (coverage as u32 + 127) / 255
}

/// Stroke alpha of a coverage value, truncated
#[inline]
pub(crate) fn stroke_alpha(coverage: u16) -> u32 {
    coverage as u32 / 255
}

pub(crate) fn paint_coverage_dab(
    session: &mut StrokeSession,
    tool: &'static str,
    dab: &Dab<'_>,
    config: &BrushConfig,
) -> Result<(), StrokeError> {
    dab.validate(&session.bounds())?;
    let alpha = dab_alpha(dab.alpha, config);
    let mode = config.paint_mode;
    let scratch = session.coverage_mut(tool)?;

    dab.for_each_pixel(|mask, _, _, ix, iy| {
        if mask == 0 {
            return;
        }
        let old = scratch.get(ix, iy);
        let new = match mode {
            PaintMode::Flow => flow_accumulate(old, mask, alpha),
            PaintMode::Opacity => opacity_accumulate(old, mask, alpha),
        };
        scratch.set(ix, iy, new);
    });

    session.extend_region(&dab.image_rect);
    tracing::trace!(
        "{} dab alpha {} -> {} over {:?}",
        tool,
        dab.alpha,
        alpha,
        dab.image_rect
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brush::session::{LayerKind, ScratchKind};
    use crate::core::geometry::Rect;

    fn brush(mode: PaintMode) -> BrushConfig {
        BrushConfig {
            paint_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_rescale_range() {
        assert_eq!(rescale_dab_alpha(1), 5.0);
        assert!((rescale_dab_alpha(255) - 255.0).abs() < 1e-4);
        assert!(rescale_dab_alpha(128) > 5.0 && rescale_dab_alpha(128) < 255.0);
    }

    #[test]
    fn test_pen_alpha_scale_curve() {
        let mut config = BrushConfig {
            tool_class: ToolClass::Pen,
            opacity: 100,
            ..Default::default()
        };
        assert_eq!(calc_alpha_scale(&config), 0.5);
        config.opacity = 192;
        assert_eq!(calc_alpha_scale(&config), 0.5);
        config.opacity = 224;
        let mid = calc_alpha_scale(&config);
        assert!(mid > 0.5 && mid < 220.0 / 255.0);
        config.opacity = 255;
        assert!((calc_alpha_scale(&config) - 220.0 / 255.0).abs() < 1e-6);
        assert_eq!(dab_alpha(255, &config), 220);
    }

    #[test]
    fn test_dab_alpha_never_zero() {
        let config = BrushConfig {
            alpha_scale: 0.001,
            ..Default::default()
        };
        assert_eq!(dab_alpha(1, &config), 1);
        let config = BrushConfig {
            alpha_scale: 4.0,
            ..Default::default()
        };
        assert_eq!(dab_alpha(255, &config), 255);
    }

    #[test]
    fn test_flow_is_monotonic_and_bounded() {
        let mut cov = 0u16;
        for _ in 0..500 {
            let next = flow_accumulate(cov, 40, 30);
            assert!(next >= cov);
            assert!(next <= MAX_COVERAGE);
            cov = next;
        }
        assert!(cov > 60000);
        assert_eq!(flow_accumulate(MAX_COVERAGE, 255, 255), MAX_COVERAGE);
    }

    #[test]
    fn test_flow_full_dab_saturates() {
        assert_eq!(flow_accumulate(0, 255, 255), MAX_COVERAGE);
    }

    #[test]
    fn test_opacity_is_idempotent() {
        let once = opacity_accumulate(0, 200, 180);
        assert_eq!(opacity_accumulate(once, 200, 180), once);
        // Alpha above 255 is clamped instead of overflowing u16
        assert_eq!(opacity_accumulate(0, 255, 400), MAX_COVERAGE);
    }

    #[test]
    fn test_stroke_alpha_rounding() {
        assert_eq!(stroke_alpha_rounded(MAX_COVERAGE), 255);
        assert_eq!(stroke_alpha_rounded(65024), 255);
        assert_eq!(stroke_alpha(65024), 254);
        assert_eq!(stroke_alpha_rounded(127), 0);
        assert_eq!(stroke_alpha_rounded(128), 1);
    }

    #[test]
    fn test_paint_coverage_dab_updates_region() {
        let mut session = StrokeSession::new(ScratchKind::Coverage, LayerKind::Image, 8, 8);
        let mask = [255u8; 4];
        let dab = Dab {
            mask: &mask,
            mask_width: 2,
            mask_height: 2,
            brush_rect: Rect::new(0, 0, 2, 2),
            image_rect: Rect::new(3, 4, 5, 6),
            alpha: 255,
        };
        paint_coverage_dab(&mut session, "paint", &dab, &brush(PaintMode::Flow)).unwrap();
        assert_eq!(session.stroked_region(), Rect::new(3, 4, 5, 6));
        let cov = session.coverage("paint").unwrap();
        assert_eq!(cov.get(3, 4), MAX_COVERAGE);
        assert_eq!(cov.get(2, 4), 0);
    }
}
