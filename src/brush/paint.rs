//! Standard paint merge: un-premultiplied alpha over

use super::coverage::stroke_alpha_rounded;
use super::session::{merge_region, StrokeSession};
use super::StrokeTool;
use crate::core::color::ColorF;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyImage, Rgba8, RgbaImage};

/// Composite `rgb` at `alpha` over `base`.
///
/// The source-over law is re-derived in integer form so repeated merges do
/// not drift: `new = sa + da(255 - sa)/255`, then each channel is weighted by
/// the source's share of `new`.
#[inline]
pub(crate) fn alpha_over(rgb: [u8; 3], alpha: u32, base: Rgba8) -> Rgba8 {
    let new_alpha = alpha + base.a as u32 * (255 - alpha) / 255;
    if new_alpha == 0 {
        return base;
    }
    let real = 255 * alpha / new_alpha;
    let inv = 255 - real;
    let ch = |src: u8, dst: u8| ((src as u32 * real + dst as u32 * inv) / 255) as u8;
    Rgba8::new(
        ch(rgb[0], base.r),
        ch(rgb[1], base.g),
        ch(rgb[2], base.b),
        new_alpha.min(255) as u8,
    )
}

/// Alpha over an opaque single-channel value
#[inline]
pub(crate) fn alpha_over_grey(value: u8, alpha: u32, base: u8) -> u8 {
    ((value as u32 * alpha + base as u32 * (255 - alpha)) / 255) as u8
}

/// The regular brush: flat color laid down through stroke coverage
#[derive(Debug, Clone, Copy, Default)]
pub struct PaintTool;

impl StrokeTool for PaintTool {
    fn name(&self) -> &'static str {
        "paint"
    }

    fn merge_onto_image(
        &self,
        session: &StrokeSession,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
        color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_target(dest, undo)?;
        let coverage = session.coverage(self.name())?;
        let brush = color.to_rgba8().rgb();

        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha_rounded(cov);
            (sa != 0).then(|| alpha_over(brush, sa, base))
        });
        Ok(())
    }

    fn merge_onto_mask(
        &self,
        session: &StrokeSession,
        dest: &mut GreyImage,
        undo: &GreyImage,
        color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_target(dest, undo)?;
        let coverage = session.coverage(self.name())?;
        let brush = color.to_grey8();

        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha_rounded(cov);
            (sa != 0).then(|| alpha_over_grey(brush, sa, base))
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brush::session::{LayerKind, LayerMut, ScratchKind};
    use crate::brush::{Dab, MAX_COVERAGE};
    use crate::core::config::BrushConfig;
    use crate::core::geometry::Rect;

    #[test]
    fn test_alpha_over_keeps_alpha_in_range() {
        for sa in (0..=255).step_by(17) {
            for da in (0..=255).step_by(15) {
                let out = alpha_over([10, 20, 30], sa, Rgba8::new(200, 100, 50, da as u8));
                assert!(out.a as u32 >= sa);
                assert!(out.a as u32 >= da || sa > 0);
            }
        }
        let full = alpha_over([1, 2, 3], 255, Rgba8::new(9, 9, 9, 128));
        assert_eq!(full, Rgba8::new(1, 2, 3, 255));
    }

    #[test]
    fn test_alpha_over_onto_transparent_takes_source_color() {
        let out = alpha_over([40, 80, 120], 100, Rgba8::TRANSPARENT);
        assert_eq!(out, Rgba8::new(40, 80, 120, 100));
    }

    #[test]
    fn test_merge_full_coverage_reaches_opaque() {
        let mut session = StrokeSession::new(ScratchKind::Coverage, LayerKind::Image, 4, 4);
        let mut layer = RgbaImage::new(4, 4);
        let mask = [255u8; 4];
        let dab = Dab {
            mask: &mask,
            mask_width: 2,
            mask_height: 2,
            brush_rect: Rect::new(0, 0, 2, 2),
            image_rect: Rect::new(1, 1, 3, 3),
            alpha: 255,
        };
        let red = ColorF::new(1.0, 0.0, 0.0, 1.0);
        PaintTool
            .paint_dab(
                &mut session,
                LayerMut::Image(&mut layer),
                &dab,
                &BrushConfig::default(),
                red,
            )
            .unwrap();
        assert_eq!(session.coverage("paint").unwrap().get(1, 1), MAX_COVERAGE);

        let undo = layer.clone();
        PaintTool
            .merge_onto_image(&session, &mut layer, &undo, red)
            .unwrap();
        assert_eq!(layer.get(1, 1), Rgba8::new(255, 0, 0, 255));
        assert_eq!(layer.get(0, 0), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_mask_merge() {
        let mut session = StrokeSession::new(ScratchKind::Coverage, LayerKind::Mask, 2, 1);
        session.coverage_mut("paint").unwrap().set(0, 0, MAX_COVERAGE / 2);
        session.extend_region(&Rect::new(0, 0, 2, 1));
        let undo = GreyImage::filled(2, 1, 0);
        let mut dest = GreyImage::new(2, 1);
        PaintTool
            .merge_onto_mask(&session, &mut dest, &undo, ColorF::WHITE)
            .unwrap();
        // 32512 / 255 rounds to 127
        assert_eq!(dest.get(0, 0), 127);
        assert_eq!(dest.get(1, 0), 0);
    }
}
