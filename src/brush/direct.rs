//! Direct-color brushes
//!
//! The scratch buffer holds color and alpha per pixel instead of bare
//! coverage. Dabs are composited into it with a rounding-safe law, and the
//! merge lays the result over the snapshot with the standard alpha-over.

use super::coverage::dab_alpha;
use super::paint::{alpha_over, alpha_over_grey};
use super::session::{merge_region, LayerKind, LayerMut, ScratchKind, StrokeSession};
use super::{Dab, StrokeTool};
use crate::core::color::ColorF;
use crate::core::config::BrushConfig;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyAlpha8, GreyImage, Rgba8, RgbaImage};

/// `a + inv * (b - a) / 255`, which stays unbiased across many small writes
#[inline]
pub(crate) fn lerp_channel(a: u8, b: u8, inv: u32) -> u8 {
    let a = a as i32;
    (a + inv as i32 * (b as i32 - a) / 255) as u8
}

/// `(new_alpha, inv)` for laying `a2` over an existing `a1`
#[inline]
fn over_weights(a1: u32, a2: u32) -> (u32, u32) {
    let new_alpha = a1 + a2 - a1 * a2 / 255;
    let real = 255 * a2 / new_alpha;
    (new_alpha, 255 - real)
}

/// Composite `rgb` at `a2` into a scratch cell
#[inline]
pub(crate) fn paint_rgba_cell(cell: Rgba8, rgb: [u8; 3], a2: u32) -> Rgba8 {
    if a2 == 0 {
        return cell;
    }
    let (new_alpha, inv) = over_weights(cell.a as u32, a2);
    Rgba8::new(
        lerp_channel(rgb[0], cell.r, inv),
        lerp_channel(rgb[1], cell.g, inv),
        lerp_channel(rgb[2], cell.b, inv),
        new_alpha.min(255) as u8,
    )
}

#[inline]
pub(crate) fn paint_grey_cell(cell: GreyAlpha8, value: u8, a2: u32) -> GreyAlpha8 {
    if a2 == 0 {
        return cell;
    }
    let (new_alpha, inv) = over_weights(cell.alpha as u32, a2);
    GreyAlpha8::new(
        lerp_channel(value, cell.value, inv),
        new_alpha.min(255) as u8,
    )
}

/// Composite a flat color through the dab mask into the color scratch
pub(crate) fn paint_color_dab(
    session: &mut StrokeSession,
    tool: &'static str,
    dab: &Dab<'_>,
    color: &ColorF,
    alpha: u32,
) -> Result<(), StrokeError> {
    dab.validate(&session.bounds())?;
    match session.layer_kind() {
        LayerKind::Image => {
            let rgb = color.to_rgba8().rgb();
            let scratch = session.rgba_mut(tool)?;
            dab.for_each_pixel(|mask, _, _, ix, iy| {
                let a2 = mask as u32 * alpha / 255;
                if a2 != 0 {
                    scratch.set(ix, iy, paint_rgba_cell(scratch.get(ix, iy), rgb, a2));
                }
            });
        }
        LayerKind::Mask => {
            let value = color.to_grey8();
            let scratch = session.grey_alpha_mut(tool)?;
            dab.for_each_pixel(|mask, _, _, ix, iy| {
                let a2 = mask as u32 * alpha / 255;
                if a2 != 0 {
                    scratch.set(ix, iy, paint_grey_cell(scratch.get(ix, iy), value, a2));
                }
            });
        }
    }
    session.extend_region(&dab.image_rect);
    Ok(())
}

pub(crate) fn merge_direct_image(
    session: &StrokeSession,
    tool: &'static str,
    dest: &mut RgbaImage,
    undo: &RgbaImage,
) -> Result<(), StrokeError> {
    session.check_target(dest, undo)?;
    let scratch = session.rgba(tool)?;
    merge_region(&session.stroked_region(), scratch, dest, undo, |cell, base, _, _| {
        (cell.a != 0).then(|| alpha_over(cell.rgb(), cell.a as u32, base))
    });
    Ok(())
}

pub(crate) fn merge_direct_mask(
    session: &StrokeSession,
    tool: &'static str,
    dest: &mut GreyImage,
    undo: &GreyImage,
) -> Result<(), StrokeError> {
    session.check_target(dest, undo)?;
    let scratch = session.grey_alpha(tool)?;
    merge_region(&session.stroked_region(), scratch, dest, undo, |cell, base, _, _| {
        (cell.alpha != 0).then(|| alpha_over_grey(cell.value, cell.alpha as u32, base))
    });
    Ok(())
}

/// Plain direct-color brush: the brush color goes into the scratch per dab
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectColorTool;

impl StrokeTool for DirectColorTool {
    fn name(&self) -> &'static str {
        "direct-color"
    }

    fn scratch_kind(&self) -> ScratchKind {
        ScratchKind::Color
    }

    fn paint_dab(
        &mut self,
        session: &mut StrokeSession,
        layer: LayerMut<'_>,
        dab: &Dab<'_>,
        config: &BrushConfig,
        color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_layer(&layer)?;
        let alpha = dab_alpha(dab.alpha, config);
        paint_color_dab(session, self.name(), dab, &color, alpha)
    }

    fn merge_onto_image(
        &self,
        session: &StrokeSession,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        merge_direct_image(session, self.name(), dest, undo)
    }

    fn merge_onto_mask(
        &self,
        session: &StrokeSession,
        dest: &mut GreyImage,
        undo: &GreyImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        merge_direct_mask(session, self.name(), dest, undo)
    }
}
