//! Oil brush
//!
//! Paint is carried in a tip-sized reservoir. The first dab of a stroke only
//! loads the reservoir from the canvas. Every later dab resaturates the
//! reservoir with the brush color, lays it into the color scratch through
//! the tip mask, then picks paint back up from the layer.
//!
//! The scratch is merged like any direct-color brush. Pick-up reads the
//! layer as last merged by the caller.

use super::direct::{merge_direct_image, merge_direct_mask, paint_grey_cell, paint_rgba_cell};
use super::reservoir::{pick_up, resaturate, seed_reservoir, Reservoir};
use super::session::{LayerMut, ScratchKind, StrokeSession};
use super::{Dab, StrokeTool};
use crate::core::color::ColorF;
use crate::core::config::BrushConfig;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyAlpha8, GreyImage, Rgba8, RgbaImage};

/// Resaturation strength (0-255) for a resat setting
fn resat_strength(resat: f32) -> u32 {
    if resat <= 0.0 {
        return 0;
    }
    ((resat * resat * 255.0).round() as u32).max(1)
}

fn bleed_strength(bleed: f32) -> u32 {
    (bleed * 255.0).round() as u32
}

/// Reservoir alpha through the tip mask and dab alpha
#[inline]
fn deposit_alpha(held: u8, mask: u8, dab_alpha: u8) -> u32 {
    held as u32 * mask as u32 * dab_alpha as u32 / (255 * 255)
}

#[derive(Debug, Clone, Default)]
pub struct OilTool {
    reservoir: Option<Reservoir>,
}

impl OilTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reservoir(&self) -> Option<&Reservoir> {
        self.reservoir.as_ref()
    }
}

impl StrokeTool for OilTool {
    fn name(&self) -> &'static str {
        "oil"
    }

    fn scratch_kind(&self) -> ScratchKind {
        ScratchKind::Color
    }

    fn wants_output_as_input(&self) -> bool {
        true
    }

    fn begin_stroke(&mut self) {
        self.reservoir = None;
    }

    fn end_stroke(&mut self) {
        self.reservoir = None;
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
        dab.validate(&session.bounds())?;
        let tool = self.name();

        let Some(reservoir) = self.reservoir.as_mut() else {
            self.reservoir = Some(seed_reservoir(&layer, dab));
            session.extend_region(&dab.image_rect);
            tracing::trace!("oil reservoir loaded under {:?}", dab.image_rect);
            return Ok(());
        };
        reservoir.check_dab(dab)?;

        let resat = resat_strength(config.resat);
        let bleed = bleed_strength(config.bleed);
        let dab_alpha = dab.alpha;

        match (reservoir, layer) {
            (Reservoir::Rgba(res), LayerMut::Image(img)) => {
                let scratch = session.rgba_mut(tool)?;
                let pure = Rgba8 {
                    a: 255,
                    ..color.to_rgba8()
                };
                resaturate(res, &dab.brush_rect, pure, resat);
                dab.for_each_pixel(|mask, bx, by, ix, iy| {
                    let held = res.get(bx, by);
                    let a = deposit_alpha(held.a, mask, dab_alpha);
                    if a != 0 {
                        let cell = paint_rgba_cell(scratch.get(ix, iy), held.rgb(), a);
                        scratch.set(ix, iy, cell);
                    }
                });
                pick_up(res, dab, |x, y| img.get(x, y), bleed);
            }
            (Reservoir::Grey(res), LayerMut::Mask(mask_layer)) => {
                let scratch = session.grey_alpha_mut(tool)?;
                let pure = GreyAlpha8::new(color.to_grey8(), 255);
                resaturate(res, &dab.brush_rect, pure, resat);
                dab.for_each_pixel(|mask, bx, by, ix, iy| {
                    let held = res.get(bx, by);
                    let a = deposit_alpha(held.alpha, mask, dab_alpha);
                    if a != 0 {
                        let cell = paint_grey_cell(scratch.get(ix, iy), held.value, a);
                        scratch.set(ix, iy, cell);
                    }
                });
                pick_up(
                    res,
                    dab,
                    |x, y| GreyAlpha8::new(mask_layer.get(x, y), 255),
                    bleed,
                );
            }
            (_, layer) => {
                return Err(StrokeError::LayerMismatch {
                    tool,
                    found: match layer {
                        LayerMut::Image(_) => "image",
                        LayerMut::Mask(_) => "mask",
                    },
                });
            }
        }
        session.extend_region(&dab.image_rect);
        Ok(())
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
