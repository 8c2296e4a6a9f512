//! Smudge tool
//!
//! Drags the paint under the brush along the stroke. The reservoir is
//! refreshed from the layer on every dab and written straight back through
//! the tip mask, so there is nothing left to merge afterwards.

use super::reservoir::{pick_up_keeping, seed_reservoir, Reservoir};
use super::session::{LayerMut, ScratchKind, StrokeSession};
use super::{Dab, StrokeTool};
use crate::core::color::ColorF;
use crate::core::config::BrushConfig;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyAlpha8, GreyImage, RgbaImage};

#[derive(Debug, Clone, Default)]
pub struct SmudgeTool {
    reservoir: Option<Reservoir>,
}

impl SmudgeTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reservoir(&self) -> Option<&Reservoir> {
        self.reservoir.as_ref()
    }
}

impl StrokeTool for SmudgeTool {
    fn name(&self) -> &'static str {
        "smudge"
    }

    fn scratch_kind(&self) -> ScratchKind {
        ScratchKind::None
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
        _config: &BrushConfig,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_layer(&layer)?;
        dab.validate(&session.bounds())?;

        let Some(reservoir) = self.reservoir.as_mut() else {
            self.reservoir = Some(seed_reservoir(&layer, dab));
            session.extend_region(&dab.image_rect);
            tracing::trace!("smudge reservoir loaded under {:?}", dab.image_rect);
            return Ok(());
        };
        reservoir.check_dab(dab)?;

        let keep = dab.alpha as u32;
        match (reservoir, layer) {
            (Reservoir::Rgba(res), LayerMut::Image(img)) => {
                pick_up_keeping(res, dab, |x, y| img.get(x, y), keep);
                dab.for_each_pixel(|mask, bx, by, ix, iy| {
                    if mask > 0 {
                        img.set(ix, iy, res.get(bx, by));
                    }
                });
            }
            (Reservoir::Grey(res), LayerMut::Mask(mask_layer)) => {
                pick_up_keeping(
                    res,
                    dab,
                    |x, y| GreyAlpha8::new(mask_layer.get(x, y), 255),
                    keep,
                );
                dab.for_each_pixel(|mask, bx, by, ix, iy| {
                    if mask > 0 {
                        mask_layer.set(ix, iy, res.get(bx, by).value);
                    }
                });
            }
            (_, layer) => {
                return Err(StrokeError::LayerMismatch {
                    tool: "smudge",
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
        _session: &StrokeSession,
        _dest: &mut RgbaImage,
        _undo: &RgbaImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        Ok(())
    }

    fn merge_onto_mask(
        &self,
        _session: &StrokeSession,
        _dest: &mut GreyImage,
        _undo: &GreyImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        Ok(())
    }
}
