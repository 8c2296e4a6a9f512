//! Brush tools - dab accumulation and stroke merging
//!
//! Every tool implements [`StrokeTool`]. Per-stroke buffers live in a
//! [`StrokeSession`] owned by the caller; tools only keep the private state
//! their algorithm needs (sample history, paint reservoir).

mod blur;
mod coverage;
mod direct;
mod engine;
mod oil;
mod paint;
mod reservoir;
mod session;
mod smudge;
mod tonal;
mod watercolor;

pub use blur::BlurTool;
pub use coverage::{calc_alpha_scale, dab_alpha, rescale_dab_alpha};
pub use direct::DirectColorTool;
pub use engine::StrokeEngine;
pub use oil::OilTool;
pub use paint::PaintTool;
pub use reservoir::{stretch_rect_to_fill_buffer, Reservoir};
pub use session::{LayerKind, LayerMut, Scratch, ScratchKind, StrokeSession};
pub use smudge::SmudgeTool;
pub use tonal::{BurnTool, DodgeTool, EraserTool};
pub use watercolor::{SampleHistory, WatercolorTool, HISTORY_LEN};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::color::ColorF;
use crate::core::config::BrushConfig;
use crate::core::errors::StrokeError;
use crate::core::geometry::Rect;
use crate::core::raster::{GreyImage, RgbaImage};

/// Full coverage in the 16-bit scratch encoding (255 * 255)
pub const MAX_COVERAGE: u16 = 65025;

/// One placed brush tip, as produced by the dab rasterizer
#[derive(Debug, Clone, Copy)]
pub struct Dab<'a> {
    /// Shape mask, one opacity byte per pixel, `mask_width` bytes per row
    pub mask: &'a [u8],
    pub mask_width: usize,
    pub mask_height: usize,
    /// Area of the mask to apply, in mask coordinates
    pub brush_rect: Rect,
    /// Where `brush_rect` lands on the layer
    pub image_rect: Rect,
    /// Dab alpha (1-255)
    pub alpha: u8,
}

impl<'a> Dab<'a> {
    pub fn mask_bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.mask_width as i32, self.mask_height as i32)
    }

    #[inline]
    pub fn mask_at(&self, bx: usize, by: usize) -> u8 {
        self.mask[by * self.mask_width + bx]
    }

    /// Check the dab against its own mask and the layer it is painted on
    pub fn validate(&self, layer_bounds: &Rect) -> Result<(), StrokeError> {
        if self.mask.len() < self.mask_width * self.mask_height {
            return Err(StrokeError::SizeMismatch {
                expected: (self.mask_width, self.mask_height),
                actual: (self.mask.len(), 1),
            });
        }
        if !self.brush_rect.same_size(&self.image_rect) {
            return Err(StrokeError::RectMismatch {
                brush: self.brush_rect,
                image: self.image_rect,
            });
        }
        if !self.mask_bounds().contains_rect(&self.brush_rect) {
            return Err(StrokeError::DabOutOfBounds {
                rect: self.brush_rect,
                width: self.mask_width,
                height: self.mask_height,
                space: "brush mask",
            });
        }
        if !layer_bounds.contains_rect(&self.image_rect) {
            return Err(StrokeError::DabOutOfBounds {
                rect: self.image_rect,
                width: layer_bounds.width() as usize,
                height: layer_bounds.height() as usize,
                space: "layer",
            });
        }
        Ok(())
    }

    /// Visit every covered pixel as `(mask_value, bx, by, ix, iy)`
    pub fn for_each_pixel(&self, mut f: impl FnMut(u8, usize, usize, usize, usize)) {
        let w = self.brush_rect.width() as usize;
        let h = self.brush_rect.height() as usize;
        for row in 0..h {
            let by = self.brush_rect.top as usize + row;
            let iy = self.image_rect.top as usize + row;
            let mask_row = &self.mask[by * self.mask_width..];
            for col in 0..w {
                let bx = self.brush_rect.left as usize + col;
                let ix = self.image_rect.left as usize + col;
                f(mask_row[bx], bx, by, ix, iy);
            }
        }
    }
}

/// The capability set shared by every stroke tool
///
/// The default `paint_dab` is the coverage-family dab painter; direct-color
/// tools override it.
pub trait StrokeTool: Send + fmt::Debug {
    fn name(&self) -> &'static str;

    fn scratch_kind(&self) -> ScratchKind {
        ScratchKind::Coverage
    }

    /// Whether the layer must be re-merged before the next dab can sample it
    fn wants_output_as_input(&self) -> bool {
        false
    }

    fn begin_stroke(&mut self) {}

    fn end_stroke(&mut self) {}

    fn paint_dab(
        &mut self,
        session: &mut StrokeSession,
        layer: LayerMut<'_>,
        dab: &Dab<'_>,
        config: &BrushConfig,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_layer(&layer)?;
        coverage::paint_coverage_dab(session, self.name(), dab, config)
    }

    fn merge_onto_image(
        &self,
        session: &StrokeSession,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
        color: ColorF,
    ) -> Result<(), StrokeError>;

    fn merge_onto_mask(
        &self,
        session: &StrokeSession,
        dest: &mut GreyImage,
        undo: &GreyImage,
        color: ColorF,
    ) -> Result<(), StrokeError>;
}

/// Selects a tool implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Paint,
    Eraser,
    Dodge,
    Burn,
    Blur,
    DirectColor,
    Watercolor,
    Oil,
    Smudge,
}

impl ToolKind {
    pub fn create_tool(self) -> Box<dyn StrokeTool> {
        match self {
            ToolKind::Paint => Box::new(PaintTool),
            ToolKind::Eraser => Box::new(EraserTool),
            ToolKind::Dodge => Box::new(DodgeTool),
            ToolKind::Burn => Box::new(BurnTool),
            ToolKind::Blur => Box::new(BlurTool),
            ToolKind::DirectColor => Box::new(DirectColorTool),
            ToolKind::Watercolor => Box::new(WatercolorTool::new()),
            ToolKind::Oil => Box::new(OilTool::new()),
            ToolKind::Smudge => Box::new(SmudgeTool::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MASK: [u8; 9] = [0, 128, 0, 128, 255, 128, 0, 128, 0];

    fn dab(brush_rect: Rect, image_rect: Rect) -> Dab<'static> {
        Dab {
            mask: &MASK,
            mask_width: 3,
            mask_height: 3,
            brush_rect,
            image_rect,
            alpha: 255,
        }
    }

    #[test]
    fn test_validate_accepts_inner_dab() {
        let d = dab(Rect::new(0, 0, 3, 3), Rect::new(4, 4, 7, 7));
        assert!(d.validate(&Rect::new(0, 0, 10, 10)).is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_rects() {
        let d = dab(Rect::new(0, 0, 3, 3), Rect::new(4, 4, 6, 7));
        assert!(matches!(
            d.validate(&Rect::new(0, 0, 10, 10)),
            Err(StrokeError::RectMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_layer() {
        let d = dab(Rect::new(0, 0, 3, 3), Rect::new(8, 8, 11, 11));
        assert!(matches!(
            d.validate(&Rect::new(0, 0, 10, 10)),
            Err(StrokeError::DabOutOfBounds { space: "layer", .. })
        ));
    }

    #[test]
    fn test_for_each_pixel_maps_coordinates() {
        // Clipped dab: only the right column of the mask lands at x = 0
        let d = dab(Rect::new(2, 0, 3, 3), Rect::new(0, 5, 1, 8));
        let mut seen = Vec::new();
        d.for_each_pixel(|m, bx, by, ix, iy| seen.push((m, bx, by, ix, iy)));
        assert_eq!(
            seen,
            vec![(0, 2, 0, 0, 5), (128, 2, 1, 0, 6), (0, 2, 2, 0, 7)]
        );
    }

    #[test]
    fn test_tool_kind_serde_names() {
        let kind: ToolKind = serde_json::from_str("\"direct-color\"").unwrap();
        assert_eq!(kind, ToolKind::DirectColor);
        assert_eq!(kind.create_tool().name(), "direct-color");
        assert!(ToolKind::Smudge.create_tool().wants_output_as_input());
        assert!(!ToolKind::Paint.create_tool().wants_output_as_input());
    }
}
