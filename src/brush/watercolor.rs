//! Watercolor brush
//!
//! A direct-color brush whose paint color drifts with what is already on the
//! canvas. Each dab samples the layer around the tip, mixes the rolling
//! average of past samples with the brush color (resaturation), then folds
//! a fresh sample back into the history (bleed). Dabs are deliberately faint
//! and build up through overlap.

use std::collections::VecDeque;

use super::direct::{merge_direct_image, merge_direct_mask, paint_color_dab};
use super::session::{LayerMut, ScratchKind, StrokeSession};
use super::{Dab, StrokeTool};
use crate::core::color::ColorF;
use crate::core::config::BrushConfig;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyImage, RgbaImage};

/// Number of past samples averaged into the paint color
pub const HISTORY_LEN: usize = 50;

/// Alpha multiplier over an empty canvas
const TRANSPARENT_CANVAS_DIM: f32 = 0.3;
/// Upper bound of the sampling spread, in pixels
const MAX_SPREAD: i32 = 64;
const SHELLS: [f32; 4] = [0.25, 0.5, 0.75, 1.0];
const DIAGONAL_SCALE: f32 = 0.7;
/// Center plus eight directions on each shell
const SAMPLE_COUNT: usize = 1 + 8 * SHELLS.len();

/// Rolling window of the last `HISTORY_LEN` sampled colors
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<ColorF>,
}

impl SampleHistory {
    /// Fill every slot with the first sample so the average starts settled
    pub fn seeded(sample: ColorF) -> Self {
        Self {
            samples: std::iter::repeat(sample).take(HISTORY_LEN).collect(),
        }
    }

    /// Push the newest sample, dropping the oldest
    pub fn push(&mut self, sample: ColorF) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    pub fn average(&self) -> ColorF {
        ColorF::average(self.samples.iter()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&ColorF> {
        self.samples.back()
    }
}

/// Unit offsets of the radial sampling pattern: the center, then on every
/// shell the four axis directions and the four diagonals pulled in to 0.7
fn sample_offsets() -> [(f32, f32); SAMPLE_COUNT] {
    const DIRECTIONS: [(f32, f32); 8] = [
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
        (DIAGONAL_SCALE, DIAGONAL_SCALE),
        (-DIAGONAL_SCALE, DIAGONAL_SCALE),
        (DIAGONAL_SCALE, -DIAGONAL_SCALE),
        (-DIAGONAL_SCALE, -DIAGONAL_SCALE),
    ];
    let mut out = [(0.0, 0.0); SAMPLE_COUNT];
    let mut n = 1;
    for r in SHELLS {
        for (ux, uy) in DIRECTIONS {
            out[n] = (ux * r, uy * r);
            n += 1;
        }
    }
    out
}

/// Sample positions around the full tip's center, in layer coordinates
fn sample_points(dab: &Dab<'_>) -> impl Iterator<Item = (i32, i32)> {
    let origin_x = dab.image_rect.left - dab.brush_rect.left;
    let origin_y = dab.image_rect.top - dab.brush_rect.top;
    let cx = origin_x + dab.mask_width as i32 / 2;
    let cy = origin_y + dab.mask_height as i32 / 2;
    let dx = (dab.mask_width as i32 / 3).clamp(1, MAX_SPREAD) as f32;
    let dy = (dab.mask_height as i32 / 3).clamp(1, MAX_SPREAD) as f32;
    sample_offsets()
        .into_iter()
        .map(move |(fx, fy)| (cx + (fx * dx) as i32, cy + (fy * dy) as i32))
}

/// Average color under the tip; transparent pixels do not count.
/// Falls back to `brush` when everything sampled is transparent.
pub(crate) fn sample_rgb(img: &RgbaImage, dab: &Dab<'_>, brush: ColorF) -> ColorF {
    let opaque: Vec<ColorF> = sample_points(dab)
        .map(|(x, y)| img.get_pixel(x, y))
        .filter(|p| p.a != 0)
        .map(ColorF::from_rgba8)
        .collect();
    ColorF::average(opaque.iter()).unwrap_or(brush)
}

pub(crate) fn sample_grey(mask: &GreyImage, dab: &Dab<'_>) -> ColorF {
    let samples: Vec<ColorF> = sample_points(dab)
        .map(|(x, y)| ColorF::grey(mask.get_pixel_clamped(x, y)))
        .collect();
    ColorF::average(samples.iter()).unwrap_or_default()
}

/// Map the rasterizer's 1-255 dab alpha onto 8-255
fn rescale_alpha(alpha: u8) -> f32 {
    let a = alpha.max(1) as f32;
    8.0 + (a - 1.0) * (247.0 / 254.0)
}

#[derive(Debug, Clone, Default)]
pub struct WatercolorTool {
    history: Option<SampleHistory>,
    transparent_canvas: bool,
}

impl WatercolorTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Option<&SampleHistory> {
        self.history.as_ref()
    }

    /// Whether the last sample found nothing but the brush color underneath
    pub fn is_transparent_canvas(&self) -> bool {
        self.transparent_canvas
    }

    /// Alpha actually composited into the scratch for one dab
    fn composite_alpha(&self, alpha: u8) -> u32 {
        let dim = if self.transparent_canvas {
            TRANSPARENT_CANVAS_DIM
        } else {
            1.0
        };
        let alpha = (rescale_alpha(alpha) * dim) as u32;
        (alpha / 4).max(1)
    }
}

impl StrokeTool for WatercolorTool {
    fn name(&self) -> &'static str {
        "watercolor"
    }

    fn scratch_kind(&self) -> ScratchKind {
        ScratchKind::Color
    }

    fn wants_output_as_input(&self) -> bool {
        true
    }

    fn begin_stroke(&mut self) {
        self.history = None;
        self.transparent_canvas = false;
    }

    fn end_stroke(&mut self) {
        self.history = None;
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

        let sample = match &layer {
            LayerMut::Image(img) => sample_rgb(img, dab, color),
            LayerMut::Mask(mask) => sample_grey(mask, dab),
        };
        self.transparent_canvas = sample == color;

        let history = self
            .history
            .get_or_insert_with(|| SampleHistory::seeded(sample));
        let painted = history
            .average()
            .mix(&color, config.resat * config.resat);
        history.push(painted.mix(&sample, config.bleed));

        let alpha = self.composite_alpha(dab.alpha);
        tracing::trace!(
            "watercolor dab {:?} color {:?} alpha {}",
            dab.image_rect,
            painted,
            alpha
        );
        paint_color_dab(session, self.name(), dab, &painted, alpha)
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
