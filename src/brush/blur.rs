//! Blur tool: coverage-weighted 4-neighbor smoothing of the snapshot

use super::coverage::stroke_alpha;
use super::session::{merge_region, StrokeSession};
use super::StrokeTool;
use crate::core::color::ColorF;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyImage, Grid, Rgba8, RgbaImage};

/// Weight of the center pixel for a given stroke alpha (64 at none, 1 at full)
#[inline]
fn center_weight(sa: u32) -> u32 {
    64 - 63 * sa / 255
}

/// Center plus its four axis neighbors; off-image neighbors reuse the center
fn neighborhood<P: Copy + Default>(img: &Grid<P>, x: usize, y: usize) -> [P; 5] {
    let center = img.get(x, y);
    let at = |nx: Option<usize>, ny: Option<usize>| match (nx, ny) {
        (Some(nx), Some(ny)) if nx < img.width() && ny < img.height() => img.get(nx, ny),
        _ => center,
    };
    [
        center,
        at(x.checked_sub(1), Some(y)),
        at(Some(x + 1), Some(y)),
        at(Some(x), y.checked_sub(1)),
        at(Some(x), Some(y + 1)),
    ]
}

#[inline]
fn weighted(center: u8, neighbors: [u8; 4], weight: u32) -> u8 {
    let sum = center as u32 * weight + neighbors.iter().map(|&n| n as u32).sum::<u32>();
    (sum / (weight + 4)) as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlurTool;

impl StrokeTool for BlurTool {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn merge_onto_image(
        &self,
        session: &StrokeSession,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_target(dest, undo)?;
        let coverage = session.coverage(self.name())?;
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, _, x, y| {
            let sa = stroke_alpha(cov);
            if sa == 0 {
                return None;
            }
            let w = center_weight(sa);
            let [c, l, r, t, b] = neighborhood(undo, x, y);
            let channel = |f: fn(&Rgba8) -> u8| weighted(f(&c), [f(&l), f(&r), f(&t), f(&b)], w);
            Some(Rgba8::new(
                channel(|p| p.r),
                channel(|p| p.g),
                channel(|p| p.b),
                channel(|p| p.a),
            ))
        });
        Ok(())
    }

    fn merge_onto_mask(
        &self,
        session: &StrokeSession,
        dest: &mut GreyImage,
        undo: &GreyImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_target(dest, undo)?;
        let coverage = session.coverage(self.name())?;
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, _, x, y| {
            let sa = stroke_alpha(cov);
            if sa == 0 {
                return None;
            }
            let [c, l, r, t, b] = neighborhood(undo, x, y);
            Some(weighted(c, [l, r, t, b], center_weight(sa)))
        });
        Ok(())
    }
}
