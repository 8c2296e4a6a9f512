//! Tonal tools: eraser, dodge and burn
//!
//! All three paint plain coverage and only differ in how the merge remaps the
//! snapshot. Coverage is truncated to a stroke alpha here, unlike the paint
//! merge which rounds.

use super::coverage::stroke_alpha;
use super::session::{merge_region, StrokeSession};
use super::StrokeTool;
use crate::core::color::ColorF;
use crate::core::errors::StrokeError;
use crate::core::raster::{GreyImage, Rgba8, RgbaImage};

/// Burn target constant; channels are pushed away from it
const BURN_K: i32 = 260;

/// Removes alpha, leaving color channels in place
#[derive(Debug, Clone, Copy, Default)]
pub struct EraserTool;

impl StrokeTool for EraserTool {
    fn name(&self) -> &'static str {
        "eraser"
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
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha(cov);
            (sa != 0).then(|| Rgba8 {
                a: (base.a as u32 * (255 - sa) / 255) as u8,
                ..base
            })
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
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha(cov);
            (sa != 0).then(|| (base as u32 * (255 - sa) / 255) as u8)
        });
        Ok(())
    }
}

#[inline]
fn dodge_channel(value: u8, sa: u32) -> u32 {
    value as u32 * (sa + 255) / 255
}

#[inline]
fn burn_channel(value: u8, sa: u32) -> i32 {
    let v = value as i32;
    v - (BURN_K - v) * sa as i32 / 255
}

/// Brightens by scaling channels up to 2x at full coverage
#[derive(Debug, Clone, Copy, Default)]
pub struct DodgeTool;

impl StrokeTool for DodgeTool {
    fn name(&self) -> &'static str {
        "dodge"
    }

    /// Image channels are stored unclamped: results above 255 keep their low 8 bits.
    fn merge_onto_image(
        &self,
        session: &StrokeSession,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_target(dest, undo)?;
        let coverage = session.coverage(self.name())?;
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha(cov);
            if sa == 0 || base.a == 0 {
                return None;
            }
            Some(base.with_rgb(base.rgb().map(|c| dodge_channel(c, sa) as u8)))
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
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha(cov);
            (sa != 0).then(|| dodge_channel(base, sa).min(255) as u8)
        });
        Ok(())
    }
}

/// Darkens channels away from a constant just above white
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnTool;

impl StrokeTool for BurnTool {
    fn name(&self) -> &'static str {
        "burn"
    }

    /// Image channels are stored unclamped: negative results keep their low 8 bits.
    fn merge_onto_image(
        &self,
        session: &StrokeSession,
        dest: &mut RgbaImage,
        undo: &RgbaImage,
        _color: ColorF,
    ) -> Result<(), StrokeError> {
        session.check_target(dest, undo)?;
        let coverage = session.coverage(self.name())?;
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha(cov);
            if sa == 0 || base.a == 0 {
                return None;
            }
            Some(base.with_rgb(base.rgb().map(|c| burn_channel(c, sa) as u8)))
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
        merge_region(&session.stroked_region(), coverage, dest, undo, |cov, base, _, _| {
            let sa = stroke_alpha(cov);
            (sa != 0).then(|| burn_channel(base, sa).max(0) as u8)
        });
        Ok(())
    }
}
