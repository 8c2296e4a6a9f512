//! Per-stroke scratch buffer and stroked-region tracking

use crate::core::errors::StrokeError;
use crate::core::geometry::Rect;
use crate::core::raster::{GreyAlpha8, GreyImage, Grid, Rgba8, RgbaImage};

/// Scratch encoding a tool accumulates into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchKind {
    /// 16-bit coverage (0..=65025)
    Coverage,
    /// Color + alpha per pixel, `Rgba8` or `GreyAlpha8` depending on the layer
    Color,
    /// Tool paints straight onto the layer
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Image,
    Mask,
}

/// The layer a dab is painted against
#[derive(Debug)]
pub enum LayerMut<'a> {
    Image(&'a mut RgbaImage),
    Mask(&'a mut GreyImage),
}

impl LayerMut<'_> {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerMut::Image(_) => LayerKind::Image,
            LayerMut::Mask(_) => LayerKind::Mask,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        match self {
            LayerMut::Image(img) => img.size(),
            LayerMut::Mask(mask) => mask.size(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Scratch {
    Coverage(Grid<u16>),
    Rgba(Grid<Rgba8>),
    GreyAlpha(Grid<GreyAlpha8>),
    None,
}

impl Scratch {
    fn describe(&self) -> &'static str {
        match self {
            Scratch::Coverage(_) => "coverage",
            Scratch::Rgba(_) => "rgba",
            Scratch::GreyAlpha(_) => "grey-alpha",
            Scratch::None => "empty",
        }
    }
}

/// Everything that lives exactly as long as one stroke
#[derive(Debug, Clone)]
pub struct StrokeSession {
    width: usize,
    height: usize,
    layer_kind: LayerKind,
    scratch: Scratch,
    stroked_region: Rect,
}

impl StrokeSession {
    /// Allocate a zeroed scratch buffer covering a `width` x `height` layer
    pub fn new(kind: ScratchKind, layer_kind: LayerKind, width: usize, height: usize) -> Self {
        let scratch = match (kind, layer_kind) {
            (ScratchKind::Coverage, _) => Scratch::Coverage(Grid::new(width, height)),
            (ScratchKind::Color, LayerKind::Image) => Scratch::Rgba(Grid::new(width, height)),
            (ScratchKind::Color, LayerKind::Mask) => Scratch::GreyAlpha(Grid::new(width, height)),
            (ScratchKind::None, _) => Scratch::None,
        };
        tracing::trace!(
            "Stroke session {}x{} with {} scratch",
            width,
            height,
            scratch.describe()
        );
        Self {
            width,
            height,
            layer_kind,
            scratch,
            stroked_region: Rect::empty(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn layer_kind(&self) -> LayerKind {
        self.layer_kind
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.width as i32, self.height as i32)
    }

    /// Bounding box of every pixel touched so far
    pub fn stroked_region(&self) -> Rect {
        self.stroked_region
    }

    pub fn extend_region(&mut self, rect: &Rect) {
        self.stroked_region.union(rect);
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Clear scratch content and region for a fresh stroke
    pub fn reset(&mut self) {
        match &mut self.scratch {
            Scratch::Coverage(g) => g.fill(0),
            Scratch::Rgba(g) => g.fill(Rgba8::TRANSPARENT),
            Scratch::GreyAlpha(g) => g.fill(GreyAlpha8::default()),
            Scratch::None => {}
        }
        self.stroked_region = Rect::empty();
    }

    /// Fail unless `layer` matches the session's geometry and kind
    pub fn check_layer(&self, layer: &LayerMut<'_>) -> Result<(), StrokeError> {
        if layer.size() != self.size() {
            return Err(StrokeError::SizeMismatch {
                expected: self.size(),
                actual: layer.size(),
            });
        }
        if layer.kind() != self.layer_kind {
            return Err(StrokeError::LayerMismatch {
                tool: "session",
                found: match layer.kind() {
                    LayerKind::Image => "image",
                    LayerKind::Mask => "mask",
                },
            });
        }
        Ok(())
    }

    /// Fail unless `dest` and `undo` both match the session's geometry
    pub fn check_target<P: Copy + Default>(
        &self,
        dest: &Grid<P>,
        undo: &Grid<P>,
    ) -> Result<(), StrokeError> {
        for size in [dest.size(), undo.size()] {
            if size != self.size() {
                return Err(StrokeError::SizeMismatch {
                    expected: self.size(),
                    actual: size,
                });
            }
        }
        Ok(())
    }

    fn mismatch(&self, tool: &'static str) -> StrokeError {
        StrokeError::LayerMismatch {
            tool,
            found: self.scratch.describe(),
        }
    }

    pub fn coverage(&self, tool: &'static str) -> Result<&Grid<u16>, StrokeError> {
        match &self.scratch {
            Scratch::Coverage(g) => Ok(g),
            _ => Err(self.mismatch(tool)),
        }
    }

    pub fn coverage_mut(&mut self, tool: &'static str) -> Result<&mut Grid<u16>, StrokeError> {
        let found = self.scratch.describe();
        match &mut self.scratch {
            Scratch::Coverage(g) => Ok(g),
            _ => Err(StrokeError::LayerMismatch { tool, found }),
        }
    }

    pub fn rgba(&self, tool: &'static str) -> Result<&Grid<Rgba8>, StrokeError> {
        match &self.scratch {
            Scratch::Rgba(g) => Ok(g),
            _ => Err(self.mismatch(tool)),
        }
    }

    pub fn rgba_mut(&mut self, tool: &'static str) -> Result<&mut Grid<Rgba8>, StrokeError> {
        let found = self.scratch.describe();
        match &mut self.scratch {
            Scratch::Rgba(g) => Ok(g),
            _ => Err(StrokeError::LayerMismatch { tool, found }),
        }
    }

    pub fn grey_alpha(&self, tool: &'static str) -> Result<&Grid<GreyAlpha8>, StrokeError> {
        match &self.scratch {
            Scratch::GreyAlpha(g) => Ok(g),
            _ => Err(self.mismatch(tool)),
        }
    }

    pub fn grey_alpha_mut(
        &mut self,
        tool: &'static str,
    ) -> Result<&mut Grid<GreyAlpha8>, StrokeError> {
        let found = self.scratch.describe();
        match &mut self.scratch {
            Scratch::GreyAlpha(g) => Ok(g),
            _ => Err(StrokeError::LayerMismatch { tool, found }),
        }
    }
}

/// Recombine `undo` and a scratch buffer into `dest` over the stroked region.
///
/// `blend` receives `(scratch, undo_pixel, x, y)` and returns the merged
/// pixel, or `None` to copy the snapshot pixel through unchanged.
pub(crate) fn merge_region<S, P>(
    region: &Rect,
    scratch: &Grid<S>,
    dest: &mut Grid<P>,
    undo: &Grid<P>,
    mut blend: impl FnMut(S, P, usize, usize) -> Option<P>,
) where
    S: Copy + Default,
    P: Copy + Default,
{
    let region = region.intersect(&dest.bounds());
    for y in region.top as usize..region.bottom as usize {
        for x in region.left as usize..region.right as usize {
            let base = undo.get(x, y);
            let out = blend(scratch.get(x, y), base, x, y).unwrap_or(base);
            dest.set(x, y, out);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_picks_scratch_encoding() {
        let s = StrokeSession::new(ScratchKind::Color, LayerKind::Mask, 4, 4);
        assert!(matches!(s.scratch(), Scratch::GreyAlpha(_)));
        assert!(s.coverage("test").is_err());
        assert!(s.grey_alpha("test").is_ok());

        let s = StrokeSession::new(ScratchKind::Color, LayerKind::Image, 4, 4);
        assert!(s.rgba("test").is_ok());
    }

    #[test]
    fn test_mutable_scratch_access_reports_mismatch() {
        let mut s = StrokeSession::new(ScratchKind::Coverage, LayerKind::Image, 2, 2);
        s.coverage_mut("blur").unwrap().set(0, 0, 7);
        assert_eq!(s.coverage("blur").unwrap().get(0, 0), 7);
        assert!(matches!(
            s.rgba_mut("oil"),
            Err(StrokeError::LayerMismatch {
                tool: "oil",
                found: "coverage"
            })
        ));
        assert!(matches!(
            s.grey_alpha_mut("oil"),
            Err(StrokeError::LayerMismatch { found: "coverage", .. })
        ));

        let mut s = StrokeSession::new(ScratchKind::Color, LayerKind::Mask, 2, 2);
        assert!(s.grey_alpha_mut("watercolor").is_ok());
        assert!(matches!(
            s.coverage_mut("paint"),
            Err(StrokeError::LayerMismatch { found: "grey-alpha", .. })
        ));
    }

    #[test]
    fn test_reset_clears_region_and_scratch() {
        let mut s = StrokeSession::new(ScratchKind::Coverage, LayerKind::Image, 4, 4);
        s.coverage_mut("test").unwrap().set(1, 1, 500);
        s.extend_region(&Rect::new(1, 1, 2, 2));
        s.reset();
        assert!(s.stroked_region().is_empty());
        assert!(s.coverage("test").unwrap().pixels().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_check_layer_rejects_wrong_size() {
        let s = StrokeSession::new(ScratchKind::Coverage, LayerKind::Image, 4, 4);
        let mut img = RgbaImage::new(5, 4);
        assert!(s.check_layer(&LayerMut::Image(&mut img)).is_err());
        let mut mask = GreyImage::new(4, 4);
        assert!(matches!(
            s.check_layer(&LayerMut::Mask(&mut mask)),
            Err(StrokeError::LayerMismatch { .. })
        ));
    }

    #[test]
    fn test_merge_region_copies_snapshot_on_skip() {
        let scratch = Grid::from_pixels(2, 1, vec![0u16, 1]).unwrap();
        let undo = Grid::from_pixels(2, 1, vec![10u8, 20]).unwrap();
        let mut dest = GreyImage::new(2, 1);
        merge_region(&Rect::new(0, 0, 2, 1), &scratch, &mut dest, &undo, |c, _, _, _| {
            (c > 0).then_some(99)
        });
        assert_eq!(dest.pixels(), &[10, 99]);
    }
}
