//! Paint reservoir shared by the oil and smudge tools
//!
//! The reservoir is a tip-sized buffer, indexed in brush-mask coordinates,
//! holding the paint currently "in the bristles". It survives across dabs of
//! one stroke and exchanges pigment with the layer on every dab.

use super::direct::lerp_channel;
use super::session::{LayerKind, LayerMut};
use super::Dab;
use crate::core::errors::StrokeError;
use crate::core::geometry::Rect;
use crate::core::raster::{GreyAlpha8, Grid, Rgba8};

/// A reservoir pixel: channel-wise blendable
pub trait Pigment: Copy + Default + PartialEq {
    /// Combine channel by channel
    fn zip(self, other: Self, f: impl Fn(u8, u8) -> u8) -> Self;
}

impl Pigment for Rgba8 {
    fn zip(self, o: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        Rgba8::new(f(self.r, o.r), f(self.g, o.g), f(self.b, o.b), f(self.a, o.a))
    }
}

impl Pigment for GreyAlpha8 {
    fn zip(self, o: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        GreyAlpha8::new(f(self.value, o.value), f(self.alpha, o.alpha))
    }
}

/// Tip-sized pigment buffer in the layer's pixel format
#[derive(Debug, Clone, PartialEq)]
pub enum Reservoir {
    Rgba(Grid<Rgba8>),
    Grey(Grid<GreyAlpha8>),
}

impl Reservoir {
    /// Empty reservoir sized to the dab's full tip
    pub fn for_dab(kind: LayerKind, dab: &Dab<'_>) -> Self {
        match kind {
            LayerKind::Image => Reservoir::Rgba(Grid::new(dab.mask_width, dab.mask_height)),
            LayerKind::Mask => Reservoir::Grey(Grid::new(dab.mask_width, dab.mask_height)),
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Reservoir::Rgba(_) => LayerKind::Image,
            Reservoir::Grey(_) => LayerKind::Mask,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Reservoir::Rgba(g) => g.bounds(),
            Reservoir::Grey(g) => g.bounds(),
        }
    }

    /// Fail unless the dab's brush rect fits inside the reservoir
    pub fn check_dab(&self, dab: &Dab<'_>) -> Result<(), StrokeError> {
        let bounds = self.bounds();
        if !bounds.contains_rect(&dab.brush_rect) {
            return Err(StrokeError::DabOutOfBounds {
                rect: dab.brush_rect,
                width: bounds.width() as usize,
                height: bounds.height() as usize,
                space: "reservoir",
            });
        }
        Ok(())
    }
}

/// Reservoir loaded from the layer under the first dab of a stroke.
///
/// The covered part of the tip copies the layer outright; the rest is
/// stretched from its edges so later dabs never read unset paint.
pub fn seed_reservoir(layer: &LayerMut<'_>, dab: &Dab<'_>) -> Reservoir {
    let mut reservoir = Reservoir::for_dab(layer.kind(), dab);
    match (&mut reservoir, layer) {
        (Reservoir::Rgba(res), LayerMut::Image(img)) => {
            pick_up(res, dab, |x, y| img.get(x, y), 255);
            stretch_rect_to_fill_buffer(res, &dab.brush_rect);
        }
        (Reservoir::Grey(res), LayerMut::Mask(mask)) => {
            pick_up(res, dab, |x, y| GreyAlpha8::new(mask.get(x, y), 255), 255);
            stretch_rect_to_fill_buffer(res, &dab.brush_rect);
        }
        // for_dab follows the layer kind
        _ => {}
    }
    reservoir
}

/// Blend layer pixels into the reservoir; `weight` is the sample's share (255 replaces)
pub(crate) fn pick_up<P: Pigment>(
    reservoir: &mut Grid<P>,
    dab: &Dab<'_>,
    read: impl Fn(usize, usize) -> P,
    weight: u32,
) {
    dab.for_each_pixel(|_, bx, by, ix, iy| {
        let sample = read(ix, iy);
        let held = reservoir.get(bx, by);
        reservoir.set(bx, by, held.zip(sample, |r, s| lerp_channel(r, s, weight)));
    });
}

/// Move one channel a single unit toward `target`
#[inline]
fn nudge(value: u8, target: u8) -> u8 {
    if target > value {
        value + 1
    } else {
        value - 1
    }
}

/// Smudge pickup: `sample + keep * (held - sample) / 255`.
///
/// A channel that rounding leaves unchanged while the sample differs is moved
/// one unit toward the sample, so a drag never freezes.
pub(crate) fn pick_up_keeping<P: Pigment>(
    reservoir: &mut Grid<P>,
    dab: &Dab<'_>,
    read: impl Fn(usize, usize) -> P,
    keep: u32,
) {
    dab.for_each_pixel(|_, bx, by, ix, iy| {
        let sample = read(ix, iy);
        let held = reservoir.get(bx, by);
        let mixed = held.zip(sample, |r, s| {
            let c = lerp_channel(s, r, keep);
            if c == r && s != r {
                nudge(r, s)
            } else {
                c
            }
        });
        reservoir.set(bx, by, mixed);
    });
}

/// Pull the reservoir inside `rect` toward `color` by `strength`/255
pub(crate) fn resaturate<P: Pigment>(
    reservoir: &mut Grid<P>,
    rect: &Rect,
    color: P,
    strength: u32,
) {
    if strength == 0 {
        return;
    }
    for y in rect.top as usize..rect.bottom as usize {
        for x in rect.left as usize..rect.right as usize {
            let held = reservoir.get(x, y);
            reservoir.set(x, y, held.zip(color, |r, c| lerp_channel(r, c, strength)));
        }
    }
}

/// Replicate the edges of `rect` outward until the whole buffer is set.
///
/// Rows inside `rect` are extended left and right first, then the top and
/// bottom rows of that band are copied up and down.
pub fn stretch_rect_to_fill_buffer<T: Copy + Default>(buffer: &mut Grid<T>, rect: &Rect) {
    let rect = rect.intersect(&buffer.bounds());
    if rect.is_empty() {
        return;
    }
    let (left, right) = (rect.left as usize, rect.right as usize);
    let (top, bottom) = (rect.top as usize, rect.bottom as usize);
    let (width, height) = buffer.size();

    for y in top..bottom {
        let first = buffer.get(left, y);
        let last = buffer.get(right - 1, y);
        for x in 0..left {
            buffer.set(x, y, first);
        }
        for x in right..width {
            buffer.set(x, y, last);
        }
    }

    let row_len = width;
    let pixels = buffer.pixels_mut();
    let top_row = top * row_len;
    for y in 0..top {
        pixels.copy_within(top_row..top_row + row_len, y * row_len);
    }
    let bottom_row = (bottom - 1) * row_len;
    for y in bottom..height {
        pixels.copy_within(bottom_row..bottom_row + row_len, y * row_len);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stretch_fills_every_pixel_from_nearest_edge() {
        let mut grid: Grid<u8> = Grid::new(5, 4);
        // Sampled area is x 1..3, y 1..3 with values 1..=4
        grid.set(1, 1, 1);
        grid.set(2, 1, 2);
        grid.set(1, 2, 3);
        grid.set(2, 2, 4);
        stretch_rect_to_fill_buffer(&mut grid, &Rect::new(1, 1, 3, 3));
        assert_eq!(
            grid.pixels(),
            &[
                1, 1, 2, 2, 2, //
                1, 1, 2, 2, 2, //
                3, 3, 4, 4, 4, //
                3, 3, 4, 4, 4, //
            ]
        );
    }

    #[test]
    fn test_stretch_full_rect_is_noop() {
        let mut grid = Grid::from_pixels(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        stretch_rect_to_fill_buffer(&mut grid, &Rect::new(0, 0, 2, 2));
        assert_eq!(grid.pixels(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_pick_up_full_weight_replaces() {
        let mask = [255u8; 4];
        let dab = Dab {
            mask: &mask,
            mask_width: 2,
            mask_height: 2,
            brush_rect: Rect::new(0, 0, 2, 2),
            image_rect: Rect::new(5, 5, 7, 7),
            alpha: 255,
        };
        let mut res: Grid<Rgba8> = Grid::new(2, 2);
        pick_up(&mut res, &dab, |x, y| Rgba8::new(x as u8, y as u8, 9, 255), 255);
        assert_eq!(res.get(0, 0), Rgba8::new(5, 5, 9, 255));
        assert_eq!(res.get(1, 1), Rgba8::new(6, 6, 9, 255));
    }

    #[test]
    fn test_pick_up_keeping_never_sticks() {
        let mask = [255u8; 1];
        let dab = Dab {
            mask: &mask,
            mask_width: 1,
            mask_height: 1,
            brush_rect: Rect::new(0, 0, 1, 1),
            image_rect: Rect::new(0, 0, 1, 1),
            alpha: 255,
        };
        let mut res = Grid::filled(1, 1, GreyAlpha8::new(100, 255));
        // Full retention would leave 100 forever; the nudge moves it anyway
        pick_up_keeping(&mut res, &dab, |_, _| GreyAlpha8::new(110, 255), 255);
        assert_eq!(res.get(0, 0), GreyAlpha8::new(101, 255));
        pick_up_keeping(&mut res, &dab, |_, _| GreyAlpha8::new(90, 255), 255);
        assert_eq!(res.get(0, 0), GreyAlpha8::new(100, 255));
        // Zero retention replaces outright
        pick_up_keeping(&mut res, &dab, |_, _| GreyAlpha8::new(7, 255), 0);
        assert_eq!(res.get(0, 0), GreyAlpha8::new(7, 255));
    }

    #[test]
    fn test_resaturate_moves_toward_color() {
        let mut res = Grid::filled(2, 1, Rgba8::new(0, 0, 0, 0));
        let white = Rgba8::new(255, 255, 255, 255);
        resaturate(&mut res, &Rect::new(0, 0, 1, 1), white, 51);
        assert_eq!(res.get(0, 0), Rgba8::new(51, 51, 51, 51));
        assert_eq!(res.get(1, 0), Rgba8::TRANSPARENT);
    }
}
