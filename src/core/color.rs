//! Floating-point brush color

use serde::{Deserialize, Serialize};

use crate::core::raster::Rgba8;

/// RGBA color with components in 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl ColorF {
    pub const BLACK: ColorF = ColorF::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: ColorF = ColorF::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque grey from an 8-bit intensity
    pub fn grey(value: u8) -> Self {
        let v = value as f32 / 255.0;
        Self::new(v, v, v, 1.0)
    }

    pub fn from_rgba8(p: Rgba8) -> Self {
        Self::new(
            p.r as f32 / 255.0,
            p.g as f32 / 255.0,
            p.b as f32 / 255.0,
            p.a as f32 / 255.0,
        )
    }

    pub fn to_rgba8(&self) -> Rgba8 {
        Rgba8::new(to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a))
    }

    /// Luma of the color as an 8-bit intensity
    pub fn to_grey8(&self) -> u8 {
        to_u8(0.299 * self.r + 0.587 * self.g + 0.114 * self.b)
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`, `t = 1` yields `other`
    pub fn mix(&self, other: &ColorF, t: f32) -> ColorF {
        ColorF::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Component-wise mean, `None` for an empty input
    pub fn average<'a>(colors: impl IntoIterator<Item = &'a ColorF>) -> Option<ColorF> {
        let mut sum = ColorF::new(0.0, 0.0, 0.0, 0.0);
        let mut count = 0usize;
        for c in colors {
            sum.r += c.r;
            sum.g += c.g;
            sum.b += c.b;
            sum.a += c.a;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f32;
        Some(ColorF::new(sum.r / n, sum.g / n, sum.b / n, sum.a / n))
    }
}
