//! Pixel containers used by the engine
//!
//! `Grid<T>` is a plain row-major 2D buffer. It backs the layers the engine
//! paints on (`RgbaImage`, `GreyImage`) as well as the per-stroke scratch
//! and reservoir buffers.

use crate::core::errors::StrokeError;
use crate::core::geometry::Rect;

/// Straight-alpha 8-bit RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn with_rgb(self, rgb: [u8; 3]) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: self.a,
        }
    }
}

/// Intensity plus coverage, the greyscale counterpart of `Rgba8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct GreyAlpha8 {
    pub value: u8,
    pub alpha: u8,
}

impl GreyAlpha8 {
    pub const fn new(value: u8, alpha: u8) -> Self {
        Self { value, alpha }
    }
}

/// Row-major 2D pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

pub type RgbaImage = Grid<Rgba8>;
pub type GreyImage = Grid<u8>;

impl<T: Copy + Default> Grid<T> {
    /// Create a zeroed buffer
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap existing row-major pixel data
    pub fn from_pixels(width: usize, height: usize, data: Vec<T>) -> Result<Self, StrokeError> {
        if data.len() != width * height {
            return Err(StrokeError::SizeMismatch {
                expected: (width, height),
                actual: (data.len(), 1),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whole buffer as a rectangle in its own coordinate space
    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn offset_of_pixel(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn pixels(&self) -> &[T] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = y * self.width + x;
        self.data[idx] = value;
    }

    /// Pixel at signed coordinates, zero outside the buffer
    pub fn get_pixel(&self, x: i32, y: i32) -> T {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return T::default();
        }
        self.get(x as usize, y as usize)
    }

    /// Pixel at signed coordinates, clamped to the nearest edge
    pub fn get_pixel_clamped(&self, x: i32, y: i32) -> T {
        if self.data.is_empty() {
            return T::default();
        }
        let cx = x.clamp(0, self.width as i32 - 1) as usize;
        let cy = y.clamp(0, self.height as i32 - 1) as usize;
        self.get(cx, cy)
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy `rect` (already clipped to the buffer) from `src` into `self`
    pub fn copy_rect_from(&mut self, src: &Grid<T>, rect: &Rect) {
        for y in rect.top..rect.bottom {
            let start = src.offset_of_pixel(rect.left as usize, y as usize);
            let end = start + rect.width() as usize;
            self.data[start..end].copy_from_slice(&src.data[start..end]);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of_pixel() {
        let grid: GreyImage = Grid::new(7, 3);
        assert_eq!(grid.offset_of_pixel(0, 0), 0);
        assert_eq!(grid.offset_of_pixel(3, 2), 17);
        assert_eq!(grid.bounds(), Rect::new(0, 0, 7, 3));
    }

    #[test]
    fn test_get_pixel_outside_is_zero() {
        let grid = Grid::filled(2, 2, Rgba8::new(1, 2, 3, 4));
        assert_eq!(grid.get_pixel(-1, 0), Rgba8::TRANSPARENT);
        assert_eq!(grid.get_pixel(1, 2), Rgba8::TRANSPARENT);
        assert_eq!(grid.get_pixel(1, 1), Rgba8::new(1, 2, 3, 4));
    }

    #[test]
    fn test_get_pixel_clamped() {
        let grid = Grid::from_pixels(2, 2, vec![10u8, 20, 30, 40]).unwrap();
        assert_eq!(grid.get_pixel_clamped(-5, -5), 10);
        assert_eq!(grid.get_pixel_clamped(9, 0), 20);
        assert_eq!(grid.get_pixel_clamped(9, 9), 40);
    }

    #[test]
    fn test_from_pixels_rejects_bad_length() {
        assert!(Grid::from_pixels(3, 3, vec![0u8; 8]).is_err());
    }

    #[test]
    fn test_copy_rect_from() {
        let src = Grid::from_pixels(3, 2, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        let mut dst: GreyImage = Grid::new(3, 2);
        dst.copy_rect_from(&src, &Rect::new(1, 0, 3, 2));
        assert_eq!(dst.pixels(), &[0, 2, 3, 0, 5, 6]);
    }
}
