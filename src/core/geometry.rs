//! Integer rectangles for dab placement and stroked-region tracking

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with exclusive right/bottom edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle at `(x, y)` with the given size
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// The neutral element for `union`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Grow to cover `other`. Empty rectangles never contribute.
    pub fn union(&mut self, other: &Rect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() {
            Rect::empty()
        } else {
            r
        }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// True when `other` lies fully inside `self`. Empty rects are contained everywhere.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.left >= self.left
                && other.top >= self.top
                && other.right <= self.right
                && other.bottom <= self.bottom)
    }

    pub fn same_size(&self, other: &Rect) -> bool {
        self.width() == other.width() && self.height() == other.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_grows_to_cover() {
        let mut region = Rect::empty();
        region.union(&Rect::new(10, 10, 20, 20));
        assert_eq!(region, Rect::new(10, 10, 20, 20));

        region.union(&Rect::new(5, 15, 12, 30));
        assert_eq!(region, Rect::new(5, 10, 20, 30));
        assert_eq!(region.width(), 15);
        assert_eq!(region.height(), 20);
    }

    #[test]
    fn test_union_ignores_empty() {
        let mut region = Rect::new(0, 0, 4, 4);
        region.union(&Rect::new(100, 100, 100, 120));
        assert_eq!(region, Rect::new(0, 0, 4, 4));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(&Rect::new(5, 5, 20, 20)), Rect::new(5, 5, 10, 10));
        assert!(a.intersect(&Rect::new(10, 0, 20, 10)).is_empty());
    }

    #[test]
    fn test_contains_rect() {
        let bounds = Rect::from_xywh(0, 0, 8, 8);
        assert!(bounds.contains_rect(&Rect::new(0, 0, 8, 8)));
        assert!(!bounds.contains_rect(&Rect::new(-1, 0, 8, 8)));
        assert!(bounds.contains_rect(&Rect::empty()));
    }
}
