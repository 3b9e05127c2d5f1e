//! Rect - Rectangular regions
//!
//! A `Rect` addresses a sub-window of a [`Field`](crate::Field). Coordinates
//! are unsigned since every rectangle produced by segmentation lies inside
//! a raster whose origin is `(0, 0)`.

use std::fmt;

/// A rectangle region
///
/// A simple Copy type; `right()` and `bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: u32,
    /// Top y coordinate
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle at the origin covering `w` x `h`
    pub const fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }

    /// Get the area
    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Check if the rectangle is empty (zero area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Check if a point is inside the rectangle
    #[inline]
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && (x as u64) < self.right() && y >= self.y && (y as u64) < self.bottom()
    }

    /// Check if this rectangle contains another rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if this rectangle overlaps with another
    pub fn overlaps(&self, other: &Rect) -> bool {
        (self.x as u64) < other.right()
            && self.right() > other.x as u64
            && (self.y as u64) < other.bottom()
            && self.bottom() > other.y as u64
    }

    /// Compute the intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if (x as u64) < right && (y as u64) < bottom {
            Some(Rect {
                x,
                y,
                w: (right - x as u64) as u32,
                h: (bottom - y as u64) as u32,
            })
        } else {
            None
        }
    }

    /// Compute the bounding rectangle of two rectangles
    pub fn bounding_union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect {
            x,
            y,
            w: (right - x as u64) as u32,
            h: (bottom - y as u64) as u32,
        }
    }

    /// Compute the union of two rectangles that share a full edge
    ///
    /// Returns `Some` only when the union is itself exactly a rectangle:
    /// the two rectangles have the same vertical extent and touch
    /// horizontally, or the same horizontal extent and touch vertically.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadseg_core::Rect;
    ///
    /// let left = Rect::new(0, 0, 2, 2);
    /// let right = Rect::new(2, 0, 2, 2);
    /// assert_eq!(left.adjacent_union(&right), Some(Rect::new(0, 0, 4, 2)));
    ///
    /// let diagonal = Rect::new(2, 2, 2, 2);
    /// assert_eq!(left.adjacent_union(&diagonal), None);
    /// ```
    pub fn adjacent_union(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let same_rows = self.y == other.y && self.h == other.h;
        let same_cols = self.x == other.x && self.w == other.w;
        let touches_x = self.right() == other.x as u64 || other.right() == self.x as u64;
        let touches_y = self.bottom() == other.y as u64 || other.bottom() == self.y as u64;

        if (same_rows && touches_x) || (same_cols && touches_y) {
            Some(self.bounding_union(other))
        } else {
            None
        }
    }

    /// Split into four quadrants ordered top-left, top-right, bottom-left,
    /// bottom-right
    ///
    /// Uses floor division: the left and top quadrants get `w / 2` and
    /// `h / 2`, the right and bottom quadrants get the remainder. Quadrants
    /// are empty when a side is shorter than 2.
    pub fn quadrants(&self) -> [Rect; 4] {
        let lw = self.w / 2;
        let rw = self.w - lw;
        let th = self.h / 2;
        let bh = self.h - th;
        let mx = self.x + lw;
        let my = self.y + th;

        [
            Rect::new(self.x, self.y, lw, th),
            Rect::new(mx, self.y, rw, th),
            Rect::new(self.x, my, lw, bh),
            Rect::new(mx, my, rw, bh),
        ]
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(3, 4, 10, 20);
        assert_eq!(r.right(), 13);
        assert_eq!(r.bottom(), 24);
        assert_eq!(r.area(), 200);
        assert!(!r.is_empty());
        assert!(Rect::new(0, 0, 0, 5).is_empty());
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(0, 0, 4, 4);
        assert!(r.contains_point(3, 3));
        assert!(!r.contains_point(4, 0));
        assert!(r.contains_rect(&Rect::new(1, 1, 3, 3)));
        assert!(!r.contains_rect(&Rect::new(1, 1, 4, 3)));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersect(&b), Some(Rect::new(2, 2, 2, 2)));

        // Touching edges do not overlap
        let c = Rect::new(4, 0, 2, 2);
        assert!(!a.overlaps(&c));
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_adjacent_union() {
        let tl = Rect::new(0, 0, 2, 2);
        let tr = Rect::new(2, 0, 2, 2);
        let bl = Rect::new(0, 2, 2, 2);
        let br = Rect::new(2, 2, 2, 2);

        assert_eq!(tl.adjacent_union(&tr), Some(Rect::new(0, 0, 4, 2)));
        assert_eq!(tr.adjacent_union(&tl), Some(Rect::new(0, 0, 4, 2)));
        assert_eq!(tl.adjacent_union(&bl), Some(Rect::new(0, 0, 2, 4)));
        assert_eq!(tl.adjacent_union(&br), None);

        // Top half against a bottom quadrant: bounding box would overshoot
        let top = Rect::new(0, 0, 4, 2);
        assert_eq!(top.adjacent_union(&bl), None);

        // Same extent but a gap between them
        assert_eq!(tl.adjacent_union(&Rect::new(3, 0, 2, 2)), None);
    }

    #[test]
    fn test_quadrants_even() {
        let q = Rect::new(4, 8, 4, 6).quadrants();
        assert_eq!(q[0], Rect::new(4, 8, 2, 3));
        assert_eq!(q[1], Rect::new(6, 8, 2, 3));
        assert_eq!(q[2], Rect::new(4, 11, 2, 3));
        assert_eq!(q[3], Rect::new(6, 11, 2, 3));
    }

    #[test]
    fn test_quadrants_odd() {
        let q = Rect::new(0, 0, 5, 3).quadrants();
        assert_eq!(q[0], Rect::new(0, 0, 2, 1));
        assert_eq!(q[1], Rect::new(2, 0, 3, 1));
        assert_eq!(q[2], Rect::new(0, 1, 2, 2));
        assert_eq!(q[3], Rect::new(2, 1, 3, 2));
        let total: u64 = q.iter().map(|r| r.area()).sum();
        assert_eq!(total, 15);
    }

    #[test]
    fn test_rect_display() {
        assert_eq!(Rect::new(1, 2, 3, 4).to_string(), "(1, 2, 3, 4)");
    }
}
