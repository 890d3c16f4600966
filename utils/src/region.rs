// Region tracking helpers
//
// Austin Shafer - 2020

use serde::{Deserialize, Serialize};

use std::cmp::PartialOrd;
use std::ops::{Add, Sub};

/// A rectangular region
///
/// This can be used to track input regions,
/// damage boxes, etc. It is determinined by
/// the corders of a rectangle:
///   r_start: the upper left corner's position on the desktop
///   r_size:  the distance from the left to the lower right
#[derive(Debug, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Rect<T: PartialOrd + Copy + Add + Add<Output = T>> {
    pub r_pos: (T, T),
    pub r_size: (T, T),
}

impl<T: PartialOrd + Copy + Add + Add<Output = T>> Rect<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Rect<T> {
        Rect {
            r_pos: (x, y),
            r_size: (width, height),
        }
    }

    /// Checks if the point (x,y) is strictly inside this
    /// Rectangle, edges excluded.
    pub fn intersects(&self, x: T, y: T) -> bool {
        x > self.r_pos.0
            && y > self.r_pos.1
            && x < self.r_pos.0 + self.r_size.0
            && y < self.r_pos.1 + self.r_size.1
    }

    /// Half-open containment test: the top and left edges are
    /// inside, the bottom and right edges are not.
    pub fn contains(&self, x: T, y: T) -> bool {
        x >= self.r_pos.0
            && y >= self.r_pos.1
            && x < self.r_pos.0 + self.r_size.0
            && y < self.r_pos.1 + self.r_size.1
    }

    pub fn left(&self) -> T {
        self.r_pos.0
    }

    pub fn top(&self) -> T {
        self.r_pos.1
    }

    pub fn right(&self) -> T {
        self.r_pos.0 + self.r_size.0
    }

    pub fn bottom(&self) -> T {
        self.r_pos.1 + self.r_size.1
    }

    pub fn width(&self) -> T {
        self.r_size.0
    }

    pub fn height(&self) -> T {
        self.r_size.1
    }

    /// Move this rect by (dx, dy)
    pub fn translated(&self, dx: T, dy: T) -> Rect<T> {
        Rect::new(self.r_pos.0 + dx, self.r_pos.1 + dy, self.r_size.0, self.r_size.1)
    }
}

impl<T: PartialOrd + Copy + Default + Add<Output = T> + Sub<Output = T>> Rect<T> {
    /// Is either dimension zero or negative
    pub fn is_empty(&self) -> bool {
        !(self.r_size.0 > T::default() && self.r_size.1 > T::default())
    }

    /// Do these two rects share any area
    pub fn overlaps(&self, other: &Rect<T>) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Grow this rect by `margin` on every side
    pub fn expanded(&self, margin: T) -> Rect<T> {
        Rect::new(
            self.r_pos.0 - margin,
            self.r_pos.1 - margin,
            self.r_size.0 + margin + margin,
            self.r_size.1 + margin + margin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10, 10, 20, 20);
        assert!(r.contains(10, 10));
        assert!(r.contains(29, 29));
        assert!(!r.contains(30, 10));
        assert!(!r.intersects(10, 10));
    }

    #[test]
    fn overlaps_and_expand() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(a.expanded(1).overlaps(&b));
        assert_eq!(a.expanded(5), Rect::new(-5, -5, 20, 20));
        assert!(!Rect::new(0, 0, 0, 10).overlaps(&a));
    }
}
