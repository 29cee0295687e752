//! Geometric primitives for page classification.
//!
//! Coordinates follow the extraction convention: the origin is the top-left
//! corner of the page and `y` grows downwards. All values are in page units.

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle stored as two corners.
///
/// Invariant: `x0 <= x1` and `y0 <= y1`. Zero-width or zero-height
/// rectangles are valid; they simply have no area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from two corners.
    ///
    /// Corners are normalised so the invariant `x0 <= x1, y0 <= y1` holds
    /// whatever order they are given in.
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(110.0, 70.0, 10.0, 20.0);
    /// assert_eq!(rect.x0, 10.0);
    /// assert_eq!(rect.y0, 20.0);
    /// assert_eq!(rect.width(), 100.0);
    /// assert_eq!(rect.height(), 50.0);
    /// ```
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a rectangle from its top-left corner and dimensions.
    pub fn from_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.area(), 5000.0);
    /// ```
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// Ratio of width to height, `None` for zero-height rectangles.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height() > 0.0 {
            Some(self.width() / self.height())
        } else {
            None
        }
    }

    /// Whether the rectangle has no area.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Check if `other` lies entirely inside this rectangle (edges inclusive).
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::geometry::Rect;
    ///
    /// let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// assert!(outer.contains(&Rect::new(10.0, 10.0, 20.0, 20.0)));
    /// assert!(outer.contains(&outer));
    /// assert!(!outer.contains(&Rect::new(90.0, 90.0, 110.0, 110.0)));
    /// ```
    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }

    /// Like [`Rect::contains`] but allows `other` to poke out by `tolerance`.
    pub fn contains_with_tolerance(&self, other: &Rect, tolerance: f64) -> bool {
        self.expand(tolerance).contains(other)
    }

    /// Check if the interiors of the two rectangles overlap.
    ///
    /// Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }

    /// The overlapping region of the two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    /// Area of the overlapping region, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Intersection over union.
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect::new(5.0, 5.0, 15.0, 15.0);
    /// assert_eq!(a.iou(&b), 25.0 / 175.0);
    /// ```
    pub fn iou(&self, other: &Rect) -> f64 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }

    /// The smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union of every rectangle in the iterator, `None` when it is empty.
    pub fn union_all<'a, I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(u) => Some(u.union(r)),
        })
    }

    /// Grow (or with a negative amount, shrink) every edge by `amount`.
    ///
    /// Shrinking never inverts the rectangle; it collapses to its center.
    pub fn expand(&self, amount: f64) -> Rect {
        let c = self.center();
        Rect {
            x0: (self.x0 - amount).min(c.x),
            y0: (self.y0 - amount).min(c.y),
            x1: (self.x1 + amount).max(c.x),
            y1: (self.y1 + amount).max(c.y),
        }
    }

    /// Clip this rectangle to `bounds`, `None` when nothing remains.
    pub fn clip_to(&self, bounds: &Rect) -> Option<Rect> {
        let clipped = Rect {
            x0: self.x0.max(bounds.x0),
            y0: self.y0.max(bounds.y0),
            x1: self.x1.min(bounds.x1),
            y1: self.y1.min(bounds.y1),
        };
        if clipped.x0 > clipped.x1 || clipped.y0 > clipped.y1 {
            None
        } else {
            Some(clipped)
        }
    }

    /// Shortest distance between the two rectangles, zero when they touch.
    ///
    /// # Examples
    ///
    /// ```
    /// use instruction_oxide::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect::new(13.0, 14.0, 20.0, 20.0);
    /// assert_eq!(a.distance_to(&b), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Rect) -> f64 {
        let dx = (other.x0 - self.x1).max(self.x0 - other.x1).max(0.0);
        let dy = (other.y0 - self.y1).max(self.y0 - other.y1).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Horizontal overlap length with another rectangle.
    pub fn horizontal_overlap(&self, other: &Rect) -> f64 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }

    /// Check whether the straight segment `a`–`b` passes through this rectangle.
    pub fn intersects_segment(&self, a: &Point, b: &Point) -> bool {
        // Liang-Barsky clipping.
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        let checks = [
            (-dx, a.x - self.x0),
            (dx, self.x1 - a.x),
            (-dy, a.y - self.y0),
            (dy, self.y1 - a.y),
        ];
        for (p, q) in checks {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return false;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return false;
                }
                t1 = t1.min(t);
            }
        }
        t0 <= t1
    }
}

/// Compute the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use instruction_oxide::geometry::{Point, euclidean_distance};
///
/// let p1 = Point::new(0.0, 0.0);
/// let p2 = Point::new(3.0, 4.0);
///
/// assert_eq!(euclidean_distance(&p1, &p2), 5.0);
/// ```
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f64 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalises_corners() {
        let r = Rect::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(r, Rect::new(0.0, 5.0, 10.0, 20.0));
        assert_eq!(r.width(), 10.0);
        assert_eq!(r.height(), 15.0);
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::from_size(0.0, 0.0, 100.0, 50.0);
        let center = r.center();
        assert_eq!(center.x, 50.0);
        assert_eq!(center.y, 25.0);
    }

    #[test]
    fn test_degenerate_rect_has_no_area() {
        let line = Rect::new(0.0, 10.0, 100.0, 10.0);
        assert!(line.is_degenerate());
        assert_eq!(line.area(), 0.0);
        assert_eq!(line.aspect_ratio(), None);
        assert_eq!(line.iou(&line), 0.0);
    }

    #[test]
    fn test_rect_intersects_excludes_shared_edges() {
        let r1 = Rect::new(0.0, 0.0, 10.0, 10.0);
        let r2 = Rect::new(10.0, 0.0, 20.0, 10.0);
        let r3 = Rect::new(5.0, 5.0, 15.0, 15.0);
        assert!(!r1.intersects(&r2));
        assert!(r1.intersects(&r3));
        assert_eq!(r1.intersection(&r3), Some(Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(r1.intersection(&r2), None);
    }

    #[test]
    fn test_union_all() {
        let rects = [
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(5.0, -2.0, 6.0, 3.0),
        ];
        assert_eq!(Rect::union_all(&rects), Some(Rect::new(0.0, -2.0, 6.0, 3.0)));
        assert_eq!(Rect::union_all(&[]), None);
    }

    #[test]
    fn test_expand_and_shrink() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(r.expand(2.0), Rect::new(8.0, 8.0, 22.0, 22.0));
        assert_eq!(r.expand(-10.0), Rect::new(15.0, 15.0, 15.0, 15.0));
    }

    #[test]
    fn test_clip_to() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(90.0, -10.0, 120.0, 10.0);
        assert_eq!(r.clip_to(&page), Some(Rect::new(90.0, 0.0, 100.0, 10.0)));
        assert_eq!(Rect::new(200.0, 200.0, 210.0, 210.0).clip_to(&page), None);
    }

    #[test]
    fn test_distance_to_overlapping_is_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.distance_to(&b), 0.0);
        let c = Rect::new(0.0, 20.0, 10.0, 30.0);
        assert_eq!(a.distance_to(&c), 10.0);
    }

    #[test]
    fn test_segment_crossing() {
        let divider = Rect::new(50.0, 0.0, 51.0, 100.0);
        let left = Point::new(10.0, 50.0);
        let right = Point::new(90.0, 50.0);
        let below = Point::new(10.0, 90.0);
        assert!(divider.intersects_segment(&left, &right));
        assert!(!divider.intersects_segment(&left, &below));
        // Degenerate (zero-width) rectangle still blocks a crossing segment.
        let line = Rect::new(50.0, 0.0, 50.0, 100.0);
        assert!(line.intersects_segment(&left, &right));
    }

    #[test]
    fn test_euclidean_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(euclidean_distance(&p1, &p2), 5.0);
    }
}
