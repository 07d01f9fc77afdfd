//! Planar river geometry.
//!
//! A [`RiverLine`] is an ordered polyline tagged with the network category it
//! belongs to. Lines are immutable once read; the only checks performed here
//! are the ones needed to refuse degenerate input, repair is left to
//! [`crate::clean`].

use serde::Serialize;

use crate::error::{Error, Result};

/// Planar point in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Ordered polyline belonging to one river network category.
#[derive(Debug, Clone, PartialEq)]
pub struct RiverLine {
    pub category: u32,
    pub vertices: Vec<Point>,
}

impl RiverLine {
    pub fn new(category: u32, vertices: Vec<Point>) -> Self {
        Self { category, vertices }
    }

    /// Total planar length of the polyline.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Copy of the line digitized in the opposite direction.
    pub fn reversed(&self) -> RiverLine {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        RiverLine {
            category: self.category,
            vertices,
        }
    }

    /// Points at every multiple of `step` along the line, starting at the first
    /// vertex; `count` points are produced.
    pub fn points_every(&self, step: f64, count: usize) -> Vec<Point> {
        let mut points = Vec::with_capacity(count);
        let mut segment = 0usize;
        let mut segment_start = 0.0;

        for k in 0..count {
            let target = k as f64 * step;
            while segment + 2 < self.vertices.len() {
                let length = self.vertices[segment].distance(&self.vertices[segment + 1]);
                if segment_start + length >= target {
                    break;
                }
                segment_start += length;
                segment += 1;
            }

            let a = self.vertices[segment];
            let b = self.vertices[segment + 1];
            let length = a.distance(&b);
            let t = if length > 0.0 {
                ((target - segment_start) / length).clamp(0.0, 1.0)
            } else {
                0.0
            };
            points.push(a.lerp(&b, t));
        }

        points
    }

    /// Reject degenerate or self-intersecting polylines.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() < 2 {
            return Err(self.invalid("fewer than two vertices"));
        }
        if self
            .vertices
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(self.invalid("non-finite coordinate"));
        }
        if self.length() <= 0.0 {
            return Err(self.invalid("zero length"));
        }
        if let Some((i, j)) = self.self_intersection() {
            return Err(self.invalid(&format!(
                "self-intersection between segments {i} and {j}"
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidGeometry {
            category: self.category,
            reason: reason.to_string(),
        }
    }

    /// First pair of segment indices that intersect outside their shared
    /// vertex, if any. Zero-length segments are ignored.
    fn self_intersection(&self) -> Option<(usize, usize)> {
        let segments: Vec<(usize, Point, Point)> = self
            .vertices
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(index, pair)| (index, pair[0], pair[1]))
            .collect();

        for (position, &(i, a1, a2)) in segments.iter().enumerate() {
            for (offset, &(j, b1, b2)) in segments[position + 1..].iter().enumerate() {
                if !bounding_boxes_touch(a1, a2, b1, b2) {
                    continue;
                }
                if offset == 0 {
                    if folds_back(a1, a2, b2) {
                        return Some((i, j));
                    }
                } else if segments_intersect(a1, a2, b1, b2) {
                    return Some((i, j));
                }
            }
        }

        None
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn bounding_boxes_touch(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    a1.x.min(a2.x) <= b1.x.max(b2.x)
        && b1.x.min(b2.x) <= a1.x.max(a2.x)
        && a1.y.min(a2.y) <= b1.y.max(b2.y)
        && b1.y.min(b2.y) <= a1.y.max(a2.y)
}

/// Closed-segment intersection test, touching endpoints included.
fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Consecutive segments `a -> pivot -> c` that double back along themselves.
fn folds_back(a: Point, pivot: Point, c: Point) -> bool {
    if orientation(a, pivot, c) != 0.0 {
        return false;
    }
    let dot = (a.x - pivot.x) * (c.x - pivot.x) + (a.y - pivot.y) * (c.y - pivot.y);
    dot > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> RiverLine {
        RiverLine::new(1, points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn length_sums_segments() {
        let river = line(&[(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
        assert!((river.length() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn points_every_walks_across_vertices() {
        let river = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let points = river.points_every(5.0, 5);
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn points_every_skips_duplicate_vertices() {
        let river = line(&[(0.0, 0.0), (2.0, 0.0), (2.0, 0.0), (4.0, 0.0)]);
        let points = river.points_every(1.0, 5);
        assert_eq!(points[3], Point::new(3.0, 0.0));
        assert_eq!(points[4], Point::new(4.0, 0.0));
    }

    #[test]
    fn accepts_simple_polyline() {
        line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)])
            .validate()
            .expect("simple zig-zag is valid");
    }

    #[test]
    fn rejects_crossing_polyline() {
        let err = line(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)])
            .validate()
            .expect_err("bow tie crosses itself");
        assert!(matches!(err, Error::InvalidGeometry { category: 1, .. }));
    }

    #[test]
    fn rejects_closed_ring_and_fold_back() {
        assert!(line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])
            .validate()
            .is_err());
        assert!(line(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)])
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_degenerate_lines() {
        assert!(line(&[(0.0, 0.0)]).validate().is_err());
        assert!(line(&[(1.0, 1.0), (1.0, 1.0)]).validate().is_err());
        assert!(line(&[(0.0, 0.0), (f64::NAN, 1.0)]).validate().is_err());
    }
}
