use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Four-corner polygon hypothesized to bound a 3x3 sticker grid.
///
/// Corners are kept in canonical order: top-left, top-right, bottom-right,
/// bottom-left, in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f32>; 4],
}

impl Quad {
    /// Build a quad from corners in arbitrary order.
    ///
    /// Canonicalization: top-left has minimal x+y, bottom-right maximal x+y;
    /// the remaining two are split by x-y (top-right maximal).
    pub fn from_unordered(pts: [Point2<f32>; 4]) -> Self {
        let sum = |p: &Point2<f32>| p.x + p.y;
        let diff = |p: &Point2<f32>| p.x - p.y;

        let mut tl = pts[0];
        let mut br = pts[0];
        for p in &pts[1..] {
            if sum(p) < sum(&tl) {
                tl = *p;
            }
            if sum(p) > sum(&br) {
                br = *p;
            }
        }

        let mut rest: Vec<Point2<f32>> = pts
            .iter()
            .filter(|p| **p != tl && **p != br)
            .copied()
            .collect();
        // Degenerate duplicates: pad from the original list to keep 4 corners.
        while rest.len() < 2 {
            rest.push(pts[rest.len()]);
        }
        let (tr, bl) = if diff(&rest[0]) >= diff(&rest[1]) {
            (rest[0], rest[1])
        } else {
            (rest[1], rest[0])
        };

        Self {
            corners: [tl, tr, br, bl],
        }
    }

    /// Signed shoelace area; canonical corner order yields a positive value.
    pub fn area(&self) -> f32 {
        let c = &self.corners;
        let mut acc = 0.0;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    /// True when all cross products of consecutive edges share a sign.
    pub fn is_convex(&self) -> bool {
        let c = &self.corners;
        let mut sign = 0.0f32;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            let d = c[(i + 2) % 4];
            let cross = (b.x - a.x) * (d.y - b.y) - (b.y - a.y) * (d.x - b.x);
            if cross.abs() < f32::EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        sign != 0.0
    }

    fn side_lengths(&self) -> [f32; 4] {
        let c = &self.corners;
        let mut out = [0.0f32; 4];
        for i in 0..4 {
            out[i] = (c[(i + 1) % 4] - c[i]).norm();
        }
        out
    }

    /// Shortest side divided by longest side, in 0..=1.
    pub fn side_ratio(&self) -> f32 {
        let sides = self.side_lengths();
        let min = sides.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = sides.iter().cloned().fold(0.0f32, f32::max);
        if max <= 0.0 {
            return 0.0;
        }
        min / max
    }

    /// Convex, non-degenerate, and square-ish within `min_side_ratio`.
    pub fn is_roughly_square(&self, min_side_ratio: f32) -> bool {
        self.area() > f32::EPSILON && self.is_convex() && self.side_ratio() >= min_side_ratio
    }

    pub fn centroid(&self) -> Point2<f32> {
        let c = &self.corners;
        Point2::new(
            (c[0].x + c[1].x + c[2].x + c[3].x) / 4.0,
            (c[0].y + c[1].y + c[2].y + c[3].y) / 4.0,
        )
    }

    /// Scale all corners about the origin (downscaled -> full-resolution).
    pub fn scale(&self, factor: f32) -> Quad {
        Quad {
            corners: self.corners.map(|p| Point2::new(p.x * factor, p.y * factor)),
        }
    }

    /// Largest single-corner displacement against another quad, in pixels.
    pub fn max_corner_shift(&self, other: &Quad) -> f32 {
        self.corners
            .iter()
            .zip(other.corners.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> [Point2<f32>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn ordering_is_canonical_for_any_permutation() {
        let pts = square(10.0);
        let shuffled = [pts[2], pts[0], pts[3], pts[1]];
        let q = Quad::from_unordered(shuffled);
        assert_eq!(q.corners[0], Point2::new(0.0, 0.0)); // TL
        assert_eq!(q.corners[1], Point2::new(10.0, 0.0)); // TR
        assert_eq!(q.corners[2], Point2::new(10.0, 10.0)); // BR
        assert_eq!(q.corners[3], Point2::new(0.0, 10.0)); // BL
    }

    #[test]
    fn canonical_order_has_positive_area() {
        let q = Quad::from_unordered(square(6.0));
        assert!(q.area() > 0.0);
        assert!(q.is_convex());
    }

    #[test]
    fn side_ratio_flags_elongated_quads() {
        let q = Quad::from_unordered([
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 0.0),
            Point2::new(40.0, 10.0),
            Point2::new(0.0, 10.0),
        ]);
        assert!(q.side_ratio() < 0.45);
        assert!(!q.is_roughly_square(0.45));
        assert!(Quad::from_unordered(square(10.0)).is_roughly_square(0.7));
    }

    #[test]
    fn corner_shift_tracks_largest_displacement() {
        let a = Quad::from_unordered(square(10.0));
        let mut moved = a.corners;
        moved[2] = Point2::new(13.0, 14.0);
        let b = Quad { corners: moved };
        assert!((a.max_corner_shift(&b) - 5.0).abs() < 1e-4);
    }
}
