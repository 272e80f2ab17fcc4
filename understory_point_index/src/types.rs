// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry primitives: D-dimensional bounds and the 2D grid-coordinate box.
//!
//! Volumes are never computed as products. Every "hypervolume" here is the sum of
//! `log10` of the edge lengths, a monotone proxy that stays finite for large `D`.
//! An edge of length zero contributes `-inf`, so a box that is flat along some
//! axis compares below every box that is not. Values are only ever compared with
//! each other, never interpreted as absolute volumes.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::grid::GridCoord;
use crate::math;

/// Axis-aligned hyper-rectangle over `D` real-valued axes.
///
/// `origin[i] <= end[i]` holds on every axis once the bounds enclose anything.
/// [`Bounds::empty`] is deliberately inverted so that the first expansion snaps
/// to the added geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    origin: Vec<f64>,
    end: Vec<f64>,
}

impl Bounds {
    /// Inverted bounds that enclose nothing.
    pub fn empty(dims: usize) -> Self {
        Self {
            origin: vec![f64::INFINITY; dims],
            end: vec![f64::NEG_INFINITY; dims],
        }
    }

    /// Degenerate bounds around a single point.
    pub fn from_point(point: &[f64]) -> Self {
        Self {
            origin: point.to_vec(),
            end: point.to_vec(),
        }
    }

    /// Number of axes.
    pub fn dims(&self) -> usize {
        self.origin.len()
    }

    /// Per-axis lower bound.
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Per-axis upper bound.
    pub fn end(&self) -> &[f64] {
        &self.end
    }

    /// Whether the bounds are inverted on any axis (enclose nothing).
    pub fn is_empty(&self) -> bool {
        self.origin.iter().zip(&self.end).any(|(o, e)| e < o)
    }

    /// Log-sum hypervolume of the box.
    ///
    /// `NaN` for empty bounds.
    pub fn hypervolume(&self) -> f64 {
        self.origin
            .iter()
            .zip(&self.end)
            .map(|(&o, &e)| math::log10(e - o))
            .sum()
    }

    /// Log-sum hypervolume of the smallest expansion of this box that includes `point`.
    pub fn hypervolume_to_point(&self, point: &[f64]) -> f64 {
        debug_assert_eq!(point.len(), self.dims(), "point dimension mismatch");
        self.origin
            .iter()
            .zip(&self.end)
            .zip(point)
            .map(|((&o, &e), &p)| {
                let edge = if o > p {
                    e - p
                } else if e < p {
                    p - o
                } else {
                    e - o
                };
                math::log10(edge)
            })
            .sum()
    }

    /// Doubled log-sum hypervolume of the union of this box and `other`.
    ///
    /// The factor of two is part of the metric; only relative order matters.
    pub fn hypervolume_to_box(&self, other: &Self) -> f64 {
        debug_assert_eq!(other.dims(), self.dims(), "box dimension mismatch");
        let sum: f64 = (0..self.dims())
            .map(|a| {
                let lo = self.origin[a].min(other.origin[a]);
                let hi = self.end[a].max(other.end[a]);
                math::log10(hi - lo)
            })
            .sum();
        2.0 * sum
    }

    /// Whether `point` lies inside or on the boundary on every axis.
    pub fn encloses_point(&self, point: &[f64]) -> bool {
        self.origin
            .iter()
            .zip(&self.end)
            .zip(point)
            .all(|((&o, &e), &p)| o <= p && p <= e)
    }

    /// Whether `other` lies entirely inside this box. Empty bounds are inside everything.
    pub fn encloses_box(&self, other: &Self) -> bool {
        other.is_empty()
            || (0..self.dims()).all(|a| {
                self.origin[a] <= other.origin[a] && other.end[a] <= self.end[a]
            })
    }

    /// Euclidean distance from `point` to the nearest face of the box; `0` inside.
    pub fn distance_to_box(&self, point: &[f64]) -> f64 {
        let sum: f64 = self
            .origin
            .iter()
            .zip(&self.end)
            .zip(point)
            .map(|((&o, &e), &p)| {
                if o > p {
                    (o - p) * (o - p)
                } else if e < p {
                    (p - e) * (p - e)
                } else {
                    0.0
                }
            })
            .sum();
        math::sqrt(sum)
    }

    /// Widen the box in place to include `point`.
    pub fn expand_to_point(&mut self, point: &[f64]) {
        for (a, &p) in point.iter().enumerate() {
            if self.origin[a] > p {
                self.origin[a] = p;
            }
            if self.end[a] < p {
                self.end[a] = p;
            }
        }
    }

    /// Widen the box in place to include `other`.
    pub fn expand_to_box(&mut self, other: &Self) {
        for a in 0..self.dims() {
            if self.origin[a] > other.origin[a] {
                self.origin[a] = other.origin[a];
            }
            if self.end[a] < other.end[a] {
                self.end[a] = other.end[a];
            }
        }
    }

    /// Collapse the box onto `point`.
    pub fn set_to_point(&mut self, point: &[f64]) {
        self.origin.clear();
        self.origin.extend_from_slice(point);
        self.end.clear();
        self.end.extend_from_slice(point);
    }

    /// Deterministic total order: per axis, origin then end, first difference wins.
    pub(crate) fn cmp_lexicographic(&self, other: &Self) -> Ordering {
        for a in 0..self.dims() {
            let ord = self.origin[a]
                .total_cmp(&other.origin[a])
                .then_with(|| self.end[a].total_cmp(&other.end[a]));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Log-distance spread between two points: sum of `log10(|a[i] - b[i]|)` over the
/// axes where they differ. Axes where they agree contribute nothing.
///
/// Used to pick leaf split seeds; it rewards spread along many axes rather than
/// measuring true distance.
pub(crate) fn log_spread(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .filter(|(p, q)| p != q)
        .map(|(&p, &q)| math::log10((p - q).abs()))
        .sum()
}

/// Axis-aligned box over integer grid coordinates, inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CoordBounds {
    /// Minimum x.
    pub min_x: usize,
    /// Minimum y.
    pub min_y: usize,
    /// Maximum x.
    pub max_x: usize,
    /// Maximum y.
    pub max_y: usize,
}

impl CoordBounds {
    /// Inverted box that contains no coordinate.
    pub const EMPTY: Self = Self {
        min_x: usize::MAX,
        min_y: usize::MAX,
        max_x: 0,
        max_y: 0,
    };

    /// Box around a single coordinate.
    pub const fn from_coord(coord: GridCoord) -> Self {
        Self {
            min_x: coord.x,
            min_y: coord.y,
            max_x: coord.x,
            max_y: coord.y,
        }
    }

    /// Whether the box contains no coordinate.
    pub const fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Whether `coord` lies inside the box.
    pub const fn contains(&self, coord: GridCoord) -> bool {
        self.min_x <= coord.x
            && coord.x <= self.max_x
            && self.min_y <= coord.y
            && coord.y <= self.max_y
    }

    /// Whether `other` lies entirely inside this box. Empty boxes are inside everything.
    pub const fn encloses(&self, other: &Self) -> bool {
        other.is_empty()
            || (self.min_x <= other.min_x
                && self.min_y <= other.min_y
                && other.max_x <= self.max_x
                && other.max_y <= self.max_y)
    }

    /// Widen the box in place to include `coord`.
    pub fn expand_to_coord(&mut self, coord: GridCoord) {
        self.min_x = self.min_x.min(coord.x);
        self.min_y = self.min_y.min(coord.y);
        self.max_x = self.max_x.max(coord.x);
        self.max_y = self.max_y.max(coord.y);
    }

    /// Widen the box in place to include `other`.
    pub fn expand_to_bounds(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds(origin: &[f64], end: &[f64]) -> Bounds {
        let mut b = Bounds::from_point(origin);
        b.expand_to_point(end);
        b
    }

    #[test]
    fn hypervolume_is_log_sum_of_edges() {
        let b = bounds(&[0.0, 0.0], &[10.0, 100.0]);
        assert_relative_eq!(b.hypervolume(), 3.0);
        let flat = Bounds::from_point(&[1.0, 2.0]);
        assert_eq!(flat.hypervolume(), f64::NEG_INFINITY);
    }

    #[test]
    fn hypervolume_to_point_widens_only_outside_axes() {
        let b = bounds(&[0.0, 0.0], &[10.0, 10.0]);
        assert_relative_eq!(b.hypervolume_to_point(&[5.0, 5.0]), 2.0);
        assert_relative_eq!(b.hypervolume_to_point(&[100.0, 5.0]), 3.0);
        assert_relative_eq!(b.hypervolume_to_point(&[-90.0, -90.0]), 4.0);
    }

    #[test]
    fn hypervolume_to_box_doubles_union_log_sum() {
        let a = bounds(&[0.0, 0.0], &[1.0, 1.0]);
        let b = bounds(&[9.0, 9.0], &[10.0, 10.0]);
        assert_relative_eq!(a.hypervolume_to_box(&b), 4.0);
        assert_relative_eq!(b.hypervolume_to_box(&a), 4.0);
    }

    #[test]
    fn encloses_point_is_inclusive() {
        let b = bounds(&[0.0, 0.0], &[1.0, 1.0]);
        assert!(b.encloses_point(&[0.0, 1.0]));
        assert!(b.encloses_point(&[0.5, 0.5]));
        assert!(!b.encloses_point(&[1.5, 0.5]));
        assert!(!Bounds::empty(2).encloses_point(&[0.0, 0.0]));
    }

    #[test]
    fn distance_to_box_measures_to_nearest_face() {
        let b = bounds(&[0.0, 0.0], &[1.0, 1.0]);
        assert_relative_eq!(b.distance_to_box(&[4.0, 5.0]), 5.0);
        assert_relative_eq!(b.distance_to_box(&[0.5, 3.0]), 2.0);
        assert_eq!(b.distance_to_box(&[0.25, 0.75]), 0.0);
    }

    #[test]
    fn empty_bounds_snap_to_first_expansion() {
        let mut b = Bounds::empty(3);
        assert!(b.is_empty());
        b.expand_to_point(&[1.0, 2.0, 3.0]);
        assert!(!b.is_empty());
        assert_eq!(b, Bounds::from_point(&[1.0, 2.0, 3.0]));
        b.expand_to_box(&bounds(&[-1.0, 2.0, 3.0], &[1.0, 4.0, 3.0]));
        assert_eq!(b.origin(), &[-1.0, 2.0, 3.0]);
        assert_eq!(b.end(), &[1.0, 4.0, 3.0]);
    }

    #[test]
    fn log_spread_skips_equal_axes() {
        assert_relative_eq!(log_spread(&[0.0, 0.0], &[10.0, 100.0]), 3.0);
        assert_relative_eq!(log_spread(&[5.0, 0.0], &[5.0, 100.0]), 2.0);
        assert_eq!(log_spread(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn lexicographic_order_compares_origin_then_end() {
        let a = bounds(&[0.0, 0.0], &[1.0, 1.0]);
        let b = bounds(&[0.0, 0.0], &[2.0, 1.0]);
        let c = bounds(&[0.0, -1.0], &[1.0, 1.0]);
        assert_eq!(a.cmp_lexicographic(&b), Ordering::Less);
        assert_eq!(b.cmp_lexicographic(&a), Ordering::Greater);
        assert_eq!(a.cmp_lexicographic(&c), Ordering::Greater);
        assert_eq!(a.cmp_lexicographic(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn coord_bounds_track_grid_box() {
        let mut c = CoordBounds::EMPTY;
        assert!(c.is_empty());
        assert!(!c.contains(GridCoord::new(0, 0)));
        c.expand_to_coord(GridCoord::new(3, 4));
        c.expand_to_coord(GridCoord::new(1, 7));
        assert!(c.contains(GridCoord::new(2, 5)));
        assert!(!c.contains(GridCoord::new(0, 5)));
        let mut d = CoordBounds::from_coord(GridCoord::new(9, 9));
        d.expand_to_bounds(&c);
        d.expand_to_bounds(&CoordBounds::EMPTY);
        assert!(d.encloses(&c));
        assert!(!c.encloses(&d));
        assert!(c.encloses(&CoordBounds::EMPTY));
        assert_eq!(
            d,
            CoordBounds {
                min_x: 1,
                min_y: 4,
                max_x: 9,
                max_y: 9
            }
        );
    }
}
