// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Best-first traversal: nearest-neighbour queries and the order removal visits boxes in.
//!
//! Both searches keep a [`BinaryHeap`] of entity handles and always expand the most
//! promising one next. Nearest-neighbour search orders by distance from the query
//! to each box. Removal has no distance to go by, so it orders boxes by a fixed
//! lexicographic comparison of their bounds, which keeps the visit order
//! deterministic for a given tree.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::{Ordering, Reverse};

use ordered_float::OrderedFloat;

use crate::entity::{Arena, EntityId, EntityKind};
use crate::grid::{GridCoord, PointGrid};
use crate::index::SpatialIndex;
use crate::math;
use crate::types::Bounds;

/// A stored point and its Euclidean distance to a query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbour {
    /// Grid cell holding the point.
    pub coord: GridCoord,
    /// Euclidean distance from the query vector to the cell's vector.
    pub distance: f64,
}

/// Queue entry for nearest-neighbour search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct NearestEntry {
    distance: OrderedFloat<f64>,
    id: EntityId,
}

impl NearestEntry {
    fn new<G: PointGrid + ?Sized>(arena: &Arena<'_, G>, id: EntityId, point: &[f64]) -> Self {
        Self {
            distance: OrderedFloat(arena.get(id).bounds.distance_to_box(point)),
            id,
        }
    }
}

/// Queue entry for removal: boxes ordered by their bounds, then by handle so that
/// no two distinct entries compare equal.
#[derive(Copy, Clone, Debug)]
struct RemovalEntry<'a> {
    bounds: &'a Bounds,
    id: EntityId,
}

impl PartialEq for RemovalEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RemovalEntry<'_> {}

impl PartialOrd for RemovalEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RemovalEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bounds
            .cmp_lexicographic(other.bounds)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Result-set entry for k-nearest search; the max-heap keeps the current worst on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    distance: OrderedFloat<f64>,
    coord: GridCoord,
}

/// Euclidean distance between two vectors of equal dimension.
pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    let sum: f64 = a.iter().zip(b).map(|(p, q)| (p - q) * (p - q)).sum();
    math::sqrt(sum)
}

impl<G: PointGrid + ?Sized> SpatialIndex<'_, G> {
    /// Grid coordinate of the stored point closest to `point`, or `None` for an empty index.
    ///
    /// Of several points at the same distance, the first one found is kept.
    ///
    /// # Panics
    ///
    /// Panics if `point` does not have the grid's dimension.
    pub fn find_nearest_neighbour(&self, point: &[f64]) -> Option<GridCoord> {
        self.nearest(point).map(|n| n.coord)
    }

    /// Like [`find_nearest_neighbour`](Self::find_nearest_neighbour), also reporting the distance.
    ///
    /// # Panics
    ///
    /// Panics if `point` does not have the grid's dimension.
    pub fn nearest(&self, point: &[f64]) -> Option<Neighbour> {
        self.check_query(point);
        let arena = &self.arena;
        let mut queue: BinaryHeap<_> = arena
            .children(self.root)
            .iter()
            .map(|&child| Reverse(NearestEntry::new(arena, child, point)))
            .collect();

        let mut best: Option<Neighbour> = None;
        while let Some(Reverse(entry)) = queue.pop() {
            // The queue is ascending, so nothing after this entry can be closer.
            if best.is_some_and(|b| entry.distance.0 > b.distance) {
                break;
            }
            match &arena.get(entry.id).kind {
                EntityKind::Leaf(items) => {
                    for &coord in items {
                        let distance = euclidean(arena.point(coord), point);
                        if best.is_none_or(|b| distance < b.distance) {
                            best = Some(Neighbour { coord, distance });
                        }
                    }
                }
                EntityKind::Node(children) => {
                    queue.extend(
                        children
                            .iter()
                            .map(|&child| Reverse(NearestEntry::new(arena, child, point))),
                    );
                }
            }
        }
        best
    }

    /// The `k` stored points closest to `point`, nearest first.
    ///
    /// Equal distances are ordered by grid coordinate. Returns fewer than `k`
    /// results when the index holds fewer points.
    ///
    /// # Panics
    ///
    /// Panics if `point` does not have the grid's dimension.
    pub fn nearest_k(&self, point: &[f64], k: usize) -> Vec<Neighbour> {
        self.check_query(point);
        if k == 0 {
            return Vec::new();
        }
        let arena = &self.arena;
        let mut queue: BinaryHeap<_> = arena
            .children(self.root)
            .iter()
            .map(|&child| Reverse(NearestEntry::new(arena, child, point)))
            .collect();

        let mut found: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        while let Some(Reverse(entry)) = queue.pop() {
            if found.len() == k && found.peek().is_some_and(|worst| entry.distance > worst.distance)
            {
                break;
            }
            match &arena.get(entry.id).kind {
                EntityKind::Leaf(items) => {
                    for &coord in items {
                        let candidate = Candidate {
                            distance: OrderedFloat(euclidean(arena.point(coord), point)),
                            coord,
                        };
                        if found.len() < k {
                            found.push(candidate);
                        } else if found.peek().is_some_and(|worst| candidate < *worst) {
                            found.pop();
                            found.push(candidate);
                        }
                    }
                }
                EntityKind::Node(children) => {
                    queue.extend(
                        children
                            .iter()
                            .map(|&child| Reverse(NearestEntry::new(arena, child, point))),
                    );
                }
            }
        }
        found
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbour {
                coord: c.coord,
                distance: c.distance.0,
            })
            .collect()
    }

    /// First leaf holding `coord`, visiting boxes whose grid box contains it in
    /// lexicographic bounds order.
    pub(crate) fn locate(&self, coord: GridCoord) -> Option<EntityId> {
        let arena = &self.arena;
        let entry = move |id: EntityId| {
            Reverse(RemovalEntry {
                bounds: &arena.get(id).bounds,
                id,
            })
        };
        let mut queue = BinaryHeap::new();
        queue.push(entry(self.root));
        while let Some(Reverse(RemovalEntry { id, .. })) = queue.pop() {
            match &arena.get(id).kind {
                EntityKind::Leaf(items) => {
                    if items.contains(&coord) {
                        return Some(id);
                    }
                }
                EntityKind::Node(children) => {
                    queue.extend(
                        children
                            .iter()
                            .filter(|&&child| arena.get(child).coords.contains(coord))
                            .map(|&child| entry(child)),
                    );
                }
            }
        }
        None
    }

    fn check_query(&self, point: &[f64]) {
        assert_eq!(
            point.len(),
            self.arena.dims(),
            "query has {} components, the grid stores {}",
            point.len(),
            self.arena.dims()
        );
    }
}
