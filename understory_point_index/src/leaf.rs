// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf operations: point insertion, removal, and the seed-and-fill split.

use alloc::vec;
use alloc::vec::Vec;

use log::trace;

use crate::entity::{Arena, EntityId, EntityKind};
use crate::grid::{GridCoord, PointGrid};
use crate::types::{CoordBounds, log_spread};

impl<G: PointGrid + ?Sized> Arena<'_, G> {
    /// Append `coord` to `leaf`, splitting the leaf if it overflows.
    ///
    /// Returns the points the split could not place; the caller reinserts them
    /// from the root.
    pub(crate) fn leaf_insert_point(&mut self, leaf: EntityId, coord: GridCoord) -> Vec<GridCoord> {
        self.expand_to_coord(leaf, coord);
        self.items_mut(leaf).push(coord);
        if self.is_above_max_capacity(leaf) {
            self.leaf_split(leaf)
        } else {
            Vec::new()
        }
    }

    /// Remove the first occurrence of `coord`. Bounds are left as they are; the
    /// caller refreshes after a successful removal.
    pub(crate) fn leaf_remove_point(&mut self, leaf: EntityId, coord: GridCoord) -> bool {
        let Some(pos) = self.items(leaf).iter().position(|&c| c == coord) else {
            return false;
        };
        self.items_mut(leaf).remove(pos);
        true
    }

    /// Split an overflowing leaf.
    ///
    /// The two points with the largest [`log_spread`] seed the halves: the first
    /// seeds a new sibling leaf handed to the parent, the second reseeds `leaf`
    /// itself. Each half is then topped up to `capacity_min`, always choosing the
    /// point that grows the *sibling* least, for both halves. Whatever is still
    /// unassigned is returned for reinsertion.
    pub(crate) fn leaf_split(&mut self, leaf: EntityId) -> Vec<GridCoord> {
        let (parent, depth) = {
            let entity = self.get(leaf);
            let parent = entity
                .parent
                .expect("a splitting leaf always has a parent node");
            (parent, entity.depth)
        };
        let mut pending = core::mem::take(self.items_mut(leaf));
        assert!(pending.len() >= 2, "a leaf split needs two seeds");
        let (i, j) = self.leaf_seeds(&pending);
        let second = pending.remove(j);
        let first = pending.remove(i);

        let sibling = self.new_leaf(Some(parent), depth, first);
        let point = self.point(second);
        let entity = self.get_mut(leaf);
        entity.bounds.set_to_point(point);
        entity.coords = CoordBounds::from_coord(second);
        entity.kind = EntityKind::Leaf(vec![second]);
        self.node_insert_child_internal(parent, sibling);

        self.fill_to_minimum(sibling, sibling, &mut pending);
        self.fill_to_minimum(leaf, sibling, &mut pending);
        self.refresh_upward(parent);

        trace!(
            "leaf {leaf:?} split off {sibling:?}, {} points left over",
            pending.len()
        );
        pending
    }

    /// Exhaustive pair scan for the widest-spread pair; `i < j`.
    fn leaf_seeds(&self, items: &[GridCoord]) -> (usize, usize) {
        let mut best = (0, 1);
        let mut best_spread = f64::NEG_INFINITY;
        for (i, &a) in items.iter().enumerate() {
            let pa = self.point(a);
            for (j, &b) in items.iter().enumerate().skip(i + 1) {
                let spread = log_spread(pa, self.point(b));
                if best_spread < spread {
                    best = (i, j);
                    best_spread = spread;
                }
            }
        }
        best
    }

    /// Move points from `pending` into `target` until it reaches `capacity_min`,
    /// each time taking the point that grows `metric`'s box least.
    fn fill_to_minimum(&mut self, target: EntityId, metric: EntityId, pending: &mut Vec<GridCoord>) {
        while self.is_below_min_capacity(target) && !pending.is_empty() {
            let bounds = &self.get(metric).bounds;
            let mut best = 0;
            let mut best_volume = bounds.hypervolume_to_point(self.point(pending[0]));
            for (k, &c) in pending.iter().enumerate().skip(1) {
                let volume = bounds.hypervolume_to_point(self.point(c));
                if volume < best_volume {
                    best = k;
                    best_volume = volume;
                }
            }
            let coord = pending.remove(best);
            self.expand_to_coord(target, coord);
            self.items_mut(target).push(coord);
        }
    }
}
