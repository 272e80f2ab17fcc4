// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Internal node operations: routing, child insertion, and node splits.

use alloc::vec;
use alloc::vec::Vec;

use log::trace;

use crate::entity::{Arena, EntityId, EntityKind};
use crate::grid::{GridCoord, PointGrid};

impl<G: PointGrid + ?Sized> Arena<'_, G> {
    /// Route `coord` from `node` down to a leaf.
    ///
    /// Each level checks its own capacity after the level below has returned, so
    /// splits cascade bottom-up. Leftovers from leaf splits are passed back up.
    pub(crate) fn node_insert_point(&mut self, node: EntityId, coord: GridCoord) -> Vec<GridCoord> {
        self.expand_to_coord(node, coord);
        if self.children(node).is_empty() {
            let depth = self.get(node).depth + 1;
            let leaf = self.new_leaf(Some(node), depth, coord);
            self.node_insert_child_internal(node, leaf);
            return Vec::new();
        }
        let child = self.choose_child(node, self.point(coord));
        let leftovers = if self.get(child).is_leaf() {
            self.leaf_insert_point(child, coord)
        } else {
            self.node_insert_point(child, coord)
        };
        if self.is_above_max_capacity(node) {
            self.node_split(node);
        }
        leftovers
    }

    /// Adopt `child` and split `node` straight away if that overflows it.
    pub(crate) fn node_insert_child_external(&mut self, node: EntityId, child: EntityId) {
        self.attach(node, child);
        if self.is_above_max_capacity(node) {
            self.node_split(node);
        }
    }

    /// Adopt `child` without a capacity check; the caller decides when to split.
    pub(crate) fn node_insert_child_internal(&mut self, node: EntityId, child: EntityId) {
        self.attach(node, child);
    }

    fn attach(&mut self, node: EntityId, child: EntityId) {
        self.children_mut(node).push(child);
        self.get_mut(child).parent = Some(node);
        self.expand_to_entity(node, child);
    }

    /// Split an overflowing node.
    ///
    /// The pair of children whose union box has the smallest log-volume seeds the
    /// two halves. The root keeps its id and gains two fresh children, growing the
    /// tree by one level. Any other node keeps the second seed group itself and
    /// hands a new sibling holding the first group to its parent.
    pub(crate) fn node_split(&mut self, node: EntityId) {
        let mut rest = core::mem::take(self.children_mut(node));
        assert!(rest.len() >= 2, "a node split needs two seeds");
        let (i, j) = self.node_seeds(&rest);
        let second = rest.remove(j);
        let first = rest.remove(i);
        let (depth, parent) = {
            let entity = self.get(node);
            (entity.depth, entity.parent)
        };

        match parent {
            None => {
                let left = self.new_node(Some(node), depth + 1, first);
                let right = self.new_node(Some(node), depth + 1, second);
                self.distribute(left, right, rest);
                *self.children_mut(node) = vec![left, right];
                self.assign_depth(left, depth + 1);
                self.assign_depth(right, depth + 1);
                self.recompute(node);
                trace!("root {node:?} split into {left:?} and {right:?}");
            }
            Some(parent) => {
                let sibling = self.new_node(Some(parent), depth, first);
                let (bounds, coords) = {
                    let seed = self.get(second);
                    (seed.bounds.clone(), seed.coords)
                };
                let entity = self.get_mut(node);
                entity.bounds = bounds;
                entity.coords = coords;
                entity.kind = EntityKind::Node(vec![second]);
                self.distribute(sibling, node, rest);
                self.node_insert_child_internal(parent, sibling);
                trace!("node {node:?} split off {sibling:?}");
            }
        }
    }

    /// Child pair with the smallest union log-volume; `i < j`.
    fn node_seeds(&self, children: &[EntityId]) -> (usize, usize) {
        let mut best = (0, 1);
        let mut best_volume = f64::INFINITY;
        for (i, &a) in children.iter().enumerate() {
            let bounds = &self.get(a).bounds;
            for (j, &b) in children.iter().enumerate().skip(i + 1) {
                let volume = bounds.hypervolume_to_box(&self.get(b).bounds);
                if volume < best_volume {
                    best = (i, j);
                    best_volume = volume;
                }
            }
        }
        best
    }

    /// Hand each remaining child to whichever half it grows less, ties to `left`.
    ///
    /// A half that can only reach `capacity_min` by taking everything left gets
    /// everything left.
    fn distribute(&mut self, left: EntityId, right: EntityId, rest: Vec<EntityId>) {
        let min = self.config.capacity_min();
        let total = rest.len();
        for (k, child) in rest.into_iter().enumerate() {
            let remaining = total - k;
            let target = if self.count(left) + remaining <= min {
                left
            } else if self.count(right) + remaining <= min {
                right
            } else {
                let bounds = &self.get(child).bounds;
                let to_left = self.get(left).bounds.hypervolume_to_box(bounds);
                let to_right = self.get(right).bounds.hypervolume_to_box(bounds);
                if to_left > to_right { right } else { left }
            };
            self.node_insert_child_external(target, child);
        }
    }
}
