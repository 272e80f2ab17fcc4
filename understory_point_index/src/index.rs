// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`SpatialIndex`] driver: insertion, removal, and structural inspection.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use log::{debug, trace};

use crate::config::IndexConfig;
use crate::entity::{Arena, EntityId, EntityKind, EntityRef};
use crate::error::{IndexError, ValidationError};
use crate::grid::{GridCoord, PointGrid};

/// Shape summary returned by [`SpatialIndex::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of levels, counting the root. A childless root has height 1.
    pub height: usize,
    /// Internal nodes, including the root.
    pub nodes: usize,
    /// Leaves.
    pub leaves: usize,
    /// Stored points.
    pub points: usize,
}

/// Dynamic R-tree over the cells of a [`PointGrid`].
///
/// The index borrows the grid and stores only [`GridCoord`]s. The root is always
/// an internal node; every leaf sits at the same depth.
pub struct SpatialIndex<'g, G: PointGrid + ?Sized> {
    pub(crate) arena: Arena<'g, G>,
    pub(crate) root: EntityId,
    pub(crate) len: usize,
}

impl<'g, G: PointGrid + ?Sized> SpatialIndex<'g, G> {
    /// Create an empty index over `grid` with the default capacities.
    pub fn new(grid: &'g G) -> Self {
        Self::with_config(grid, IndexConfig::default())
    }

    /// Create an empty index over `grid`.
    pub fn with_config(grid: &'g G, config: IndexConfig) -> Self {
        let mut arena = Arena::new(grid, config);
        let root = arena.new_empty_node(None, 0);
        Self {
            arena,
            root,
            len: 0,
        }
    }

    /// Build an index holding every cell of `grid`, inserted column by column.
    pub fn from_grid(grid: &'g G) -> Result<Self, IndexError> {
        let mut index = Self::new(grid);
        for x in 0..grid.width() {
            for y in 0..grid.height() {
                index.try_insert(x, y)?;
            }
        }
        Ok(index)
    }

    /// Insert the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid or holds a non-finite component.
    /// See [`try_insert`](Self::try_insert) for the fallible version.
    pub fn insert(&mut self, x: usize, y: usize) {
        if let Err(err) = self.try_insert(x, y) {
            panic!("{err}");
        }
    }

    /// Insert the cell at `(x, y)`.
    ///
    /// The descent records every box it passes, puts the point straight into the
    /// chosen leaf, and then walks that chain from the leaf back to the root:
    /// first widening every box to the new point, then splitting any box that
    /// went over capacity. Points a leaf split could not place are inserted again
    /// from the root afterwards.
    pub fn try_insert(&mut self, x: usize, y: usize) -> Result<(), IndexError> {
        let coord = self.check_coord(x, y)?;
        self.insert_coord(coord);
        self.len += 1;
        Ok(())
    }

    /// Insert the cell at `(x, y)` by recursive routing.
    ///
    /// Each node passes the point to one child and checks its own capacity once
    /// the child returns, so splits cascade upward one level at a time. The final
    /// tree satisfies the same invariants as after [`insert`](Self::insert),
    /// though its shape may differ.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid or holds a non-finite component.
    pub fn insert_routed(&mut self, x: usize, y: usize) {
        let coord = match self.check_coord(x, y) {
            Ok(coord) => coord,
            Err(err) => panic!("{err}"),
        };
        let mut pending = vec![coord];
        while let Some(coord) = pending.pop() {
            let leftovers = self.arena.node_insert_point(self.root, coord);
            if !leftovers.is_empty() {
                debug!("reinserting {} points left over by a split", leftovers.len());
                pending.extend(leftovers.into_iter().rev());
            }
        }
        self.len += 1;
    }

    fn check_coord(&self, x: usize, y: usize) -> Result<GridCoord, IndexError> {
        let grid = self.arena.grid;
        let point = grid.get(x, y).ok_or(IndexError::OutOfRange {
            x,
            y,
            width: grid.width(),
            height: grid.height(),
        })?;
        if point.iter().all(|v| v.is_finite()) {
            Ok(GridCoord::new(x, y))
        } else {
            Err(IndexError::NonFinite { x, y })
        }
    }

    fn insert_coord(&mut self, coord: GridCoord) {
        let mut pending = vec![coord];
        while let Some(coord) = pending.pop() {
            let leftovers = self.insert_once(coord);
            if !leftovers.is_empty() {
                debug!("reinserting {} points left over by a split", leftovers.len());
                pending.extend(leftovers.into_iter().rev());
            }
        }
    }

    /// One descent and chain walk. Returns leftovers from leaf splits.
    fn insert_once(&mut self, coord: GridCoord) -> Vec<GridCoord> {
        let arena = &mut self.arena;
        let point = arena.point(coord);
        let mut chain = Vec::new();
        let mut current = self.root;
        loop {
            chain.push(current);
            if arena.get(current).is_leaf() {
                arena.items_mut(current).push(coord);
                break;
            }
            if arena.children(current).is_empty() {
                let depth = arena.get(current).depth + 1;
                let leaf = arena.new_leaf(Some(current), depth, coord);
                arena.node_insert_child_internal(current, leaf);
                break;
            }
            current = arena.choose_child(current, point);
        }

        for &id in chain.iter().rev() {
            arena.expand_to_coord(id, coord);
        }
        let mut leftovers = Vec::new();
        for &id in chain.iter().rev() {
            if arena.is_above_max_capacity(id) {
                leftovers.extend(arena.split(id));
            }
        }
        leftovers
    }

    /// Remove one occurrence of the cell at `(x, y)`.
    ///
    /// Returns `false`, leaving the index untouched, if the cell is not stored.
    /// Boxes left below `capacity_min` are dissolved and their points inserted
    /// again, so emptied leaves never linger in the tree.
    pub fn remove(&mut self, x: usize, y: usize) -> bool {
        let coord = GridCoord::new(x, y);
        let Some(leaf) = self.locate(coord) else {
            return false;
        };
        let removed = self.arena.leaf_remove_point(leaf, coord);
        debug_assert!(removed, "located leaf must hold the coordinate");
        self.len -= 1;
        self.arena.refresh(leaf);
        self.condense(leaf);
        true
    }

    /// Dissolve underfull boxes on the chain above `leaf`, shorten the tree if
    /// the root is left with a single node child, then reinsert orphaned points.
    fn condense(&mut self, leaf: EntityId) {
        let arena = &mut self.arena;
        let mut orphans = Vec::new();
        let mut current = leaf;
        while let Some(parent) = arena.get(current).parent {
            if arena.is_below_min_capacity(current) {
                arena.detach(current);
                arena.collect_points(current, &mut orphans);
                arena.release_subtree(current);
                arena.refresh_upward(parent);
                trace!("dissolved underfull {current:?}");
            }
            current = parent;
        }
        self.shrink_root();
        if !orphans.is_empty() {
            debug!("reinserting {} points from dissolved boxes", orphans.len());
            for coord in orphans {
                self.insert_coord(coord);
            }
        }
    }

    fn shrink_root(&mut self) {
        let root = self.root;
        let arena = &mut self.arena;
        loop {
            let &[only] = arena.children(root) else {
                break;
            };
            if arena.get(only).is_leaf() {
                break;
            }
            let grandchildren = core::mem::take(arena.children_mut(only));
            for &child in &grandchildren {
                arena.get_mut(child).parent = Some(root);
                arena.assign_depth(child, 1);
            }
            *arena.children_mut(root) = grandchildren;
            arena.release_emptied(only);
            trace!("hoisted the children of {only:?} into the root");
        }
    }

    /// Whether the cell at `(x, y)` is stored.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.locate(GridCoord::new(x, y)).is_some()
    }

    /// Every stored coordinate, in no particular order.
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        // Released slots are empty leaves, so a flat scan sees only live points.
        self.arena
            .entities()
            .iter()
            .filter_map(|e| match &e.kind {
                EntityKind::Leaf(items) => Some(items.iter().copied()),
                EntityKind::Node(_) => None,
            })
            .flatten()
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no points are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension of the grid's vectors.
    pub fn dims(&self) -> usize {
        self.arena.dims()
    }

    /// Capacity limits in use.
    pub fn config(&self) -> IndexConfig {
        self.arena.config
    }

    /// The grid this index reads from.
    pub fn grid(&self) -> &'g G {
        self.arena.grid
    }

    /// View of the root node.
    pub fn root(&self) -> EntityRef<'_> {
        EntityRef::new(self.arena.entities(), self.root)
    }

    /// View of any live entity.
    pub fn entity(&self, id: EntityId) -> Option<EntityRef<'_>> {
        self.arena
            .is_live(id)
            .then(|| EntityRef::new(self.arena.entities(), id))
    }

    /// Count levels, boxes and points.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let entity = self.arena.get(id);
            stats.height = stats.height.max(entity.depth + 1);
            match &entity.kind {
                EntityKind::Leaf(items) => {
                    stats.leaves += 1;
                    stats.points += items.len();
                }
                EntityKind::Node(children) => {
                    stats.nodes += 1;
                    stack.extend_from_slice(children);
                }
            }
        }
        stats
    }

    /// Remove every point, keeping the grid and configuration.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.new_empty_node(None, 0);
        self.len = 0;
    }

    /// Check every structural invariant, reporting the first one broken.
    ///
    /// Checked: the root is a parentless depth-0 node; parent links and depths
    /// agree with the child lists; all leaves share one depth; every box equals
    /// the tight box of its contents; no box exceeds `capacity_max`; and, once
    /// the index holds at least `capacity_min` points, no non-root box holds
    /// fewer than that. The number of reachable points must equal [`len`](Self::len).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let arena = &self.arena;
        let root = arena.get(self.root);
        if root.parent.is_some() || root.depth != 0 || root.is_leaf() {
            return Err(ValidationError::MalformedRoot(self.root));
        }
        let min = arena.config.capacity_min();
        let max = arena.config.capacity_max();
        let check_min = self.len >= min;

        let mut leaf_depth = None;
        let mut points = 0;
        let mut stack = vec![(self.root, 0_usize)];
        while let Some((id, depth)) = stack.pop() {
            let entity = arena.get(id);
            if entity.depth != depth {
                return Err(ValidationError::DepthMismatch {
                    id,
                    expected: depth,
                    found: entity.depth,
                });
            }
            let count = entity.kind.len();
            if count > max {
                return Err(ValidationError::Overfull { id, count });
            }
            if id != self.root && check_min && count < min {
                return Err(ValidationError::Underfull { id, count });
            }
            let (tight, coords) = arena.tight_bounds(id);
            if !entity.bounds.encloses_box(&tight) || !entity.coords.encloses(&coords) {
                return Err(ValidationError::NotEnclosed(id));
            }
            if entity.bounds != tight || entity.coords != coords {
                return Err(ValidationError::LooseBounds(id));
            }
            match &entity.kind {
                EntityKind::Leaf(items) => {
                    points += items.len();
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(ValidationError::Unbalanced {
                                id,
                                expected,
                                found: depth,
                            });
                        }
                        Some(_) => {}
                    }
                }
                EntityKind::Node(children) => {
                    for &child in children {
                        if arena.get(child).parent != Some(id) {
                            return Err(ValidationError::BrokenParentLink { parent: id, child });
                        }
                        stack.push((child, depth + 1));
                    }
                }
            }
        }
        if points != self.len {
            return Err(ValidationError::CountMismatch {
                expected: self.len,
                found: points,
            });
        }
        Ok(())
    }
}

impl<G: PointGrid + ?Sized> fmt::Debug for SpatialIndex<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("dims", &self.dims())
            .field("capacity_min", &self.arena.config.capacity_min())
            .field("capacity_max", &self.arena.config.capacity_max())
            .field("len", &self.len)
            .field("arena_slots", &self.arena.slots())
            .field("free_slots", &self.arena.free_slots())
            .finish_non_exhaustive()
    }
}
