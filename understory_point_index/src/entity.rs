// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage for leaves and internal nodes.
//!
//! Entities live in one `Vec` and refer to each other by [`EntityId`]. A node owns
//! its children through its child list; the `parent` field is a plain back-index
//! used to walk ancestor chains and never keeps anything alive. Detached entities
//! go on a free list and their slots are reused by later allocations.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::config::IndexConfig;
use crate::grid::{GridCoord, PointGrid};
use crate::types::{Bounds, CoordBounds};

/// Handle to a leaf or node inside one [`SpatialIndex`](crate::SpatialIndex).
///
/// Handles are only meaningful for the index that produced them, and only until
/// the next mutation: splits and removals may free or reuse slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    /// Arena slot of this entity.
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Leaf or node payload.
#[derive(Clone, Debug)]
pub(crate) enum EntityKind {
    /// Grid coordinates whose vectors lie inside the leaf's bounds.
    Leaf(Vec<GridCoord>),
    /// Owned child entities.
    Node(Vec<EntityId>),
}

impl EntityKind {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(items) => items.len(),
            Self::Node(children) => children.len(),
        }
    }
}

/// Fields shared by leaves and nodes.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) bounds: Bounds,
    pub(crate) coords: CoordBounds,
    pub(crate) depth: usize,
    pub(crate) parent: Option<EntityId>,
    pub(crate) kind: EntityKind,
}

impl Entity {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, EntityKind::Leaf(_))
    }
}

/// The entity arena plus the grid and limits every box operation needs.
pub(crate) struct Arena<'g, G: ?Sized> {
    pub(crate) grid: &'g G,
    pub(crate) config: IndexConfig,
    entities: Vec<Entity>,
    free: Vec<EntityId>,
}

impl<'g, G: PointGrid + ?Sized> Arena<'g, G> {
    pub(crate) fn new(grid: &'g G, config: IndexConfig) -> Self {
        Self {
            grid,
            config,
            entities: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn dims(&self) -> usize {
        self.grid.dims()
    }

    /// Vector of a grid cell, borrowed from the grid rather than from `self`.
    pub(crate) fn point(&self, coord: GridCoord) -> &'g [f64] {
        let grid: &'g G = self.grid;
        grid.point(coord.x, coord.y)
    }

    pub(crate) fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn slots(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Whether `id` names a slot that is allocated and not on the free list.
    pub(crate) fn is_live(&self, id: EntityId) -> bool {
        id.get() < self.entities.len() && !self.free.contains(&id)
    }

    pub(crate) fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.get()]
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.get()]
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.free.clear();
    }

    fn alloc(&mut self, entity: Entity) -> EntityId {
        if let Some(id) = self.free.pop() {
            self.entities[id.get()] = entity;
            id
        } else {
            self.entities.push(entity);
            EntityId::new(self.entities.len() - 1)
        }
    }

    /// Allocate a childless node with empty bounds.
    pub(crate) fn new_empty_node(&mut self, parent: Option<EntityId>, depth: usize) -> EntityId {
        let dims = self.dims();
        self.alloc(Entity {
            bounds: Bounds::empty(dims),
            coords: CoordBounds::EMPTY,
            depth,
            parent,
            kind: EntityKind::Node(Vec::new()),
        })
    }

    /// Allocate a leaf holding exactly `seed`.
    pub(crate) fn new_leaf(
        &mut self,
        parent: Option<EntityId>,
        depth: usize,
        seed: GridCoord,
    ) -> EntityId {
        let bounds = Bounds::from_point(self.point(seed));
        self.alloc(Entity {
            bounds,
            coords: CoordBounds::from_coord(seed),
            depth,
            parent,
            kind: EntityKind::Leaf(vec![seed]),
        })
    }

    /// Allocate a node whose only child is `first`, re-parenting `first` onto it.
    pub(crate) fn new_node(
        &mut self,
        parent: Option<EntityId>,
        depth: usize,
        first: EntityId,
    ) -> EntityId {
        let (bounds, coords) = {
            let child = self.get(first);
            (child.bounds.clone(), child.coords)
        };
        let id = self.alloc(Entity {
            bounds,
            coords,
            depth,
            parent,
            kind: EntityKind::Node(vec![first]),
        });
        self.get_mut(first).parent = Some(id);
        id
    }

    /// Return a detached entity's slot to the free list.
    fn release(&mut self, id: EntityId) {
        let entity = self.get_mut(id);
        entity.parent = None;
        entity.kind = EntityKind::Leaf(Vec::new());
        self.free.push(id);
    }

    /// Release `id` and everything below it.
    pub(crate) fn release_subtree(&mut self, id: EntityId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let EntityKind::Node(children) = &self.get(id).kind {
                stack.extend_from_slice(children);
            }
            self.release(id);
        }
    }

    /// Release a node that has already handed its children elsewhere.
    pub(crate) fn release_emptied(&mut self, id: EntityId) {
        debug_assert_eq!(self.count(id), 0, "released node still owns children");
        self.release(id);
    }

    pub(crate) fn items(&self, leaf: EntityId) -> &[GridCoord] {
        match &self.get(leaf).kind {
            EntityKind::Leaf(items) => items,
            EntityKind::Node(_) => panic!("{leaf:?} is a node, expected a leaf"),
        }
    }

    pub(crate) fn items_mut(&mut self, leaf: EntityId) -> &mut Vec<GridCoord> {
        match &mut self.get_mut(leaf).kind {
            EntityKind::Leaf(items) => items,
            EntityKind::Node(_) => panic!("{leaf:?} is a node, expected a leaf"),
        }
    }

    pub(crate) fn children(&self, node: EntityId) -> &[EntityId] {
        match &self.get(node).kind {
            EntityKind::Node(children) => children,
            EntityKind::Leaf(_) => panic!("{node:?} is a leaf, expected a node"),
        }
    }

    pub(crate) fn children_mut(&mut self, node: EntityId) -> &mut Vec<EntityId> {
        match &mut self.get_mut(node).kind {
            EntityKind::Node(children) => children,
            EntityKind::Leaf(_) => panic!("{node:?} is a leaf, expected a node"),
        }
    }

    /// Item count for a leaf, child count for a node.
    pub(crate) fn count(&self, id: EntityId) -> usize {
        self.get(id).kind.len()
    }

    pub(crate) fn is_above_max_capacity(&self, id: EntityId) -> bool {
        self.count(id) > self.config.capacity_max()
    }

    pub(crate) fn is_below_min_capacity(&self, id: EntityId) -> bool {
        self.count(id) < self.config.capacity_min()
    }

    /// Widen `id`'s bounds and coordinate box to include a grid point.
    pub(crate) fn expand_to_coord(&mut self, id: EntityId, coord: GridCoord) {
        let point = self.point(coord);
        let entity = self.get_mut(id);
        entity.bounds.expand_to_point(point);
        entity.coords.expand_to_coord(coord);
    }

    /// Widen `id`'s bounds and coordinate box to include another entity.
    pub(crate) fn expand_to_entity(&mut self, id: EntityId, other: EntityId) {
        let (bounds, coords) = {
            let o = self.get(other);
            (o.bounds.clone(), o.coords)
        };
        let entity = self.get_mut(id);
        entity.bounds.expand_to_box(&bounds);
        entity.coords.expand_to_bounds(&coords);
    }

    /// Bounds recomputed from scratch over `id`'s items or children.
    pub(crate) fn tight_bounds(&self, id: EntityId) -> (Bounds, CoordBounds) {
        let mut bounds = Bounds::empty(self.dims());
        let mut coords = CoordBounds::EMPTY;
        match &self.get(id).kind {
            EntityKind::Leaf(items) => {
                for &c in items {
                    bounds.expand_to_point(self.point(c));
                    coords.expand_to_coord(c);
                }
            }
            EntityKind::Node(children) => {
                for &c in children {
                    let child = self.get(c);
                    bounds.expand_to_box(&child.bounds);
                    coords.expand_to_bounds(&child.coords);
                }
            }
        }
        (bounds, coords)
    }

    /// Recompute one entity's bounds without touching its ancestors.
    pub(crate) fn recompute(&mut self, id: EntityId) {
        let (bounds, coords) = self.tight_bounds(id);
        let entity = self.get_mut(id);
        entity.bounds = bounds;
        entity.coords = coords;
    }

    /// Recompute `id` and then every ancestor up to the root.
    pub(crate) fn refresh_upward(&mut self, id: EntityId) {
        let mut current = Some(id);
        while let Some(id) = current {
            self.recompute(id);
            current = self.get(id).parent;
        }
    }

    /// Recompute bounds from scratch. A leaf also refreshes its whole ancestor
    /// chain, so no stale bound survives a removal.
    pub(crate) fn refresh(&mut self, id: EntityId) {
        if self.get(id).is_leaf() {
            self.refresh_upward(id);
        } else {
            self.recompute(id);
        }
    }

    /// Unlink `child` from its parent's child list.
    pub(crate) fn detach(&mut self, child: EntityId) {
        let parent = self
            .get(child)
            .parent
            .expect("only non-root entities can be detached");
        let siblings = self.children_mut(parent);
        let pos = siblings
            .iter()
            .position(|&c| c == child)
            .expect("child missing from its parent's child list");
        siblings.remove(pos);
        self.get_mut(child).parent = None;
    }

    /// Set `id`'s depth and renumber its whole subtree below it.
    pub(crate) fn assign_depth(&mut self, id: EntityId, depth: usize) {
        let mut stack = vec![(id, depth)];
        while let Some((id, depth)) = stack.pop() {
            let entity = self.get_mut(id);
            entity.depth = depth;
            if let EntityKind::Node(children) = &entity.kind {
                stack.extend(children.iter().map(|&c| (c, depth + 1)));
            }
        }
    }

    /// Append every point stored under `id` to `out`.
    pub(crate) fn collect_points(&self, id: EntityId, out: &mut Vec<GridCoord>) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match &self.get(id).kind {
                EntityKind::Leaf(items) => out.extend_from_slice(items),
                EntityKind::Node(children) => stack.extend(children.iter().rev()),
            }
        }
    }

    /// First child enclosing `point`, else the child whose log-volume would be
    /// smallest after growing to `point`. Ties go to the earlier child.
    ///
    /// `node` must have at least one child.
    pub(crate) fn choose_child(&self, node: EntityId, point: &[f64]) -> EntityId {
        let children = self.children(node);
        if let Some(&enclosing) = children
            .iter()
            .find(|&&c| self.get(c).bounds.encloses_point(point))
        {
            return enclosing;
        }
        let (&first, rest) = children
            .split_first()
            .expect("routing requires at least one child");
        let mut best = first;
        let mut best_volume = self.get(first).bounds.hypervolume_to_point(point);
        for &c in rest {
            let volume = self.get(c).bounds.hypervolume_to_point(point);
            if volume < best_volume {
                best = c;
                best_volume = volume;
            }
        }
        best
    }

    /// Split whichever kind of box `id` is. Only leaf splits produce leftovers.
    pub(crate) fn split(&mut self, id: EntityId) -> Vec<GridCoord> {
        if self.get(id).is_leaf() {
            self.leaf_split(id)
        } else {
            self.node_split(id);
            Vec::new()
        }
    }
}

/// Read-only view of a leaf or node, for inspection and tests.
#[derive(Copy, Clone)]
pub struct EntityRef<'a> {
    entities: &'a [Entity],
    id: EntityId,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(entities: &'a [Entity], id: EntityId) -> Self {
        Self { entities, id }
    }

    fn entity(&self) -> &'a Entity {
        &self.entities[self.id.get()]
    }

    /// Handle of this entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Distance from the root; the root is depth 0.
    pub fn depth(&self) -> usize {
        self.entity().depth
    }

    /// Enclosing node, `None` for the root.
    pub fn parent(&self) -> Option<EntityId> {
        self.entity().parent
    }

    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.entity().is_leaf()
    }

    /// Number of items (leaf) or children (node).
    pub fn len(&self) -> usize {
        self.entity().kind.len()
    }

    /// Whether the entity holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimum bounding box of the contents.
    pub fn bounds(&self) -> &'a Bounds {
        &self.entity().bounds
    }

    /// Grid-coordinate box of the contents.
    pub fn coord_bounds(&self) -> CoordBounds {
        self.entity().coords
    }

    /// Coordinates stored in a leaf; empty for nodes.
    pub fn items(&self) -> &'a [GridCoord] {
        match &self.entity().kind {
            EntityKind::Leaf(items) => items,
            EntityKind::Node(_) => &[],
        }
    }

    /// Child views of a node; empty for leaves.
    pub fn children(self) -> impl Iterator<Item = EntityRef<'a>> + 'a {
        let entities = self.entities;
        let ids: &'a [EntityId] = match &self.entity().kind {
            EntityKind::Node(children) => children,
            EntityKind::Leaf(_) => &[],
        };
        ids.iter().map(move |&id| Self::new(entities, id))
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id)
            .field("leaf", &self.is_leaf())
            .field("depth", &self.depth())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
