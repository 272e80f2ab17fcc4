// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only caller mistakes are reported as errors. Removing an absent point and
//! querying an empty tree have ordinary return values (`false`, `None`), and a
//! corrupted tree is a bug that panics where it is detected.

use thiserror::Error;

use crate::entity::EntityId;

/// Malformed grid construction input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Cells must hold at least one component.
    #[error("grid vectors need at least one dimension")]
    ZeroDimensions,
    /// Flat buffer does not match `width * height * dims`.
    #[error("expected {expected} grid values, found {found}")]
    LengthMismatch {
        /// Required buffer length.
        expected: usize,
        /// Provided buffer length.
        found: usize,
    },
    /// A column's height differs from the first column's.
    #[error("column {x} has {found} cells, expected {expected}")]
    RaggedColumn {
        /// Offending column.
        x: usize,
        /// Height of the first column.
        expected: usize,
        /// Height of this column.
        found: usize,
    },
    /// A cell's vector length differs from the first cell's.
    #[error("cell ({x}, {y}) has {found} components, expected {expected}")]
    RaggedCell {
        /// Column of the offending cell.
        x: usize,
        /// Row of the offending cell.
        y: usize,
        /// Dimension of the first cell.
        expected: usize,
        /// Dimension of this cell.
        found: usize,
    },
}

/// Capacity settings that would make splits impossible.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `capacity_min` must be at least one.
    #[error("capacity_min must be at least 1")]
    ZeroMinimum,
    /// `capacity_max` must leave room for two split seeds.
    #[error("capacity_max must be at least 2, got {0}")]
    MaximumTooSmall(usize),
    /// An overflowing box (`capacity_max + 1` entries) cannot fill two halves to `capacity_min`.
    #[error("capacity_max {max} cannot be split into two boxes of at least {min} entries")]
    Unsplittable {
        /// Requested minimum.
        min: usize,
        /// Requested maximum.
        max: usize,
    },
}

/// A coordinate the index cannot accept.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The coordinate lies outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfRange {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// The cell's vector holds a NaN or infinite component.
    #[error("cell ({x}, {y}) holds a non-finite component")]
    NonFinite {
        /// Column of the cell.
        x: usize,
        /// Row of the cell.
        y: usize,
    },
}

/// First structural invariant found broken by
/// [`SpatialIndex::validate`](crate::SpatialIndex::validate).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The root has a parent or a non-zero depth.
    #[error("root {0:?} is not a parentless depth-0 node")]
    MalformedRoot(EntityId),
    /// A child does not point back at the node listing it.
    #[error("{child:?} is listed under {parent:?} but links to another parent")]
    BrokenParentLink {
        /// Node listing the child.
        parent: EntityId,
        /// Child with the wrong back-reference.
        child: EntityId,
    },
    /// A stored depth disagrees with the distance from the root.
    #[error("{id:?} stores depth {found}, expected {expected}")]
    DepthMismatch {
        /// Offending entity.
        id: EntityId,
        /// Distance from the root.
        expected: usize,
        /// Stored depth.
        found: usize,
    },
    /// Leaves sit at different depths.
    #[error("leaf {id:?} sits at depth {found}, other leaves at {expected}")]
    Unbalanced {
        /// Offending leaf.
        id: EntityId,
        /// Depth of the first leaf seen.
        expected: usize,
        /// Depth of this leaf.
        found: usize,
    },
    /// A point or child box falls outside its container.
    #[error("{0:?} does not enclose all of its contents")]
    NotEnclosed(EntityId),
    /// Stored bounds differ from bounds recomputed from contents.
    #[error("{0:?} has stale bounds")]
    LooseBounds(EntityId),
    /// More than `capacity_max` entries.
    #[error("{id:?} holds {count} entries, above capacity")]
    Overfull {
        /// Offending entity.
        id: EntityId,
        /// Entry count.
        count: usize,
    },
    /// Fewer than `capacity_min` entries in a non-root entity.
    #[error("{id:?} holds {count} entries, below capacity")]
    Underfull {
        /// Offending entity.
        id: EntityId,
        /// Entry count.
        count: usize,
    },
    /// The number of stored points differs from the index's count.
    #[error("index counts {expected} points but the tree holds {found}")]
    CountMismatch {
        /// Count tracked by the index.
        expected: usize,
        /// Points found in leaves.
        found: usize,
    },
}
