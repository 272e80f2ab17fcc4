// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Point Index: a dynamic R-tree over a dense grid of vectors.
//!
//! The index is built over a caller-owned [`PointGrid`]: a two-axis `(x, y)` grid
//! in which every cell holds a vector of the same dimension `D`. The index stores
//! only grid coordinates and reads vectors back from the grid when it needs them.
//!
//! - Insert and remove cells one at a time; leaves and nodes split and dissolve
//!   to keep every box between [`IndexConfig::capacity_min`] and
//!   [`IndexConfig::capacity_max`] entries.
//! - Find the nearest stored vector (or the `k` nearest) to any query vector with
//!   a best-first search over the box hierarchy.
//! - Inspect the tree through read-only [`EntityRef`] views and check its
//!   invariants with [`SpatialIndex::validate`].
//!
//! # Example
//!
//! ```rust
//! use understory_point_index::{DenseGrid, GridCoord, SpatialIndex};
//!
//! // A 2x2 grid of two-dimensional vectors, laid out column by column.
//! let grid = DenseGrid::new(2, 2, 2, vec![0.0, 0.0, 1.0, 1.0, 4.0, 4.0, 9.0, 9.0]).unwrap();
//!
//! let mut index = SpatialIndex::from_grid(&grid).unwrap();
//! assert_eq!(index.len(), 4);
//! assert_eq!(
//!     index.find_nearest_neighbour(&[4.0, 4.5]),
//!     Some(GridCoord::new(1, 0))
//! );
//!
//! // Removing a cell takes it out of every later query.
//! assert!(index.remove(1, 0));
//! assert_eq!(
//!     index.find_nearest_neighbour(&[4.0, 4.5]),
//!     Some(GridCoord::new(0, 1))
//! );
//! ```
//!
//! ## Box metrics
//!
//! Volumes are compared as sums of `log10` edge lengths rather than products, so
//! high-dimensional boxes neither overflow nor underflow. The values are only
//! meaningful relative to each other. A box that is flat on some axis has a
//! volume of negative infinity.
//!
//! ## Features
//!
//! - `std` (default): use `std` for float math.
//! - `libm`: use `libm` instead, for `no_std` targets.
//!
//! One of the two must be enabled. This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod entity;
pub mod error;
pub mod grid;
pub mod index;
pub mod search;
pub mod types;

mod leaf;
mod math;
mod node;

pub use config::IndexConfig;
pub use entity::{EntityId, EntityRef};
pub use error::{ConfigError, GridError, IndexError, ValidationError};
pub use grid::{DenseGrid, GridCoord, PointGrid};
pub use index::{SpatialIndex, TreeStats};
pub use search::Neighbour;
pub use types::{Bounds, CoordBounds};
