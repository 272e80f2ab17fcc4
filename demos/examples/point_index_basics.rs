// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point index basics.
//!
//! Index a small grid, query it, remove a cell, and inspect the tree.
//!
//! Run:
//! - `cargo run -p understory_demos --example point_index_basics`

use understory_point_index::{DenseGrid, GridCoord, IndexConfig, SpatialIndex};

fn main() {
    // A 6x4 grid of 3-component vectors.
    let mut grid = DenseGrid::filled(6, 4, 3, 0.0).unwrap();
    for x in 0..6 {
        for y in 0..4 {
            let (fx, fy) = (x as f64, y as f64);
            grid.point_mut(x, y)
                .copy_from_slice(&[fx, fy, (fx * fy).sin()]);
        }
    }

    // Small capacities so the tree grows a few levels.
    let config = IndexConfig::new(2, 4).unwrap();
    let mut index = SpatialIndex::with_config(&grid, config);
    for x in 0..6 {
        for y in 0..4 {
            index.insert(x, y);
        }
    }
    index.validate().unwrap();
    println!("{index:?}");
    println!("{:?}", index.stats());

    let query = [2.2, 1.1, 0.5];
    let hit = index.nearest(&query).unwrap();
    println!("nearest to {query:?}: {:?} at {:.3}", hit.coord, hit.distance);
    assert_eq!(hit.coord, GridCoord::new(2, 1));

    // Once removed, the cell is never returned again.
    assert!(index.remove(2, 1));
    let hit = index.nearest(&query).unwrap();
    println!("after removing (2, 1): {:?} at {:.3}", hit.coord, hit.distance);
    assert_ne!(hit.coord, GridCoord::new(2, 1));
    index.validate().unwrap();

    for n in index.nearest_k(&query, 3) {
        println!("  {:?} at {:.3}", n.coord, n.distance);
    }

    // Walk the top of the tree.
    let root = index.root();
    for child in root.children() {
        println!(
            "child {:?}: depth {}, {} entries, origin {:?}",
            child.id(),
            child.depth(),
            child.len(),
            child.bounds().origin()
        );
    }
}
