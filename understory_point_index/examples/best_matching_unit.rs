// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Find the best-matching cell of a weight map for a few input vectors.

use understory_point_index::{DenseGrid, SpatialIndex};

fn main() {
    // An 8x8 map of 2-component weights spread over the unit square.
    let mut map = DenseGrid::filled(8, 8, 2, 0.0).unwrap();
    for x in 0..8 {
        for y in 0..8 {
            map.point_mut(x, y)
                .copy_from_slice(&[x as f64 / 7.0, y as f64 / 7.0]);
        }
    }
    let index = SpatialIndex::from_grid(&map).unwrap();
    println!("{:?}", index.stats());

    for input in [[0.1, 0.9], [0.5, 0.5], [0.97, 0.02]] {
        let bmu = index.nearest(&input).unwrap();
        println!("input {input:?} -> cell {:?} (distance {:.3})", bmu.coord, bmu.distance);
    }
}
