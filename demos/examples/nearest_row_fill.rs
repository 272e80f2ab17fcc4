// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-row fill.
//!
//! Fill missing values in a table by copying them from the most similar
//! complete row. Every row is a grid cell `(row, 0)` whose vector holds the
//! row's normalized feature columns; only complete rows are indexed.
//!
//! Run:
//! - `cargo run -p understory_demos --example nearest_row_fill`

use understory_point_index::{DenseGrid, SpatialIndex};

struct Row {
    features: [f64; 3],
    target: Option<f64>,
}

const fn sample(features: [f64; 3], target: Option<f64>) -> Row {
    Row { features, target }
}

fn main() {
    let rows = [
        sample([5.1, 3.5, 1.4], Some(0.2)),
        sample([4.9, 3.0, 1.4], Some(0.2)),
        sample([7.0, 3.2, 4.7], Some(1.4)),
        sample([6.4, 3.2, 4.5], Some(1.5)),
        sample([6.3, 3.3, 6.0], Some(2.5)),
        sample([5.8, 2.7, 5.1], Some(1.9)),
        sample([5.0, 3.4, 1.5], None),
        sample([6.5, 3.0, 5.8], None),
        sample([6.9, 3.1, 4.9], None),
    ];

    // Scale every feature column to [0, 1] so no column dominates the distance.
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for row in &rows {
        for (a, &v) in row.features.iter().enumerate() {
            lo[a] = lo[a].min(v);
            hi[a] = hi[a].max(v);
        }
    }
    let normalize = |features: &[f64; 3]| -> [f64; 3] {
        core::array::from_fn(|a| (features[a] - lo[a]) / (hi[a] - lo[a]))
    };

    let values = rows.iter().flat_map(|r| normalize(&r.features)).collect();
    let grid = DenseGrid::new(rows.len(), 1, 3, values).unwrap();

    let mut index = SpatialIndex::new(&grid);
    for (i, row) in rows.iter().enumerate() {
        if row.target.is_some() {
            index.insert(i, 0);
        }
    }
    println!("indexed {} complete rows", index.len());

    for (i, row) in rows.iter().enumerate().filter(|(_, r)| r.target.is_none()) {
        let donor = index
            .nearest(&normalize(&row.features))
            .expect("at least one complete row");
        let filled = rows[donor.coord.x].target.unwrap();
        println!(
            "row {i} {:?}: target filled with {filled} from row {} (distance {:.3})",
            row.features, donor.coord.x, donor.distance
        );
    }
}
