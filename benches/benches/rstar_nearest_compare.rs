// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_point_index::{DenseGrid, PointGrid, SpatialIndex};

use rstar::{Point, RTree};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_grid(n: usize, dims: usize) -> DenseGrid {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let values = (0..n * n * dims).map(|_| rng.next_f64() * 1000.0).collect();
    DenseGrid::new(n, n, dims, values).unwrap()
}

fn to_rstar_points<const D: usize>(grid: &DenseGrid) -> Vec<[f64; D]> {
    let mut out = Vec::with_capacity(grid.width() * grid.height());
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            let mut p = [0.0; D];
            p.copy_from_slice(grid.point(x, y));
            out.push(p);
        }
    }
    out
}

fn gen_queries<const D: usize>(count: usize) -> Vec<[f64; D]> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| core::array::from_fn(|_| rng.next_f64() * 1000.0))
        .collect()
}

fn compare<const D: usize>(c: &mut Criterion)
where
    [f64; D]: Point<Scalar = f64>,
{
    let mut group = c.benchmark_group(format!("rstar_nearest_compare_d{D}"));
    for &n in &[32usize, 64] {
        let grid = gen_grid(n, D);
        let points = to_rstar_points::<D>(&grid);
        let queries = gen_queries::<D>(256);

        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("understory_build_n{n}"), |b| {
            b.iter(|| {
                let mut idx = SpatialIndex::new(&grid);
                for x in 0..n {
                    for y in 0..n {
                        idx.insert(x, y);
                    }
                }
                black_box(idx.len());
            });
        });
        group.bench_function(format!("rstar_build_n{n}"), |b| {
            b.iter_batched(
                || points.clone(),
                |points| {
                    let mut tree = RTree::new();
                    for p in points {
                        tree.insert(p);
                    }
                    black_box(tree.size());
                },
                BatchSize::SmallInput,
            );
        });

        group.throughput(Throughput::Elements(queries.len() as u64));
        let idx = SpatialIndex::from_grid(&grid).unwrap();
        group.bench_function(format!("understory_nearest_n{n}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(idx.find_nearest_neighbour(q));
                }
            });
        });
        let tree = RTree::bulk_load(points.clone());
        group.bench_function(format!("rstar_nearest_n{n}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.nearest_neighbor(q));
                }
            });
        });
    }
    group.finish();
}

fn bench_rstar_nearest_compare(c: &mut Criterion) {
    compare::<2>(c);
    compare::<4>(c);
}

criterion_group!(benches, bench_rstar_nearest_compare);
criterion_main!(benches);
