// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_point_index::{DenseGrid, IndexConfig, PointGrid, SpatialIndex};

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

fn gen_uniform_grid(n: usize, dims: usize, extent: f64) -> DenseGrid {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let values = (0..n * n * dims).map(|_| rng.next_f64() * extent).collect();
    DenseGrid::new(n, n, dims, values).unwrap()
}

fn gen_clustered_grid(n: usize, dims: usize, clusters: usize, spread: f64) -> DenseGrid {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let centers: Vec<Vec<f64>> = (0..clusters)
        .map(|_| (0..dims).map(|_| rng.next_f64() * 2000.0).collect())
        .collect();
    let mut grid = DenseGrid::filled(n, n, dims, 0.0).unwrap();
    for x in 0..n {
        for y in 0..n {
            let center = &centers[(x * n + y) % clusters];
            for (v, c) in grid.point_mut(x, y).iter_mut().zip(center) {
                *v = c + (rng.next_f64() - 0.5) * spread;
            }
        }
    }
    grid
}

fn gen_queries(count: usize, dims: usize, extent: f64) -> Vec<Vec<f64>> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| (0..dims).map(|_| rng.next_f64() * extent).collect())
        .collect()
}

fn build(grid: &DenseGrid, config: IndexConfig) -> SpatialIndex<'_, DenseGrid> {
    let mut idx = SpatialIndex::with_config(grid, config);
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            idx.insert(x, y);
        }
    }
    idx
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_index_insert");
    for &(n, dims) in &[(32usize, 2usize), (32, 8), (64, 4)] {
        let grid = gen_uniform_grid(n, dims, 1000.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        for &(min, max) in &[(2usize, 10usize), (4, 16)] {
            let config = IndexConfig::new(min, max).unwrap();
            group.bench_function(format!("chain_n{n}_d{dims}_cap{min}_{max}"), |b| {
                b.iter(|| black_box(build(&grid, config).len()));
            });
        }

        group.bench_function(format!("routed_n{n}_d{dims}"), |b| {
            b.iter(|| {
                let mut idx = SpatialIndex::new(&grid);
                for x in 0..n {
                    for y in 0..n {
                        idx.insert_routed(x, y);
                    }
                }
                black_box(idx.len());
            });
        });
    }
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_index_nearest");
    for &(n, dims) in &[(64usize, 2usize), (64, 8)] {
        let queries = gen_queries(256, dims, 2000.0);
        group.throughput(Throughput::Elements(queries.len() as u64));

        let uniform = gen_uniform_grid(n, dims, 2000.0);
        let idx = build(&uniform, IndexConfig::default());
        group.bench_function(format!("uniform_n{n}_d{dims}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(idx.find_nearest_neighbour(q));
                }
            });
        });

        let clustered = gen_clustered_grid(n, dims, 16, 40.0);
        let idx = build(&clustered, IndexConfig::default());
        group.bench_function(format!("clustered_n{n}_d{dims}"), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(idx.find_nearest_neighbour(q));
                }
            });
        });

        group.bench_function(format!("k8_uniform_n{n}_d{dims}"), |b| {
            let idx = build(&uniform, IndexConfig::default());
            b.iter(|| {
                for q in &queries {
                    black_box(idx.nearest_k(q, 8));
                }
            });
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_index_remove");
    let n = 48;
    let grid = gen_uniform_grid(n, 4, 1000.0);
    group.throughput(Throughput::Elements((n * n / 2) as u64));
    group.bench_function(format!("remove_half_n{n}"), |b| {
        b.iter_batched(
            || build(&grid, IndexConfig::default()),
            |mut idx| {
                for x in (0..n).step_by(2) {
                    for y in 0..n {
                        idx.remove(x, y);
                    }
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_nearest, bench_remove);
criterion_main!(benches);
