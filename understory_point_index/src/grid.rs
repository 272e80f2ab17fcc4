// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point grids: the caller-owned `(x, y) -> [f64; D]` storage the index reads from.
//!
//! The index never copies or mutates grid values. It stores only [`GridCoord`]s
//! and looks the vectors up again whenever it needs geometry.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::GridError;

/// Integer address of a cell in a [`PointGrid`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    /// Column along the grid's first axis.
    pub x: usize,
    /// Row along the grid's second axis.
    pub y: usize,
}

impl GridCoord {
    /// Create a coordinate.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for GridCoord {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

/// Dense, read-only grid of `D`-dimensional vectors addressed by `(x, y)`.
pub trait PointGrid {
    /// Number of cells along `x`.
    fn width(&self) -> usize;

    /// Number of cells along `y`.
    fn height(&self) -> usize;

    /// Number of components in every cell's vector.
    fn dims(&self) -> usize;

    /// The vector stored at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Implementations panic when `(x, y)` is outside the grid.
    fn point(&self, x: usize, y: usize) -> &[f64];

    /// The vector stored at `(x, y)`, or `None` outside the grid.
    fn get(&self, x: usize, y: usize) -> Option<&[f64]> {
        (x < self.width() && y < self.height()).then(|| self.point(x, y))
    }
}

/// Owned row-major grid backed by a single flat buffer.
///
/// Cell `(x, y)` occupies `values[(x * height + y) * dims..][..dims]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseGrid {
    width: usize,
    height: usize,
    dims: usize,
    values: Vec<f64>,
}

impl DenseGrid {
    /// Wrap a flat buffer of `width * height * dims` values.
    pub fn new(
        width: usize,
        height: usize,
        dims: usize,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        if dims == 0 {
            return Err(GridError::ZeroDimensions);
        }
        let expected = width
            .checked_mul(height)
            .and_then(|cells| cells.checked_mul(dims))
            .unwrap_or(usize::MAX);
        if values.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            dims,
            values,
        })
    }

    /// A grid with every component set to `value`.
    pub fn filled(width: usize, height: usize, dims: usize, value: f64) -> Result<Self, GridError> {
        let len = width
            .checked_mul(height)
            .and_then(|cells| cells.checked_mul(dims))
            .ok_or(GridError::LengthMismatch {
                expected: usize::MAX,
                found: 0,
            })?;
        Self::new(width, height, dims, vec![value; len])
    }

    /// Build from nested cells indexed as `cells[x][y][axis]`.
    ///
    /// Every column must have the same height and every cell the same dimension.
    pub fn from_nested(cells: &[Vec<Vec<f64>>]) -> Result<Self, GridError> {
        let width = cells.len();
        let height = cells.first().map_or(0, Vec::len);
        let dims = cells
            .first()
            .and_then(|column| column.first())
            .map_or(0, Vec::len);
        if dims == 0 {
            return Err(GridError::ZeroDimensions);
        }
        let mut values = Vec::with_capacity(width * height * dims);
        for (x, column) in cells.iter().enumerate() {
            if column.len() != height {
                return Err(GridError::RaggedColumn {
                    x,
                    expected: height,
                    found: column.len(),
                });
            }
            for (y, cell) in column.iter().enumerate() {
                if cell.len() != dims {
                    return Err(GridError::RaggedCell {
                        x,
                        y,
                        expected: dims,
                        found: cell.len(),
                    });
                }
                values.extend_from_slice(cell);
            }
        }
        Self::new(width, height, dims, values)
    }

    /// Mutable access to the vector at `(x, y)`, for filling the grid before indexing it.
    ///
    /// # Panics
    ///
    /// Panics when `(x, y)` is outside the grid.
    pub fn point_mut(&mut self, x: usize, y: usize) -> &mut [f64] {
        let start = self.offset(x, y);
        &mut self.values[start..start + self.dims]
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) is outside the {}x{} grid",
            self.width,
            self.height
        );
        (x * self.height + y) * self.dims
    }
}

impl PointGrid for DenseGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn point(&self, x: usize, y: usize) -> &[f64] {
        let start = self.offset(x, y);
        &self.values[start..start + self.dims]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_buffer_layout_is_x_major() {
        let grid = DenseGrid::new(2, 3, 2, (0..12).map(f64::from).collect()).unwrap();
        assert_eq!(grid.point(0, 0), &[0.0, 1.0]);
        assert_eq!(grid.point(0, 2), &[4.0, 5.0]);
        assert_eq!(grid.point(1, 0), &[6.0, 7.0]);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(1, 2), Some(&[10.0, 11.0][..]));
    }

    #[test]
    fn nested_cells_round_into_the_same_layout() {
        let grid = DenseGrid::from_nested(&[
            vec![vec![0.0, 1.0], vec![2.0, 3.0]],
            vec![vec![4.0, 5.0], vec![6.0, 7.0]],
        ])
        .unwrap();
        assert_eq!((grid.width(), grid.height(), grid.dims()), (2, 2, 2));
        assert_eq!(grid.point(1, 1), &[6.0, 7.0]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            DenseGrid::new(2, 2, 0, Vec::new()),
            Err(GridError::ZeroDimensions)
        );
        assert_eq!(
            DenseGrid::new(2, 2, 1, vec![0.0; 3]),
            Err(GridError::LengthMismatch {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            DenseGrid::from_nested(&[vec![vec![0.0]], vec![vec![1.0], vec![2.0]]]),
            Err(GridError::RaggedColumn {
                x: 1,
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            DenseGrid::from_nested(&[vec![vec![0.0], vec![1.0, 2.0]]]),
            Err(GridError::RaggedCell {
                x: 0,
                y: 1,
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn point_mut_writes_through() {
        let mut grid = DenseGrid::filled(3, 3, 2, 0.0).unwrap();
        grid.point_mut(2, 1).copy_from_slice(&[4.0, 5.0]);
        assert_eq!(grid.point(2, 1), &[4.0, 5.0]);
        assert_eq!(grid.point(1, 2), &[0.0, 0.0]);
    }
}
