//! Two-dimensional grids.
//!
//! A `Grid` is a row-major `height x width` array. Coordinate grids,
//! masks and single image channels are all grids; cells are addressed
//! as `(x, y)` with `y = 0` the top row.

use std::fmt;

use crate::error::{ArlunioError, Result};

/// A row-major 2D array with shape `(height, width)`.
#[derive(Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Wrap row-major data, checking that it holds `width * height` cells.
    pub fn new(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        let Some(cells) = width.checked_mul(height) else {
            return Err(ArlunioError::evaluation(format!(
                "Grid of shape ({}, {}) is too large",
                height, width
            )));
        };
        if data.len() != cells {
            return Err(ArlunioError::evaluation(format!(
                "Grid of shape ({}, {}) needs {} cells, got {}",
                height,
                width,
                cells,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid by calling `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The shape as `(height, width)`, matching image convention.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Get a mutable reference to the cell at `(x, y)`.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            self.data.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    /// Iterate over cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics, an empty grid simply has no rows
        self.data.chunks(self.width.max(1)).take(self.height)
    }

    /// The underlying row-major cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Apply `f` to every cell.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Combine two grids of the same shape cell by cell.
    pub fn zip_with<U, V>(&self, other: &Grid<U>, mut f: impl FnMut(&T, &U) -> V) -> Result<Grid<V>> {
        if self.shape() != other.shape() {
            return Err(ArlunioError::evaluation(format!(
                "Cannot combine grids of shape {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }

        Ok(Grid {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

impl<T: Clone> Grid<T> {
    /// A grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl Grid<bool> {
    /// Number of `true` cells.
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True if every cell is set.
    pub fn all(&self) -> bool {
        self.data.iter().all(|&v| v)
    }

    /// True if any cell is set.
    pub fn any(&self) -> bool {
        self.data.iter().any(|&v| v)
    }

    /// Positions `(x, y)` of set cells in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Cells set in both masks.
    pub fn and(&self, other: &Grid<bool>) -> Result<Grid<bool>> {
        self.zip_with(other, |a, b| *a && *b)
    }

    /// Cells set in either mask.
    pub fn or(&self, other: &Grid<bool>) -> Result<Grid<bool>> {
        self.zip_with(other, |a, b| *a || *b)
    }

    /// Cells set here but not in `other`.
    pub fn difference(&self, other: &Grid<bool>) -> Result<Grid<bool>> {
        self.zip_with(other, |a, b| *a && !*b)
    }

    /// Flip every cell.
    pub fn not(&self) -> Grid<bool> {
        self.map(|v| !v)
    }
}

impl<T: fmt::Debug> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
