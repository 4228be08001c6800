//! Coordinate domains.
//!
//! A `Domain` maps a pixel raster onto a rectangle of the plane. Columns
//! sample the x interval left to right, rows sample the y interval top
//! (`ymax`) to bottom (`ymin`).

use crate::error::{ArlunioError, Result};

use super::Grid;

/// An axis-aligned rectangle `[xmin, xmax] x [ymin, ymax]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl Domain {
    /// Create a domain, requiring `xmin < xmax` and `ymin < ymax`.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        // Negated so NaN bounds are rejected too
        if !(xmin < xmax) || !(ymin < ymax) {
            return Err(ArlunioError::evaluation(format!(
                "Invalid domain [{xmin}, {xmax}] x [{ymin}, {ymax}]"
            ))
            .with_help("Each interval must satisfy min < max"));
        }

        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// The domain centred on the origin with height `scale`, widened by
    /// the aspect ratio of the raster.
    pub fn centred(width: usize, height: usize, scale: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ArlunioError::evaluation(format!(
                "Cannot build a domain for a {width}x{height} raster"
            )));
        }

        let half = scale / 2.0;
        let ratio = width as f64 / height as f64;
        Self::new(-half * ratio, half * ratio, -half, half)
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// The x coordinate of column `col` out of `width`.
    pub fn x_at(&self, col: usize, width: usize) -> f64 {
        linspace(self.xmin, self.xmax, col, width)
    }

    /// The y coordinate of row `row` out of `height`.
    pub fn y_at(&self, row: usize, height: usize) -> f64 {
        linspace(self.ymax, self.ymin, row, height)
    }

    /// The coordinates of pixel `(col, row)`.
    pub fn point(&self, col: usize, row: usize, width: usize, height: usize) -> (f64, f64) {
        (self.x_at(col, width), self.y_at(row, height))
    }

    /// The x coordinate of every pixel; constant down each column.
    pub fn x_grid(&self, width: usize, height: usize) -> Grid<f64> {
        let xs: Vec<f64> = (0..width).map(|col| self.x_at(col, width)).collect();
        Grid::from_fn(width, height, |col, _| xs[col])
    }

    /// The y coordinate of every pixel; constant along each row.
    pub fn y_grid(&self, width: usize, height: usize) -> Grid<f64> {
        let ys: Vec<f64> = (0..height).map(|row| self.y_at(row, height)).collect();
        Grid::from_fn(width, height, |_, row| ys[row])
    }

    /// The pair of coordinate grids `(X, Y)`.
    pub fn grids(&self, width: usize, height: usize) -> (Grid<f64>, Grid<f64>) {
        (self.x_grid(width, height), self.y_grid(width, height))
    }

    /// Distance of every pixel from the origin.
    pub fn r_grid(&self, width: usize, height: usize) -> Grid<f64> {
        Grid::from_fn(width, height, |col, row| {
            let (x, y) = self.point(col, row, width, height);
            x.hypot(y)
        })
    }

    /// Angle of every pixel about the origin, in `(-pi, pi]`.
    pub fn t_grid(&self, width: usize, height: usize) -> Grid<f64> {
        Grid::from_fn(width, height, |col, row| {
            let (x, y) = self.point(col, row, width, height);
            y.atan2(x)
        })
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            xmin: -1.0,
            xmax: 1.0,
            ymin: -1.0,
            ymax: 1.0,
        }
    }
}

/// Sample `i` of `n` evenly spaced values from `start` to `stop` inclusive.
fn linspace(start: f64, stop: f64, i: usize, n: usize) -> f64 {
    if n <= 1 {
        return start;
    }
    start + (stop - start) * (i as f64 / (n - 1) as f64)
}
