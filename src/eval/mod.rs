//! Mask and colour evaluation over a coordinate domain.
//!
//! A `CoordFn` is a function of the pixel coordinates tagged with the
//! `Signature` it expects. `compute_mask` samples a boolean `CoordFn` over
//! every pixel; `compute_color` samples a colour `CoordFn` at the pixels a
//! mask selects.

mod signature;

use std::fmt;

use crate::error::{ArlunioError, Result};
use crate::types::{Colour, ColourValue, Domain, Grid};

pub use signature::Signature;

/// A boolean predicate over the plane.
pub type MaskFn = CoordFn<bool>;

/// A colour function over the plane.
pub type ColorFn = CoordFn<ColourValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    R,
    T,
}

impl Axis {
    fn pick(self, x: f64, y: f64) -> f64 {
        match self {
            Axis::X => x,
            Axis::Y => y,
            Axis::R => x.hypot(y),
            Axis::T => y.atan2(x),
        }
    }

    fn grid(self, domain: &Domain, width: usize, height: usize) -> Grid<f64> {
        match self {
            Axis::X => domain.x_grid(width, height),
            Axis::Y => domain.y_grid(width, height),
            Axis::R => domain.r_grid(width, height),
            Axis::T => domain.t_grid(width, height),
        }
    }
}

type Nullary<T> = Box<dyn Fn() -> T + Send + Sync>;
type Unary<T> = Box<dyn Fn(f64) -> T + Send + Sync>;
type Binary<T> = Box<dyn Fn(f64, f64) -> T + Send + Sync>;

enum Kernel<T> {
    Constant(Nullary<T>),
    Single(Axis, Unary<T>),
    Pair(Binary<T>),
}

/// A function of pixel coordinates with a fixed signature.
pub struct CoordFn<T> {
    kernel: Kernel<T>,
}

impl<T: 'static> CoordFn<T> {
    /// A function of no coordinates. It is called once per evaluation.
    pub fn nullary<R: Into<T>>(f: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Self::with(Kernel::Constant(Box::new(move || f().into())))
    }

    /// The same value everywhere.
    pub fn constant(value: impl Into<T>) -> Self
    where
        T: Clone + Send + Sync,
    {
        let value = value.into();
        Self::with(Kernel::Constant(Box::new(move || value.clone())))
    }

    pub fn of_x<R: Into<T>>(f: impl Fn(f64) -> R + Send + Sync + 'static) -> Self {
        Self::single(Axis::X, f)
    }

    pub fn of_y<R: Into<T>>(f: impl Fn(f64) -> R + Send + Sync + 'static) -> Self {
        Self::single(Axis::Y, f)
    }

    pub fn of_r<R: Into<T>>(f: impl Fn(f64) -> R + Send + Sync + 'static) -> Self {
        Self::single(Axis::R, f)
    }

    pub fn of_t<R: Into<T>>(f: impl Fn(f64) -> R + Send + Sync + 'static) -> Self {
        Self::single(Axis::T, f)
    }

    pub fn of_xy<R: Into<T>>(f: impl Fn(f64, f64) -> R + Send + Sync + 'static) -> Self {
        Self::with(Kernel::Pair(Box::new(move |x, y| f(x, y).into())))
    }

    /// Build from a parameter name list and a function taking the
    /// coordinates in that order.
    ///
    /// ```ignore
    /// let above = MaskFn::from_params(&["y", "x"], |args| args[0] > args[1])?;
    /// ```
    pub fn from_params<R: Into<T>>(
        names: &[&str],
        f: impl Fn(&[f64]) -> R + Send + Sync + 'static,
    ) -> Result<Self> {
        let coord_fn = match Signature::from_params(names)? {
            Signature::NoArgs => Self::nullary(move || f(&[])),
            Signature::X => Self::of_x(move |v| f(&[v])),
            Signature::Y => Self::of_y(move |v| f(&[v])),
            Signature::R => Self::of_r(move |v| f(&[v])),
            Signature::T => Self::of_t(move |v| f(&[v])),
            Signature::XY if names[0] == "x" => Self::of_xy(move |x, y| f(&[x, y])),
            Signature::XY => Self::of_xy(move |x, y| f(&[y, x])),
        };
        Ok(coord_fn)
    }

    fn single<R: Into<T>>(axis: Axis, f: impl Fn(f64) -> R + Send + Sync + 'static) -> Self {
        Self::with(Kernel::Single(axis, Box::new(move |v| f(v).into())))
    }

    fn with(kernel: Kernel<T>) -> Self {
        Self { kernel }
    }
}

impl<T> CoordFn<T> {
    pub fn signature(&self) -> Signature {
        match &self.kernel {
            Kernel::Constant(_) => Signature::NoArgs,
            Kernel::Single(Axis::X, _) => Signature::X,
            Kernel::Single(Axis::Y, _) => Signature::Y,
            Kernel::Single(Axis::R, _) => Signature::R,
            Kernel::Single(Axis::T, _) => Signature::T,
            Kernel::Pair(_) => Signature::XY,
        }
    }

    /// Evaluate at the point `(x, y)`.
    pub fn call(&self, x: f64, y: f64) -> T {
        match &self.kernel {
            Kernel::Constant(f) => f(),
            Kernel::Single(axis, f) => f(axis.pick(x, y)),
            Kernel::Pair(f) => f(x, y),
        }
    }

    /// Evaluate at every pixel of a `width x height` raster.
    ///
    /// Only the coordinate grids the signature needs are built; a
    /// constant function is called once and broadcast.
    pub fn sample(&self, domain: &Domain, width: usize, height: usize) -> Grid<T>
    where
        T: Clone,
    {
        match &self.kernel {
            Kernel::Constant(f) => Grid::filled(width, height, f()),
            Kernel::Single(axis, f) => axis.grid(domain, width, height).map(|&v| f(v)),
            Kernel::Pair(f) => {
                let xs = domain.x_grid(width, height);
                let ys = domain.y_grid(width, height);
                Grid::from_fn(width, height, |col, row| {
                    let i = row * width + col;
                    f(xs.as_slice()[i], ys.as_slice()[i])
                })
            }
        }
    }
}

impl<T> fmt::Debug for CoordFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoordFn{}", self.signature())
    }
}

/// Evaluate `predicate` over a `width x height` raster of `domain`.
///
/// The result always has shape `(height, width)`.
pub fn compute_mask(
    domain: &Domain,
    predicate: &MaskFn,
    width: usize,
    height: usize,
) -> Result<Grid<bool>> {
    check_dimensions(width, height)?;
    tracing::trace!(signature = %predicate.signature(), width, height, "computing mask");

    Ok(predicate.sample(domain, width, height))
}

/// Evaluate `color_fn` at the pixels `mask` selects, in row-major order.
///
/// Without a colour function every selected pixel is opaque black.
pub fn compute_color(
    domain: &Domain,
    mask: &Grid<bool>,
    color_fn: Option<&ColorFn>,
    width: usize,
    height: usize,
) -> Result<Vec<Colour>> {
    check_dimensions(width, height)?;
    if mask.shape() != (height, width) {
        return Err(ArlunioError::evaluation(format!(
            "Mask of shape {:?} does not match the raster shape {:?}",
            mask.shape(),
            (height, width)
        )));
    }

    let count = mask.count_true();
    tracing::trace!(
        signature = %color_fn.map_or(Signature::NoArgs, |f| f.signature()),
        count,
        "computing colours"
    );

    let Some(color_fn) = color_fn else {
        return Ok(vec![Colour::BLACK; count]);
    };

    if color_fn.signature() == Signature::NoArgs {
        let colour = color_fn.call(0.0, 0.0).normalise()?;
        return Ok(vec![colour; count]);
    }

    mask.positions()
        .map(|(col, row)| {
            let (x, y) = domain.point(col, row, width, height);
            color_fn.call(x, y).normalise()
        })
        .collect()
}

pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ArlunioError::evaluation(format!(
            "Cannot evaluate over a {}x{} raster",
            width, height
        ))
        .with_help("Width and height must both be positive"));
    }
    if crate::image::buffer_len(width, height).is_err() {
        return Err(ArlunioError::evaluation(format!(
            "Cannot evaluate over a {}x{} raster, it is too large",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn domain() -> Domain {
        Domain::default()
    }

    #[test]
    fn test_nullary_mask_is_all_true() {
        let mask = compute_mask(&domain(), &MaskFn::nullary(|| true), 7, 4).unwrap();
        assert_eq!(mask.shape(), (4, 7));
        assert!(mask.all());
    }

    #[test]
    fn test_nullary_called_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let predicate = MaskFn::nullary(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        let mask = compute_mask(&domain(), &predicate, 5, 5).unwrap();
        assert!(!mask.any());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_x_midpoint_mask() {
        let (width, height) = (10, 6);
        let mask = compute_mask(&domain(), &MaskFn::of_x(|x| x < 0.0), width, height).unwrap();

        assert_eq!(mask.shape(), (height, width));
        for row in mask.rows() {
            assert_eq!(row, mask.rows().next().unwrap());
        }
        assert_eq!(mask.count_true(), width * height / 2);
    }

    #[test]
    fn test_y_and_xy_masks() {
        let above = compute_mask(&domain(), &MaskFn::of_y(|y| y > 0.0), 4, 4).unwrap();
        assert!(above.get(0, 0).copied().unwrap());
        assert!(!above.get(0, 3).copied().unwrap());

        let diagonal = compute_mask(&domain(), &MaskFn::of_xy(|x, y| x > y), 3, 3).unwrap();
        assert_eq!(
            diagonal.as_slice(),
            &[false, false, false, false, false, true, false, true, true]
        );
    }

    #[test]
    fn test_polar_masks() {
        let disc = compute_mask(&domain(), &MaskFn::of_r(|r| r < 0.5), 5, 5).unwrap();
        assert_eq!(disc.count_true(), 1);
        assert!(disc.get(2, 2).copied().unwrap());

        let right = compute_mask(&domain(), &MaskFn::of_t(|t| t.abs() < 0.1), 5, 5).unwrap();
        assert!(right.get(4, 2).copied().unwrap());
        assert!(!right.get(0, 2).copied().unwrap());
    }

    #[test]
    fn test_from_params_keeps_declared_order() {
        let xy = MaskFn::from_params(&["x", "y"], |a| a[0] > a[1]).unwrap();
        let yx = MaskFn::from_params(&["y", "x"], |a| a[0] > a[1]).unwrap();

        assert_eq!(xy.signature(), Signature::XY);
        assert!(xy.call(1.0, 0.0));
        assert!(!yx.call(1.0, 0.0));

        assert!(MaskFn::from_params(&["z"], |_| true).is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(compute_mask(&domain(), &MaskFn::constant(true), 0, 3).is_err());
        let mask = Grid::filled(3, 3, true);
        assert!(compute_color(&domain(), &mask, None, 3, 0).is_err());
    }

    #[test]
    fn test_huge_dimensions_rejected() {
        let err = compute_mask(&domain(), &MaskFn::constant(true), usize::MAX, 2).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_default_colour_is_black() {
        let mask = Grid::from_fn(4, 3, |x, _| x % 2 == 0);
        let colours = compute_color(&domain(), &mask, None, 4, 3).unwrap();
        assert_eq!(colours.len(), mask.count_true());
        assert!(colours.iter().all(|&c| c == Colour::new(0, 0, 0, 255)));
    }

    #[test]
    fn test_constant_colours() {
        let mask = Grid::from_fn(3, 3, |x, y| x <= y);

        let rgb = ColorFn::nullary(|| [1u8, 2, 3]);
        let colours = compute_color(&domain(), &mask, Some(&rgb), 3, 3).unwrap();
        assert_eq!(colours, vec![Colour::new(1, 2, 3, 255); 6]);

        let rgba = ColorFn::constant([1u8, 2, 3, 4]);
        let colours = compute_color(&domain(), &mask, Some(&rgba), 3, 3).unwrap();
        assert_eq!(colours, vec![Colour::new(1, 2, 3, 4); 6]);
    }

    #[test]
    fn test_per_pixel_colours_follow_mask_order() {
        let mask = Grid::from_fn(3, 1, |x, _| x != 1);
        let by_x = ColorFn::of_x(|x: f64| [((x + 1.0) * 100.0) as u8, 0, 0]);
        let colours = compute_color(&domain(), &mask, Some(&by_x), 3, 1).unwrap();
        assert_eq!(colours, vec![Colour::rgb(0, 0, 0), Colour::rgb(200, 0, 0)]);
    }

    #[test]
    fn test_bad_colour_arity() {
        let mask = Grid::filled(2, 2, true);
        let two = ColorFn::nullary(|| vec![1u8, 2]);
        let err = compute_color(&domain(), &mask, Some(&two), 2, 2).unwrap_err();
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_mask_shape_checked() {
        let mask = Grid::filled(2, 3, true);
        assert!(compute_color(&domain(), &mask, None, 3, 2).is_err());
    }
}
