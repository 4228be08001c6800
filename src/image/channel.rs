//! Channel access shared by images and views.

use std::marker::PhantomData;
use std::ops::{Bound, RangeBounds};

use crate::error::{ArlunioError, Result};
use crate::types::{Colour, Grid};

/// A value stored in consecutive bytes of a pixel.
pub trait ChannelValue: Copy {
    /// Number of bytes per pixel.
    const LEN: usize;

    fn from_bytes(bytes: &[u8]) -> Self;

    fn write_to(&self, bytes: &mut [u8]);
}

impl ChannelValue for u8 {
    const LEN: usize = 1;

    fn from_bytes(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn write_to(&self, bytes: &mut [u8]) {
        bytes[0] = *self;
    }
}

impl ChannelValue for [u8; 3] {
    const LEN: usize = 3;

    fn from_bytes(bytes: &[u8]) -> Self {
        [bytes[0], bytes[1], bytes[2]]
    }

    fn write_to(&self, bytes: &mut [u8]) {
        bytes[..3].copy_from_slice(self);
    }
}

/// A value to assign to a channel.
///
/// Raw bytes broadcast like an array: one value (of `LEN` bytes) for the
/// whole image, or one per pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelFill<T> {
    Uniform(T),
    PerPixel(Grid<T>),
    Raw(Vec<u8>),
}

impl From<u8> for ChannelFill<u8> {
    fn from(value: u8) -> Self {
        ChannelFill::Uniform(value)
    }
}

impl From<[u8; 3]> for ChannelFill<[u8; 3]> {
    fn from(value: [u8; 3]) -> Self {
        ChannelFill::Uniform(value)
    }
}

impl From<(u8, u8, u8)> for ChannelFill<[u8; 3]> {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        ChannelFill::Uniform([r, g, b])
    }
}

impl From<Colour> for ChannelFill<[u8; 3]> {
    fn from(colour: Colour) -> Self {
        ChannelFill::Uniform(colour.to_rgb())
    }
}

impl<T> From<Grid<T>> for ChannelFill<T> {
    fn from(grid: Grid<T>) -> Self {
        ChannelFill::PerPixel(grid)
    }
}

impl<T> From<&[u8]> for ChannelFill<T> {
    fn from(bytes: &[u8]) -> Self {
        ChannelFill::Raw(bytes.to_vec())
    }
}

impl<T> From<Vec<u8>> for ChannelFill<T> {
    fn from(bytes: Vec<u8>) -> Self {
        ChannelFill::Raw(bytes)
    }
}

/// Where a channel starts within a pixel.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lane<T> {
    first: usize,
    _value: PhantomData<T>,
}

impl<T> Lane<T> {
    const fn at(first: usize) -> Self {
        Self {
            first,
            _value: PhantomData,
        }
    }
}

pub(crate) const RED: Lane<u8> = Lane::at(0);
pub(crate) const GREEN: Lane<u8> = Lane::at(1);
pub(crate) const BLUE: Lane<u8> = Lane::at(2);
pub(crate) const ALPHA: Lane<u8> = Lane::at(3);
pub(crate) const COLOR: Lane<[u8; 3]> = Lane::at(0);

/// A rectangle of pixels inside a buffer whose rows are `stride` pixels wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub x0: usize,
    pub y0: usize,
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl Region {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            y0: 0,
            width,
            height,
            stride: width,
        }
    }

    /// A sub-rectangle, with ranges relative to this region and clamped to it.
    pub fn sub(&self, xs: impl RangeBounds<usize>, ys: impl RangeBounds<usize>) -> Self {
        let (x_start, x_end) = clamp_range(&xs, self.width);
        let (y_start, y_end) = clamp_range(&ys, self.height);

        Self {
            x0: self.x0 + x_start,
            y0: self.y0 + y_start,
            width: x_end - x_start,
            height: y_end - y_start,
            stride: self.stride,
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Byte offset of local pixel `(x, y)` in the backing buffer.
    pub fn offset(&self, x: usize, y: usize) -> usize {
        ((self.y0 + y) * self.stride + self.x0 + x) * 4
    }

    /// Byte offsets of every pixel, row-major.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| self.offset(x, y)))
    }
}

fn clamp_range(range: &impl RangeBounds<usize>, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };

    let end = end.min(len);
    (start.min(end), end)
}

pub(crate) fn read_pixel(buf: &[u8], region: &Region, x: usize, y: usize) -> Option<Colour> {
    if !region.contains(x, y) {
        return None;
    }
    let offset = region.offset(x, y);
    let px = &buf[offset..offset + 4];
    Some(Colour::new(px[0], px[1], px[2], px[3]))
}

pub(crate) fn read_lanes<T: ChannelValue>(buf: &[u8], region: &Region, lane: Lane<T>) -> Grid<T> {
    Grid::from_fn(region.width, region.height, |x, y| {
        let offset = region.offset(x, y) + lane.first;
        T::from_bytes(&buf[offset..offset + T::LEN])
    })
}

/// Write `fill` into the lane. Validates everything before the first write.
pub(crate) fn write_lanes<T: ChannelValue>(
    buf: &mut [u8],
    region: &Region,
    lane: Lane<T>,
    fill: ChannelFill<T>,
) -> Result<()> {
    let cells = region.width * region.height;
    let target = target_shape::<T>(region);

    let values: Vec<T> = match fill {
        ChannelFill::Uniform(value) => vec![value; cells],
        ChannelFill::PerPixel(grid) => {
            if grid.shape() != (region.height, region.width) {
                let (h, w) = grid.shape();
                return Err(broadcast_error(&format!("({}, {})", h, w), &target));
            }
            grid.into_vec()
        }
        ChannelFill::Raw(bytes) if bytes.len() == T::LEN => vec![T::from_bytes(&bytes); cells],
        ChannelFill::Raw(bytes) if bytes.len() == cells * T::LEN => {
            bytes.chunks(T::LEN).map(T::from_bytes).collect()
        }
        ChannelFill::Raw(bytes) => {
            return Err(broadcast_error(&format!("({},)", bytes.len()), &target));
        }
    };

    for (offset, value) in region.offsets().zip(values) {
        let start = offset + lane.first;
        value.write_to(&mut buf[start..start + T::LEN]);
    }

    Ok(())
}

fn target_shape<T: ChannelValue>(region: &Region) -> String {
    if T::LEN == 1 {
        format!("({}, {})", region.height, region.width)
    } else {
        format!("({}, {}, {})", region.height, region.width, T::LEN)
    }
}

fn broadcast_error(given: &str, target: &str) -> ArlunioError {
    ArlunioError::image(format!(
        "Could not broadcast a value of shape {} into channels of shape {}",
        given, target
    ))
    .with_help("Assign a single value or one value per pixel")
}
