//! Borrowed rectangular regions of an image.

use std::fmt;
use std::ops::RangeBounds;

use crate::error::Result;
use crate::types::{Colour, Grid};

use super::channel::{
    read_lanes, read_pixel, write_lanes, ChannelFill, Region, ALPHA, BLUE, COLOR, GREEN, RED,
};
use super::Image;

/// A read-only window onto an image.
#[derive(Clone, Copy)]
pub struct ImageView<'a> {
    pixels: &'a [u8],
    region: Region,
}

impl<'a> ImageView<'a> {
    pub(crate) fn new(pixels: &'a [u8], region: Region) -> Self {
        Self { pixels, region }
    }

    pub fn width(&self) -> usize {
        self.region.width
    }

    pub fn height(&self) -> usize {
        self.region.height
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.region.height, self.region.width, 4)
    }

    /// The pixel at `(x, y)` relative to the view.
    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        read_pixel(self.pixels, &self.region, x, y)
    }

    /// A smaller window; ranges are relative to this view.
    pub fn view(&self, xs: impl RangeBounds<usize>, ys: impl RangeBounds<usize>) -> ImageView<'a> {
        ImageView::new(self.pixels, self.region.sub(xs, ys))
    }

    pub fn red(&self) -> Grid<u8> {
        read_lanes(self.pixels, &self.region, RED)
    }

    pub fn green(&self) -> Grid<u8> {
        read_lanes(self.pixels, &self.region, GREEN)
    }

    pub fn blue(&self) -> Grid<u8> {
        read_lanes(self.pixels, &self.region, BLUE)
    }

    pub fn alpha(&self) -> Grid<u8> {
        read_lanes(self.pixels, &self.region, ALPHA)
    }

    pub fn color(&self) -> Grid<[u8; 3]> {
        read_lanes(self.pixels, &self.region, COLOR)
    }

    /// Copy the region into a new, owned image.
    pub fn to_image(&self) -> Image {
        let pixels = self
            .region
            .offsets()
            .flat_map(|offset| self.pixels[offset..offset + 4].iter().copied())
            .collect();

        Image {
            width: self.region.width,
            height: self.region.height,
            pixels,
        }
    }
}

impl fmt::Debug for ImageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageView")
            .field("x", &self.region.x0)
            .field("y", &self.region.y0)
            .field("width", &self.region.width)
            .field("height", &self.region.height)
            .finish()
    }
}

/// A mutable window onto an image. Writes land in the parent buffer.
pub struct ImageViewMut<'a> {
    pixels: &'a mut [u8],
    region: Region,
}

impl<'a> ImageViewMut<'a> {
    pub(crate) fn new(pixels: &'a mut [u8], region: Region) -> Self {
        Self { pixels, region }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> ImageView<'_> {
        ImageView::new(&*self.pixels, self.region)
    }

    pub fn width(&self) -> usize {
        self.region.width
    }

    pub fn height(&self) -> usize {
        self.region.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        read_pixel(&*self.pixels, &self.region, x, y)
    }

    /// Set the pixel at `(x, y)`, returning false when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, colour: Colour) -> bool {
        if !self.region.contains(x, y) {
            return false;
        }
        let offset = self.region.offset(x, y);
        self.pixels[offset..offset + 4].copy_from_slice(&colour.to_rgba());
        true
    }

    /// Set every pixel in the view to `colour`.
    pub fn fill(&mut self, colour: Colour) {
        let rgba = colour.to_rgba();
        let region = self.region;
        for offset in region.offsets() {
            self.pixels[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    /// A smaller mutable window; ranges are relative to this view.
    pub fn view_mut(
        &mut self,
        xs: impl RangeBounds<usize>,
        ys: impl RangeBounds<usize>,
    ) -> ImageViewMut<'_> {
        let region = self.region.sub(xs, ys);
        ImageViewMut::new(&mut *self.pixels, region)
    }

    pub fn red(&self) -> Grid<u8> {
        self.as_view().red()
    }

    pub fn green(&self) -> Grid<u8> {
        self.as_view().green()
    }

    pub fn blue(&self) -> Grid<u8> {
        self.as_view().blue()
    }

    pub fn alpha(&self) -> Grid<u8> {
        self.as_view().alpha()
    }

    pub fn color(&self) -> Grid<[u8; 3]> {
        self.as_view().color()
    }

    pub fn set_red(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        write_lanes(&mut *self.pixels, &self.region, RED, value.into())
    }

    pub fn set_green(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        write_lanes(&mut *self.pixels, &self.region, GREEN, value.into())
    }

    pub fn set_blue(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        write_lanes(&mut *self.pixels, &self.region, BLUE, value.into())
    }

    pub fn set_alpha(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        write_lanes(&mut *self.pixels, &self.region, ALPHA, value.into())
    }

    pub fn set_color(&mut self, value: impl Into<ChannelFill<[u8; 3]>>) -> Result<()> {
        write_lanes(&mut *self.pixels, &self.region, COLOR, value.into())
    }
}

impl fmt::Debug for ImageViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_view(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_PX: Colour = Colour::rgb(255, 0, 0);

    #[test]
    fn test_view_writes_reach_parent() {
        for k in 1..=4 {
            let mut image = Image::new(4, 4);
            image.view_mut(..k, ..k).fill(RED_PX);

            for y in 0..4 {
                for x in 0..4 {
                    let expected = if x < k && y < k { RED_PX } else { Colour::WHITE };
                    assert_eq!(image.get(x, y), Some(expected), "k={k} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_view_dimensions_clamp() {
        let image = Image::new(4, 3);
        for k in 0..6 {
            let view = image.view(..k, ..);
            assert_eq!(view.width(), k.min(4));
            assert_eq!(view.height(), 3);
        }

        let view = image.view(2.., 1..2);
        assert_eq!(view.shape(), (1, 2, 4));
        assert!(view.get(2, 0).is_none());
    }

    #[test]
    fn test_nested_views_are_relative() {
        let mut image = Image::new(6, 6);
        {
            let mut outer = image.view_mut(2.., 2..);
            let mut inner = outer.view_mut(1..2, 1..2);
            assert!(inner.set(0, 0, RED_PX));
            assert!(!inner.set(1, 0, RED_PX));
        }
        assert_eq!(image.get(3, 3), Some(RED_PX));
        assert_eq!(image.get(2, 2), Some(Colour::WHITE));
    }

    #[test]
    fn test_view_channel_write() {
        let mut image = Image::new(3, 3);
        image.view_mut(1.., ..1).set_green(0u8).unwrap();

        assert_eq!(image.green().as_slice(), &[255, 0, 0, 255, 255, 255, 255, 255, 255]);
        assert!(image.view_mut(1.., ..1).set_red(&[1u8, 2, 3][..]).is_err());
    }

    #[test]
    fn test_to_image_copies_region() {
        let mut image = Image::new(3, 2);
        image.set(2, 1, RED_PX);
        let copy = image.view(1.., 1..).to_image();
        assert_eq!(copy.to_string(), "2x1 Image");
        assert_eq!(copy.get(1, 0), Some(RED_PX));
    }
}
