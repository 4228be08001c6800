//! RGBA images.
//!
//! An `Image` owns a `(height, width, 4)` byte buffer. Channels can be read
//! out as grids and assigned from a single value, a grid, or raw bytes that
//! broadcast across the image. Rectangular views borrow the buffer, so
//! writes through a mutable view land in the parent image.
//!
//! # Example
//!
//! ```ignore
//! use arlunio::image::Image;
//!
//! let mut image = Image::builder().width(4).height(4).background([10u8, 20, 30]).build()?;
//! image.view_mut(..2, ..2).fill(Colour::rgb(255, 0, 0));
//! assert_eq!(image.get(0, 0), Some(Colour::rgb(255, 0, 0)));
//! ```

mod channel;
mod png;
mod view;

use std::fmt;
use std::ops::RangeBounds;

use crate::error::{ArlunioError, Result};
use crate::types::{Colour, ColourValue, Grid};

pub use channel::{ChannelFill, ChannelValue};
pub use view::{ImageView, ImageViewMut};

use channel::{read_lanes, write_lanes, Region, ALPHA, BLUE, COLOR, GREEN, RED};

/// A pixel buffer with shape `(height, width, 4)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Image {
    /// Start building an image.
    pub fn builder() -> ImageBuilder {
        ImageBuilder::default()
    }

    /// An opaque white image.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Colour::WHITE)
    }

    /// An image with every pixel set to `colour`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`. `Image::builder()`
    /// reports this as an error instead.
    pub fn filled(width: usize, height: usize, colour: Colour) -> Self {
        let pixels = colour
            .to_rgba()
            .iter()
            .copied()
            .cycle()
            .take(width * height * 4)
            .collect();

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap an existing pixel array with the given shape.
    ///
    /// The shape must be `[h, w, 4]` and match the length of `pixels`.
    pub fn from_array(shape: &[usize], pixels: Vec<u8>) -> Result<Self> {
        match *shape {
            [height, width, 4] if buffer_len(width, height).ok() == Some(pixels.len()) => Ok(Self {
                width,
                height,
                pixels,
            }),
            _ => Err(ArlunioError::image(format!(
                "Pixel array must have shape: (h,w,4), got {:?} with {} values",
                shape,
                pixels.len()
            ))),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The shape as `(height, width, 4)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, 4)
    }

    /// The raw row-major RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Get the pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        self.view(.., ..).get(x, y)
    }

    /// Set the pixel at `(x, y)`, returning false when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, colour: Colour) -> bool {
        self.view_mut(.., ..).set(x, y, colour)
    }

    /// Borrow a rectangular region. Ranges clamp to the image.
    pub fn view(&self, xs: impl RangeBounds<usize>, ys: impl RangeBounds<usize>) -> ImageView<'_> {
        let region = self.full_region().sub(xs, ys);
        ImageView::new(&self.pixels, region)
    }

    /// Mutably borrow a rectangular region. Ranges clamp to the image.
    pub fn view_mut(
        &mut self,
        xs: impl RangeBounds<usize>,
        ys: impl RangeBounds<usize>,
    ) -> ImageViewMut<'_> {
        let region = self.full_region().sub(xs, ys);
        ImageViewMut::new(&mut self.pixels, region)
    }

    pub fn red(&self) -> Grid<u8> {
        read_lanes(&self.pixels, &self.full_region(), RED)
    }

    pub fn green(&self) -> Grid<u8> {
        read_lanes(&self.pixels, &self.full_region(), GREEN)
    }

    pub fn blue(&self) -> Grid<u8> {
        read_lanes(&self.pixels, &self.full_region(), BLUE)
    }

    pub fn alpha(&self) -> Grid<u8> {
        read_lanes(&self.pixels, &self.full_region(), ALPHA)
    }

    /// The RGB channels of every pixel.
    pub fn color(&self) -> Grid<[u8; 3]> {
        read_lanes(&self.pixels, &self.full_region(), COLOR)
    }

    pub fn set_red(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        let region = self.full_region();
        write_lanes(&mut self.pixels, &region, RED, value.into())
    }

    pub fn set_green(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        let region = self.full_region();
        write_lanes(&mut self.pixels, &region, GREEN, value.into())
    }

    pub fn set_blue(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        let region = self.full_region();
        write_lanes(&mut self.pixels, &region, BLUE, value.into())
    }

    pub fn set_alpha(&mut self, value: impl Into<ChannelFill<u8>>) -> Result<()> {
        let region = self.full_region();
        write_lanes(&mut self.pixels, &region, ALPHA, value.into())
    }

    pub fn set_color(&mut self, value: impl Into<ChannelFill<[u8; 3]>>) -> Result<()> {
        let region = self.full_region();
        write_lanes(&mut self.pixels, &region, COLOR, value.into())
    }

    /// Assign `colours` to the set cells of `mask`, in row-major order.
    pub fn fill_mask(&mut self, mask: &Grid<bool>, colours: &[Colour]) -> Result<()> {
        self.apply_mask(mask, colours, |src, _| src)
    }

    /// Blend `colours` over the set cells of `mask` (source-over).
    pub fn composite(&mut self, mask: &Grid<bool>, colours: &[Colour]) -> Result<()> {
        self.apply_mask(mask, colours, Colour::over)
    }

    fn apply_mask(
        &mut self,
        mask: &Grid<bool>,
        colours: &[Colour],
        blend: impl Fn(Colour, Colour) -> Colour,
    ) -> Result<()> {
        if mask.shape() != (self.height, self.width) {
            return Err(ArlunioError::image(format!(
                "Mask of shape {:?} does not match a {}",
                mask.shape(),
                self
            )));
        }

        let selected = mask.count_true();
        if selected != colours.len() {
            return Err(ArlunioError::image(format!(
                "Mask selects {} pixels but {} colours were given",
                selected,
                colours.len()
            )));
        }

        for ((x, y), &colour) in mask.positions().zip(colours) {
            let offset = (y * self.width + x) * 4;
            let px = &mut self.pixels[offset..offset + 4];
            let dst = Colour::new(px[0], px[1], px[2], px[3]);
            px.copy_from_slice(&blend(colour, dst).to_rgba());
        }

        Ok(())
    }

    fn full_region(&self) -> Region {
        Region::full(self.width, self.height)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width, self.height)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Builder for `Image`.
///
/// Takes either a width and height (with an optional background) or an
/// existing pixel array, never both.
#[derive(Debug, Default)]
pub struct ImageBuilder {
    width: Option<usize>,
    height: Option<usize>,
    background: Option<ColourValue>,
    pixels: Option<(Vec<usize>, Vec<u8>)>,
}

impl ImageBuilder {
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: usize) -> Self {
        self.height = Some(height);
        self
    }

    /// Background colour; RGB values get an opaque alpha.
    pub fn background(mut self, background: impl Into<ColourValue>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Use an existing pixel array with the given shape.
    pub fn pixels(mut self, shape: &[usize], pixels: Vec<u8>) -> Self {
        self.pixels = Some((shape.to_vec(), pixels));
        self
    }

    pub fn build(self) -> Result<Image> {
        if let Some((shape, pixels)) = self.pixels {
            if self.width.is_some() || self.height.is_some() || self.background.is_some() {
                return Err(ArlunioError::image(
                    "Give either a pixel array or a width and height, not both",
                ));
            }
            return Image::from_array(&shape, pixels);
        }

        let (Some(width), Some(height)) = (self.width, self.height) else {
            return Err(ArlunioError::image("You must specify a width and height")
                .with_help("Alternatively pass an existing pixel array"));
        };

        let background = match self.background {
            Some(value) => value
                .normalise()
                .map_err(|e| ArlunioError::image(format!("Invalid background: {e}")))?,
            None => Colour::WHITE,
        };

        buffer_len(width, height)?;
        Ok(Image::filled(width, height, background))
    }
}

/// Number of bytes in a `width x height` RGBA buffer.
pub(crate) fn buffer_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| {
            ArlunioError::image(format!("An image of {}x{} is too large", width, height))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unique_pixels(image: &Image) -> Vec<[u8; 4]> {
        let mut seen: Vec<[u8; 4]> = image
            .pixels()
            .chunks(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();
        seen.sort();
        seen.dedup();
        seen
    }

    #[test]
    fn test_new_is_opaque_white() {
        let image = Image::builder().width(7).height(3).build().unwrap();
        assert_eq!(image.shape(), (3, 7, 4));
        assert_eq!(image.pixels().len(), 3 * 7 * 4);
        assert_eq!(unique_pixels(&image), vec![[255, 255, 255, 255]]);
    }

    #[test]
    fn test_rgb_background_gets_opaque_alpha() {
        let image = Image::builder()
            .width(5)
            .height(4)
            .background((10u8, 20u8, 30u8))
            .build()
            .unwrap();
        assert_eq!(unique_pixels(&image), vec![[10, 20, 30, 255]]);
    }

    #[test]
    fn test_rgba_background_used_verbatim() {
        let image = Image::builder()
            .width(5)
            .height(4)
            .background([10u8, 20, 30, 40])
            .build()
            .unwrap();
        assert_eq!(unique_pixels(&image), vec![[10, 20, 30, 40]]);
    }

    #[test]
    fn test_missing_dimensions() {
        for builder in [
            Image::builder(),
            Image::builder().width(12),
            Image::builder().height(12),
        ] {
            let err = builder.build().unwrap_err();
            assert!(err.to_string().contains("specify a width and height"));
        }
    }

    #[test]
    fn test_pixels_exclude_dimensions() {
        let both = Image::builder().width(2).height(2).pixels(&[2, 2, 4], vec![0; 16]);
        let err = both.build().unwrap_err();
        assert!(err.to_string().contains("not both"));

        let with_background = Image::builder()
            .background([1u8, 2, 3])
            .pixels(&[2, 2, 4], vec![0; 16]);
        assert!(with_background.build().is_err());
    }

    #[test]
    fn test_huge_dimensions_rejected() {
        let err = Image::builder().width(usize::MAX).height(2).build().unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(Image::from_array(&[usize::MAX, 2, 4], vec![0; 8]).is_err());
    }

    #[test]
    fn test_from_pixels() {
        let pixels: Vec<u8> = (0..3 * 2 * 4).map(|i| i as u8).collect();
        let image = Image::builder().pixels(&[3, 2, 4], pixels.clone()).build().unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 3);
        assert_eq!(image.pixels(), &pixels[..]);

        let same = Image::from_array(&[3, 2, 4], pixels).unwrap();
        assert_eq!(same, image);
    }

    #[test]
    fn test_bad_pixel_shapes() {
        let err = Image::from_array(&[3, 2], vec![0; 6]).unwrap_err();
        assert!(err.to_string().contains("must have shape:"));

        let err = Image::from_array(&[3, 2, 5], vec![0; 30]).unwrap_err();
        assert!(err.to_string().contains("must have shape:"));

        let err = Image::from_array(&[3, 2, 4], vec![0; 23]).unwrap_err();
        assert!(err.to_string().contains("must have shape:"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Image::new(12, 5).to_string(), "12x5 Image");
    }

    #[test]
    fn test_channel_reads() {
        let image = Image::filled(3, 2, Colour::new(1, 2, 3, 4));
        assert_eq!(image.red().shape(), (2, 3));
        assert!(image.red().iter().all(|&v| v == 1));
        assert!(image.green().iter().all(|&v| v == 2));
        assert!(image.blue().iter().all(|&v| v == 3));
        assert!(image.alpha().iter().all(|&v| v == 4));
        assert!(image.color().iter().all(|&v| v == [1, 2, 3]));
    }

    #[test]
    fn test_channel_writes() {
        let mut image = Image::new(3, 2);
        image.set_red(7u8).unwrap();
        image.set_alpha(9u8).unwrap();
        image.set_color([1u8, 2, 3]).unwrap();

        assert_eq!(unique_pixels(&image), vec![[1, 2, 3, 9]]);
    }

    #[test]
    fn test_channel_write_from_grid() {
        let mut image = Image::new(2, 2);
        let gradient = Grid::from_fn(2, 2, |x, y| (x + 2 * y) as u8);
        image.set_green(gradient.clone()).unwrap();
        assert_eq!(image.green(), gradient);
    }

    #[test]
    fn test_bad_channel_write_leaves_image_unchanged() {
        let mut image = Image::new(4, 4);
        let err = image.set_color(&[2u8, 3][..]).unwrap_err();
        assert!(err.to_string().contains("shape (4, 4, 3)"));
        assert_eq!(unique_pixels(&image), vec![[255, 255, 255, 255]]);

        let wrong = Grid::filled(3, 4, 0u8);
        assert!(image.set_blue(wrong).is_err());
        assert!(image.blue().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_fill_mask() {
        let mut image = Image::new(3, 2);
        let mask = Grid::from_fn(3, 2, |x, y| x == y);
        let colours = [Colour::rgb(1, 0, 0), Colour::rgb(2, 0, 0)];
        image.fill_mask(&mask, &colours).unwrap();

        assert_eq!(image.get(0, 0), Some(Colour::rgb(1, 0, 0)));
        assert_eq!(image.get(1, 1), Some(Colour::rgb(2, 0, 0)));
        assert_eq!(image.get(1, 0), Some(Colour::WHITE));

        assert!(image.fill_mask(&mask, &colours[..1]).is_err());
        assert!(image.fill_mask(&Grid::filled(2, 2, true), &colours).is_err());
    }

    #[test]
    fn test_composite_blends() {
        let mut image = Image::new(1, 1);
        let mask = Grid::filled(1, 1, true);
        image.composite(&mask, &[Colour::new(0, 0, 0, 0)]).unwrap();
        assert_eq!(image.get(0, 0), Some(Colour::WHITE));

        image.composite(&mask, &[Colour::new(0, 0, 0, 128)]).unwrap();
        let px = image.get(0, 0).unwrap();
        assert!(px.r < 255 && px.r > 100);
    }
}
