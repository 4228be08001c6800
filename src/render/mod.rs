//! Turning masks into images.
//!
//! `fill` paints a single mask. A `Canvas` stacks layers, each a mask
//! function with an optional colour function, and composites them
//! source-over onto a background.

use crate::error::Result;
use crate::eval::{check_dimensions, compute_color, compute_mask, ColorFn, MaskFn};
use crate::image::Image;
use crate::types::{Colour, Domain, Grid};

/// Paint `foreground` onto the pixels `mask` selects.
///
/// Without an image a white one of the mask's size is used.
pub fn fill(mask: &Grid<bool>, foreground: Colour, image: Option<Image>) -> Result<Image> {
    let mut image = image.unwrap_or_else(|| Image::new(mask.width(), mask.height()));
    let colours = vec![foreground; mask.count_true()];
    image.fill_mask(mask, &colours)?;
    Ok(image)
}

/// A colour function sweeping the hue around the origin.
pub fn hue_wheel(saturation: f32, lightness: f32) -> ColorFn {
    ColorFn::of_t(move |t| Colour::from_hsl(t.to_degrees() as f32, saturation, lightness))
}

/// One layer of a canvas.
#[derive(Debug)]
pub struct Layer {
    pub mask: MaskFn,
    /// Defaults to opaque black.
    pub colour: Option<ColorFn>,
}

impl Layer {
    pub fn new(mask: MaskFn) -> Self {
        Self { mask, colour: None }
    }

    pub fn with_colour(mut self, colour: ColorFn) -> Self {
        self.colour = Some(colour);
        self
    }
}

/// A stack of layers over a background.
#[derive(Debug)]
pub struct Canvas {
    /// A fixed domain; when unset the domain is centred on the origin and
    /// spans `scale` units vertically.
    pub domain: Option<Domain>,
    pub scale: f64,
    pub background: Colour,
    pub layers: Vec<Layer>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            domain: None,
            scale: 2.0,
            background: Colour::WHITE,
            layers: Vec::new(),
        }
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: Colour) -> Self {
        self.background = background;
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Add a layer on top of the existing ones.
    pub fn add_layer(&mut self, layer: Layer) -> &mut Self {
        self.layers.push(layer);
        self
    }

    /// Render every layer, bottom first.
    pub fn render(&self, width: usize, height: usize) -> Result<Image> {
        check_dimensions(width, height)?;
        let domain = match self.domain {
            Some(domain) => domain,
            None => Domain::centred(width, height, self.scale)?,
        };

        let mut image = Image::filled(width, height, self.background);
        for (index, layer) in self.layers.iter().enumerate() {
            let mask = compute_mask(&domain, &layer.mask, width, height)?;
            let colours = compute_color(&domain, &mask, layer.colour.as_ref(), width, height)?;
            tracing::debug!(layer = index, pixels = colours.len(), "compositing layer");
            image.composite(&mask, &colours)?;
        }

        Ok(image)
    }
}
