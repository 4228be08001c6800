//! Colour type, parsing and channel normalisation.

use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};

use crate::error::{ArlunioError, Result};

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Black, the default foreground.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White, the default background.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse a hex colour string.
    ///
    /// Supports formats:
    /// - `#RGB` (3 digits, expanded to 6)
    /// - `#RGBA` (4 digits, expanded to 8)
    /// - `#RRGGBB` (6 digits)
    /// - `#RRGGBBAA` (8 digits)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);

        if !hex.is_ascii() {
            return Err(invalid_hex(s));
        }

        let digits = match hex.len() {
            3 | 4 => hex
                .chars()
                .map(|c| parse_hex_digit(c).map(|d| d << 4 | d))
                .collect::<Result<Vec<u8>>>()?,
            6 | 8 => (0..hex.len())
                .step_by(2)
                .map(|i| parse_hex_byte(&hex[i..i + 2]))
                .collect::<Result<Vec<u8>>>()?,
            _ => return Err(invalid_hex(s)),
        };

        ColourValue::from(digits).normalise()
    }

    /// Build an opaque colour from hue (degrees), saturation and lightness (0..1).
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hsl = Hsl::new(hue, saturation.clamp(0.0, 1.0), lightness.clamp(0.0, 1.0));
        let rgb: Srgb<f32> = hsl.into_color();

        Colour::rgb(
            to_byte(rgb.red),
            to_byte(rgb.green),
            to_byte(rgb.blue),
        )
    }

    /// Convert to RGBA tuple.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// The colour channels without alpha.
    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Check if the colour is fully opaque.
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Blend `self` over `dst` (source-over).
    pub fn over(self, dst: Colour) -> Colour {
        match self.a {
            255 => self,
            0 => dst,
            alpha => {
                let alpha = alpha as u16;
                let out_a = alpha + dst.a as u16 * (255 - alpha) / 255;
                Colour::new(
                    blend_channel(self.r, dst.r, alpha),
                    blend_channel(self.g, dst.g, alpha),
                    blend_channel(self.b, dst.b, alpha),
                    out_a.min(255) as u8,
                )
            }
        }
    }
}

impl FromStr for Colour {
    type Err = ArlunioError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<[u8; 4]> for Colour {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Colour::new(r, g, b, a)
    }
}

impl From<[u8; 3]> for Colour {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Colour::rgb(r, g, b)
    }
}

/// A colour as returned by a colour function, before normalisation.
///
/// Three channels are read as RGB, four as RGBA. Anything else is kept
/// so the evaluator can report the arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColourValue {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
    Other(Vec<u8>),
}

impl ColourValue {
    /// Normalise to RGBA, extending RGB with an opaque alpha.
    pub fn normalise(self) -> Result<Colour> {
        match self {
            ColourValue::Rgb(rgb) => Ok(rgb.into()),
            ColourValue::Rgba(rgba) => Ok(rgba.into()),
            ColourValue::Other(values) => Err(ArlunioError::evaluation(format!(
                "Colour must have 3 (RGB) or 4 (RGBA) channels, got {}",
                values.len()
            ))),
        }
    }
}

impl From<Colour> for ColourValue {
    fn from(colour: Colour) -> Self {
        ColourValue::Rgba(colour.to_rgba())
    }
}

impl From<[u8; 3]> for ColourValue {
    fn from(rgb: [u8; 3]) -> Self {
        ColourValue::Rgb(rgb)
    }
}

impl From<[u8; 4]> for ColourValue {
    fn from(rgba: [u8; 4]) -> Self {
        ColourValue::Rgba(rgba)
    }
}

impl From<(u8, u8, u8)> for ColourValue {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        ColourValue::Rgb([r, g, b])
    }
}

impl From<(u8, u8, u8, u8)> for ColourValue {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        ColourValue::Rgba([r, g, b, a])
    }
}

impl From<Vec<u8>> for ColourValue {
    fn from(values: Vec<u8>) -> Self {
        match values[..] {
            [r, g, b] => ColourValue::Rgb([r, g, b]),
            [r, g, b, a] => ColourValue::Rgba([r, g, b, a]),
            _ => ColourValue::Other(values),
        }
    }
}

impl From<&[u8]> for ColourValue {
    fn from(values: &[u8]) -> Self {
        values.to_vec().into()
    }
}

/// Alpha blend a single channel.
/// Uses (x + 1 + (x >> 8)) >> 8 in place of x / 255.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

fn to_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn invalid_hex(s: &str) -> ArlunioError {
    ArlunioError::Parse {
        message: format!("Invalid hex colour: {}", s),
        help: Some("Use #RGB, #RGBA, #RRGGBB, or #RRGGBBAA format".to_string()),
    }
}

/// Parse a single hex digit.
fn parse_hex_digit(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| ArlunioError::Parse {
            message: format!("Invalid hex digit: {}", c),
            help: None,
        })
}

/// Parse a two-character hex byte.
fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| ArlunioError::Parse {
        message: format!("Invalid hex byte: {}", s),
        help: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_6digit() {
        let c = Colour::from_hex("#FF0000").unwrap();
        assert_eq!(c, Colour::rgb(255, 0, 0));

        let c = Colour::from_hex("#1a1a2e").unwrap();
        assert_eq!(c, Colour::rgb(0x1a, 0x1a, 0x2e));
    }

    #[test]
    fn test_from_hex_3digit() {
        let c = Colour::from_hex("#ABC").unwrap();
        assert_eq!(c, Colour::rgb(0xAA, 0xBB, 0xCC));
    }

    #[test]
    fn test_from_hex_with_alpha() {
        assert_eq!(Colour::from_hex("#FF000080").unwrap(), Colour::new(255, 0, 0, 128));
        assert_eq!(Colour::from_hex("#F008").unwrap(), Colour::new(255, 0, 0, 0x88));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(Colour::from_hex("#GGG").is_err());
        assert!(Colour::from_hex("#12345").is_err());
        assert!(Colour::from_hex("").is_err());
        assert!(Colour::from_hex("#éé").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Colour::rgb(255, 0, 0)), "#FF0000");
        assert_eq!(format!("{}", Colour::new(255, 0, 0, 128)), "#FF000080");
    }

    #[test]
    fn test_normalise_rgb_gets_opaque_alpha() {
        let colour = ColourValue::from((1, 2, 3)).normalise().unwrap();
        assert_eq!(colour, Colour::new(1, 2, 3, 255));
    }

    #[test]
    fn test_normalise_rgba_unchanged() {
        let colour = ColourValue::from([1, 2, 3, 4]).normalise().unwrap();
        assert_eq!(colour, Colour::new(1, 2, 3, 4));
    }

    #[test]
    fn test_normalise_bad_arity() {
        let err = ColourValue::from(vec![1, 2]).normalise().unwrap_err();
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_from_hsl_primaries() {
        assert_eq!(Colour::from_hsl(0.0, 1.0, 0.5), Colour::rgb(255, 0, 0));
        assert_eq!(Colour::from_hsl(120.0, 1.0, 0.5), Colour::rgb(0, 255, 0));
        assert_eq!(Colour::from_hsl(0.0, 0.0, 1.0), Colour::WHITE);
    }

    #[test]
    fn test_over_opaque_and_transparent() {
        let red = Colour::rgb(255, 0, 0);
        assert_eq!(red.over(Colour::WHITE), red);
        assert_eq!(Colour::TRANSPARENT.over(Colour::WHITE), Colour::WHITE);
    }

    #[test]
    fn test_over_half_alpha() {
        let half_black = Colour::new(0, 0, 0, 128);
        let out = half_black.over(Colour::WHITE);
        assert!(out.r > 120 && out.r < 135);
        assert_eq!(out.a, 255);
    }
}
