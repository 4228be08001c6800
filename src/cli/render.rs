//! Render command implementation.
//!
//! Evaluates a definition and writes the result as a PNG. Masks are
//! painted with the foreground colour over the background.

use std::path::PathBuf;

use clap::Args;

use crate::config::{RenderConfig, RenderOverrides};
use crate::error::{ArlunioError, Result};
use crate::image::Image;
use crate::library;
use crate::output::{display_path, Printer};
use crate::render::fill;
use crate::types::{AttrValue, Value};

/// Evaluate a mask definition and write it as a PNG
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Definition name (e.g. Circle)
    pub name: String,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<usize>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<usize>,

    /// Attribute override, repeatable (e.g. --attr r=0.5)
    #[arg(long = "attr", value_name = "NAME=VALUE", value_parser = parse_attr)]
    pub attrs: Vec<(String, AttrValue)>,

    /// Colour painted where the mask is true (hex)
    #[arg(long)]
    pub foreground: Option<String>,

    /// Colour of the rest of the image (hex)
    #[arg(long)]
    pub background: Option<String>,

    /// Integer upscale applied after rendering
    #[arg(long)]
    pub scale: Option<u32>,

    /// YAML render config; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output PNG file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: RenderArgs, printer: &Printer) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    config.apply(RenderOverrides {
        width: args.width,
        height: args.height,
        scale: args.scale,
        foreground: args.foreground,
        background: args.background,
        output: args.output,
        attributes: args.attrs,
    });

    let path = config.output_path()?;
    printer.status(
        "Rendering",
        &format!("{} ({}x{})", args.name, config.width, config.height),
    );
    let image = render(&args.name, &config)?;

    image.save(path)?;
    printer.status("Wrote", &printer.cyan(&display_path(path)));

    Ok(())
}

/// Evaluate `name` from the built-in library with the given settings.
pub fn render(name: &str, config: &RenderConfig) -> Result<Image> {
    let registry = library::registry()?;
    let instance = registry.require(name)?.instantiate(&config.attr_map()?)?;

    let image = match instance.eval(config.width, config.height)? {
        Value::Mask(mask) => {
            let background = Image::filled(mask.width(), mask.height(), config.background()?);
            fill(&mask, config.foreground()?, Some(background))?
        }
        Value::Image(image) => image,
        other => {
            return Err(ArlunioError::evaluation(format!(
                "'{}' produced a {} value, which cannot be rendered",
                name,
                other.kind()
            ))
            .with_help("Only definitions producing a mask or an image can be rendered"))
        }
    };

    image.upscale(config.effective_scale() as usize)
}

fn parse_attr(s: &str) -> std::result::Result<(String, AttrValue), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in '{}'", s));
    }
    let value = value.trim().parse::<AttrValue>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;

    #[test]
    fn test_parse_attr() {
        assert_eq!(
            parse_attr("r=0.5").unwrap(),
            ("r".to_string(), AttrValue::Float(0.5))
        );
        assert_eq!(
            parse_attr("pt = none").unwrap(),
            ("pt".to_string(), AttrValue::None)
        );
        assert!(parse_attr("r").is_err());
        assert!(parse_attr("=1").is_err());
    }

    #[test]
    fn test_render_circle() {
        let config = RenderConfig {
            width: 9,
            height: 9,
            scale: Some(2),
            foreground: "#ff0000".to_string(),
            ..Default::default()
        };
        let image = render("Circle", &config).unwrap();

        assert_eq!(image.width(), 18);
        assert_eq!(image.get(9, 9), Some(Colour::rgb(255, 0, 0)));
        assert_eq!(image.get(0, 0), Some(Colour::WHITE));
    }

    #[test]
    fn test_render_rejects_grids() {
        let config = RenderConfig {
            width: 4,
            height: 4,
            ..Default::default()
        };
        let err = render("X", &config).unwrap_err();
        assert!(err.to_string().contains("cannot be rendered"));
    }

    #[test]
    fn test_render_rejects_huge_scale() {
        let config = RenderConfig {
            width: 256,
            height: 256,
            scale: Some(u32::MAX),
            ..Default::default()
        };
        let err = render("Circle", &config).unwrap_err();
        assert!(err.to_string().contains("Cannot scale"));
    }

    #[test]
    fn test_render_unknown_attribute() {
        let mut config = RenderConfig::default();
        config.apply(RenderOverrides {
            attributes: vec![("radius".to_string(), AttrValue::Float(1.0))],
            ..Default::default()
        });
        assert!(render("Circle", &config).is_err());
    }

    #[test]
    fn test_run_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.png");
        let args = RenderArgs {
            name: "Square".to_string(),
            width: Some(8),
            height: Some(8),
            attrs: vec![],
            foreground: None,
            background: None,
            scale: None,
            config: None,
            output: Some(path.clone()),
        };

        run(args, &Printer::new(true)).unwrap();
        let image = Image::open(&path).unwrap();
        assert_eq!(image.shape(), (8, 8, 4));
    }
}
