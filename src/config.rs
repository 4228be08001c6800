//! Render configuration (YAML).
//!
//! A render config holds the settings for `arlunio render` so they can be
//! kept next to the output instead of repeated on the command line. Flags
//! given on the command line take precedence over values from the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArlunioError, Result};
use crate::types::{AttrMap, AttrValue, Colour};

/// Settings for rendering a definition to a PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,

    /// Integer pixel upscale applied after rendering.
    pub scale: Option<u32>,

    /// Hex colour painted where the mask is true.
    pub foreground: String,

    /// Hex colour for the rest of the image.
    pub background: String,

    pub output: Option<PathBuf>,

    /// Attribute overrides passed to the definition.
    pub attributes: BTreeMap<String, serde_yaml::Value>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            scale: None,
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
            output: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Values from the command line, all optional.
#[derive(Debug, Clone, Default)]
pub struct RenderOverrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub scale: Option<u32>,
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub output: Option<PathBuf>,
    pub attributes: Vec<(String, AttrValue)>,
}

impl RenderConfig {
    /// Load a render config from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ArlunioError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read render config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse a render config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty document is null, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| ArlunioError::Parse {
            message: format!("Invalid render config: {}", e),
            help: Some(
                "Expected keys: width, height, scale, foreground, background, output, attributes"
                    .to_string(),
            ),
        })
    }

    /// Apply command-line values on top of this config.
    pub fn apply(&mut self, overrides: RenderOverrides) -> &mut Self {
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if overrides.scale.is_some() {
            self.scale = overrides.scale;
        }
        if let Some(foreground) = overrides.foreground {
            self.foreground = foreground;
        }
        if let Some(background) = overrides.background {
            self.background = background;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        for (name, value) in overrides.attributes {
            self.attributes.insert(name, to_yaml(value));
        }
        self
    }

    pub fn foreground(&self) -> Result<Colour> {
        Colour::from_hex(&self.foreground)
    }

    pub fn background(&self) -> Result<Colour> {
        Colour::from_hex(&self.background)
    }

    /// The upscale factor, at least 1.
    pub fn effective_scale(&self) -> u32 {
        self.scale.unwrap_or(1).max(1)
    }

    /// The output path, required before rendering.
    pub fn output_path(&self) -> Result<&Path> {
        self.output.as_deref().ok_or_else(|| ArlunioError::Parse {
            message: "No output file given".to_string(),
            help: Some("Pass -o FILE or set 'output' in the render config".to_string()),
        })
    }

    /// Attribute overrides as typed values.
    pub fn attr_map(&self) -> Result<AttrMap> {
        let mut map = AttrMap::new();
        for (name, value) in &self.attributes {
            map.insert(name.clone(), from_yaml(name, value)?);
        }
        Ok(map)
    }
}

fn from_yaml(name: &str, value: &serde_yaml::Value) -> Result<AttrValue> {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Ok(AttrValue::None),
        Yaml::Bool(b) => Ok(AttrValue::Bool(*b)),
        Yaml::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(AttrValue::Int(i)),
            (None, Some(f)) => Ok(AttrValue::Float(f)),
            (None, None) => Err(invalid_attribute(name)),
        },
        Yaml::String(s) => Ok(AttrValue::Str(s.clone())),
        _ => Err(invalid_attribute(name)),
    }
}

fn to_yaml(value: AttrValue) -> serde_yaml::Value {
    use serde_yaml::Value as Yaml;

    match value {
        AttrValue::None => Yaml::Null,
        AttrValue::Bool(b) => Yaml::Bool(b),
        AttrValue::Int(i) => Yaml::Number(i.into()),
        AttrValue::Float(f) => Yaml::Number(f.into()),
        AttrValue::Str(s) => Yaml::String(s),
    }
}

fn invalid_attribute(name: &str) -> ArlunioError {
    ArlunioError::Parse {
        message: format!("Invalid value for attribute '{}'", name),
        help: Some("Attributes must be null, a boolean, a number or a string".to_string()),
    }
}
