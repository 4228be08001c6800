//! arlunio - Compose images from declarative definitions
//!
//! A definition is a named function of the image size, other definitions
//! and keyword attributes. Definitions compose into masks, masks are
//! coloured by coordinate functions, and the results are written to RGBA
//! images.

pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod eval;
pub mod image;
pub mod library;
pub mod output;
pub mod registry;
pub mod render;
pub mod types;
pub mod validation;

pub use config::RenderConfig;
pub use definition::{define, Definition, DefinitionBuilder, Instance};
pub use error::{ArlunioError, Result};
pub use eval::{compute_color, compute_mask, ColorFn, CoordFn, MaskFn, Signature};
pub use image::{Image, ImageView, ImageViewMut};
pub use library::Library;
pub use registry::{Registry, RegistryBuilder};
pub use render::{fill, Canvas, Layer};
pub use types::{AttrMap, AttrType, AttrValue, Colour, Domain, Grid, Value};
pub use validation::{validate_registry, Diagnostic, Severity, ValidationResult};
