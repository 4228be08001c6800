//! Core data types for arlunio.
//!
//! This module contains the fundamental types used throughout the pipeline:
//! - `Colour` - RGBA colour values
//! - `Grid` - row-major 2D arrays (coordinates, masks, channels)
//! - `Domain` - the rectangle a raster samples
//! - `AttrValue` / `Value` - attribute and result values

mod colour;
mod domain;
mod grid;
mod value;

pub use colour::{Colour, ColourValue};
pub use domain::Domain;
pub use grid::Grid;
pub use value::{AttrMap, AttrType, AttrValue, Value};
