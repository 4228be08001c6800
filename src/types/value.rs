//! Attribute and result values.
//!
//! Attributes are small scalar values with an optional declared type.
//! Definition results are `Value`s, ranging from plain numbers up to
//! grids, masks and whole images.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArlunioError, Result};
use crate::image::Image;

use super::{Colour, Grid};

/// The declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    Bool,
    Int,
    Float,
    Str,
}

impl AttrType {
    /// Get the short name for this type.
    pub fn name(&self) -> &'static str {
        match self {
            AttrType::Bool => "bool",
            AttrType::Int => "int",
            AttrType::Float => "float",
            AttrType::Str => "str",
        }
    }

    /// Check `value` against this type, returning it in canonical form.
    ///
    /// `None` is accepted by every type and an `Int` widens to `Float`.
    pub fn check(&self, value: AttrValue) -> Option<AttrValue> {
        match (self, value) {
            (_, AttrValue::None) => Some(AttrValue::None),
            (AttrType::Bool, v @ AttrValue::Bool(_)) => Some(v),
            (AttrType::Int, v @ AttrValue::Int(_)) => Some(v),
            (AttrType::Float, v @ AttrValue::Float(_)) => Some(v),
            (AttrType::Float, AttrValue::Int(i)) => Some(AttrValue::Float(i as f64)),
            (AttrType::Str, v @ AttrValue::Str(_)) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Get the name of this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::None => "None",
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "str",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AttrValue::None)
    }

    /// Numeric view of the value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::None => write!(f, "None"),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Parse a command-line style literal: `none`, `true`, `3`, `0.5`, or text.
impl FromStr for AttrValue {
    type Err = ArlunioError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Ok(match s {
            "" => {
                return Err(ArlunioError::Parse {
                    message: "Empty attribute value".to_string(),
                    help: Some("Use none, true/false, a number or text".to_string()),
                })
            }
            "none" | "None" => AttrValue::None,
            "true" | "True" => AttrValue::Bool(true),
            "false" | "False" => AttrValue::Bool(false),
            _ => {
                if let Ok(i) = s.parse::<i64>() {
                    AttrValue::Int(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    AttrValue::Float(f)
                } else {
                    AttrValue::Str(s.to_string())
                }
            }
        })
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::None, Into::into)
    }
}

/// An insertion-ordered map of attribute names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttrMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overlay every entry of `other` onto this map.
    pub fn merge(&mut self, other: &AttrMap) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttrMap::new();
        for (k, v) in iter {
            map.insert(k, v.into());
        }
        map
    }
}

/// The result of evaluating a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A real-valued grid such as a coordinate plane.
    Grid(Grid<f64>),
    Mask(Grid<bool>),
    /// A colour map, one entry per selected pixel.
    Colours(Vec<Colour>),
    Image(Image),
}

impl Value {
    /// Get the name of this value's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Grid(_) => "grid",
            Value::Mask(_) => "mask",
            Value::Colours(_) => "colours",
            Value::Image(_) => "image",
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_grid(&self) -> Result<&Grid<f64>> {
        match self {
            Value::Grid(grid) => Ok(grid),
            other => Err(other.mismatch("grid")),
        }
    }

    pub fn as_mask(&self) -> Result<&Grid<bool>> {
        match self {
            Value::Mask(mask) => Ok(mask),
            other => Err(other.mismatch("mask")),
        }
    }

    pub fn into_mask(self) -> Result<Grid<bool>> {
        match self {
            Value::Mask(mask) => Ok(mask),
            other => Err(other.mismatch("mask")),
        }
    }

    pub fn into_image(self) -> Result<Image> {
        match self {
            Value::Image(image) => Ok(image),
            other => Err(other.mismatch("image")),
        }
    }

    fn mismatch(&self, expected: &str) -> ArlunioError {
        ArlunioError::evaluation(format!("Expected a {} value, got {}", expected, self.kind()))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Grid<f64>> for Value {
    fn from(value: Grid<f64>) -> Self {
        Value::Grid(value)
    }
}

impl From<Grid<bool>> for Value {
    fn from(value: Grid<bool>) -> Self {
        Value::Mask(value)
    }
}

impl From<Vec<Colour>> for Value {
    fn from(value: Vec<Colour>) -> Self {
        Value::Colours(value)
    }
}

impl From<Image> for Value {
    fn from(value: Image) -> Self {
        Value::Image(value)
    }
}
