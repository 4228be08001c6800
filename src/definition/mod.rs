//! Composable definitions.
//!
//! A `Definition` wraps a body function together with a classified
//! parameter list: the image `width` and `height`, inputs that receive the
//! values of other definitions, and keyword attributes with defaults.
//! Definitions are cheap to clone and can be shared between threads.
//!
//! # Example
//!
//! ```ignore
//! use arlunio::definition::define;
//!
//! let x = define("X").width().height().body(|i| Ok(x_grid(i.width(), i.height())))?;
//! let half = define("Half")
//!     .input("x", &x)
//!     .attr("cut", 0.0)
//!     .body(|i| {
//!         let cut = i.float("cut")?;
//!         Ok(i.grid("x")?.map(|&v| v < cut))
//!     })?;
//!
//! let mask = half.instance().eval(64, 64)?;
//! ```

mod builder;
mod instance;

use std::fmt;
use std::sync::Arc;

use crate::error::{ArlunioError, Result};
use crate::types::{AttrMap, AttrType, AttrValue, Grid, Value};

pub use builder::{define, Annotation, DefinitionBuilder};
pub use instance::Instance;

pub(crate) type Body = Arc<dyn Fn(&Inputs<'_>) -> Result<Value> + Send + Sync>;

/// A classified parameter.
#[derive(Debug, Clone)]
pub enum Param {
    Width,
    Height,
    /// Receives the value of another definition.
    Input { name: String, definition: Definition },
    /// A keyword attribute with a default and an optional declared type.
    Attribute {
        name: String,
        default: AttrValue,
        ty: Option<AttrType>,
    },
}

/// What a positional parameter requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// `width` or `height`: filled in from the image size.
    Empty,
    Definition(Definition),
}

struct Inner {
    name: String,
    doc: Option<String>,
    params: Vec<Param>,
    definitions: Vec<(String, Requirement)>,
    attribs: AttrMap,
    attributes: AttrMap,
    body: Body,
}

/// A declared definition. Clones share the same declaration.
#[derive(Clone)]
pub struct Definition(Arc<Inner>);

impl Definition {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.0.doc.as_deref()
    }

    /// The classified parameters, in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.0.params
    }

    /// Every positional parameter with what it requires, in declaration
    /// order.
    pub fn definitions(&self) -> &[(String, Requirement)] {
        &self.0.definitions
    }

    /// The inputs and the definitions they receive.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.0.definitions.iter().filter_map(|(name, req)| match req {
            Requirement::Definition(definition) => Some((name.as_str(), definition)),
            Requirement::Empty => None,
        })
    }

    /// This definition's own attributes and their defaults.
    pub fn attribs(&self) -> &AttrMap {
        &self.0.attribs
    }

    /// All attributes reachable through the inputs, with this definition's
    /// own defaults taking precedence.
    pub fn attributes(&self) -> &AttrMap {
        &self.0.attributes
    }

    /// The declared type of an attribute, looking through the inputs when
    /// it is not one of this definition's own.
    pub fn attr_type(&self, name: &str) -> Option<AttrType> {
        let own = self.0.params.iter().find_map(|param| match param {
            Param::Attribute { name: n, ty, .. } if n == name => Some(*ty),
            _ => None,
        });
        match own {
            Some(ty) => ty,
            None => self.inputs().find_map(|(_, input)| input.attr_type(name)),
        }
    }

    /// Whether the body reads the image size directly.
    pub fn uses_dimensions(&self) -> bool {
        self.0
            .params
            .iter()
            .any(|p| matches!(p, Param::Width | Param::Height))
    }

    /// An instance using every default.
    pub fn instance(&self) -> Instance {
        Instance::with_defaults(self)
    }

    /// An instance with `overrides` applied. Overrides are shared by name
    /// with every input that has an attribute of the same name.
    pub fn instantiate(&self, overrides: &AttrMap) -> Result<Instance> {
        Instance::new(self, overrides)
    }

    /// Check whether two handles refer to the same declaration.
    pub fn ptr_eq(&self, other: &Definition) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(&self, inputs: &Inputs<'_>) -> Result<Value> {
        (self.0.body)(inputs)
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<_> = self.definitions().iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Definition")
            .field("name", &self.name())
            .field("definitions", &inputs)
            .field("attributes", self.attributes())
            .finish()
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a body receives when evaluated.
#[derive(Debug)]
pub struct Inputs<'a> {
    width: usize,
    height: usize,
    values: Vec<(&'a str, Value)>,
    attributes: &'a AttrMap,
}

impl<'a> Inputs<'a> {
    pub(crate) fn new(
        width: usize,
        height: usize,
        values: Vec<(&'a str, Value)>,
        attributes: &'a AttrMap,
    ) -> Self {
        Self {
            width,
            height,
            values,
            attributes,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The value an input evaluated to.
    pub fn input(&self, name: &str) -> Result<&Value> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| ArlunioError::evaluation(format!("No input named '{}'", name)))
    }

    /// The value of a real-valued grid input.
    pub fn grid(&self, name: &str) -> Result<&Grid<f64>> {
        self.input(name)?.as_grid()
    }

    /// The value of a mask input.
    pub fn mask(&self, name: &str) -> Result<&Grid<bool>> {
        self.input(name)?.as_mask()
    }

    /// The resolved value of an own attribute.
    pub fn attr(&self, name: &str) -> Result<&AttrValue> {
        self.attributes
            .get(name)
            .ok_or_else(|| ArlunioError::evaluation(format!("No attribute named '{}'", name)))
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        let value = self.attr(name)?;
        value.as_f64().ok_or_else(|| attr_mismatch(name, "float", value))
    }

    /// A numeric attribute that may be unset.
    pub fn opt_float(&self, name: &str) -> Result<Option<f64>> {
        match self.attr(name)? {
            AttrValue::None => Ok(None),
            value => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| attr_mismatch(name, "float", value)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.attr(name)?;
        value.as_i64().ok_or_else(|| attr_mismatch(name, "int", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        let value = self.attr(name)?;
        value.as_bool().ok_or_else(|| attr_mismatch(name, "bool", value))
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        let value = self.attr(name)?;
        value.as_str().ok_or_else(|| attr_mismatch(name, "str", value))
    }
}

fn attr_mismatch(name: &str, expected: &str, value: &AttrValue) -> ArlunioError {
    ArlunioError::evaluation(format!(
        "Attribute '{}' should be a {}, got {} ({})",
        name,
        expected,
        value,
        value.type_name()
    ))
}
