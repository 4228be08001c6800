//! Declaring definitions.
//!
//! A `DefinitionBuilder` collects a parameter list, classifies every
//! parameter once, and wraps the body into a `Definition`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ArlunioError, Result};
use crate::types::{AttrMap, AttrType, AttrValue, Value};

use super::{Body, Definition, Inner, Inputs, Param, Requirement};

/// The declared annotation of a positional parameter.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// No annotation.
    None,
    /// Another definition whose value the parameter receives.
    Definition(Definition),
    /// A plain value type.
    Type(AttrType),
}

impl From<&Definition> for Annotation {
    fn from(definition: &Definition) -> Self {
        Annotation::Definition(definition.clone())
    }
}

impl From<AttrType> for Annotation {
    fn from(ty: AttrType) -> Self {
        Annotation::Type(ty)
    }
}

#[derive(Debug, Clone)]
enum RawParam {
    Positional {
        name: String,
        annotation: Annotation,
    },
    Keyword {
        name: String,
        default: AttrValue,
        ty: Option<AttrType>,
    },
}

impl RawParam {
    fn name(&self) -> &str {
        match self {
            RawParam::Positional { name, .. } | RawParam::Keyword { name, .. } => name,
        }
    }
}

/// Start declaring a definition called `name`.
pub fn define(name: impl Into<String>) -> DefinitionBuilder {
    DefinitionBuilder::new(name)
}

/// Builder for `Definition`.
///
/// Parameters are declared in order; `body` classifies them and fails if
/// any positional parameter is not `width`, `height`, or an input typed by
/// another definition.
#[derive(Debug, Clone)]
pub struct DefinitionBuilder {
    name: String,
    doc: Option<String>,
    params: Vec<RawParam>,
}

impl DefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    /// Set the documentation string.
    pub fn doc(&mut self, doc: impl Into<String>) -> &mut Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declare the `width` parameter.
    pub fn width(&mut self) -> &mut Self {
        self.param("width", Annotation::None)
    }

    /// Declare the `height` parameter.
    pub fn height(&mut self) -> &mut Self {
        self.param("height", Annotation::None)
    }

    /// Declare a positional parameter with an annotation.
    pub fn param(&mut self, name: impl Into<String>, annotation: impl Into<Annotation>) -> &mut Self {
        self.params.push(RawParam::Positional {
            name: name.into(),
            annotation: annotation.into(),
        });
        self
    }

    /// Declare an input receiving the value of `definition`.
    pub fn input(&mut self, name: impl Into<String>, definition: &Definition) -> &mut Self {
        self.param(name, definition)
    }

    /// Declare an untyped attribute.
    pub fn attr(&mut self, name: impl Into<String>, default: impl Into<AttrValue>) -> &mut Self {
        self.params.push(RawParam::Keyword {
            name: name.into(),
            default: default.into(),
            ty: None,
        });
        self
    }

    /// Declare an attribute whose values are checked against `ty`.
    pub fn typed_attr(
        &mut self,
        name: impl Into<String>,
        ty: AttrType,
        default: impl Into<AttrValue>,
    ) -> &mut Self {
        self.params.push(RawParam::Keyword {
            name: name.into(),
            default: default.into(),
            ty: Some(ty),
        });
        self
    }

    /// Classify the parameters and wrap `body` into a definition.
    pub fn body<F, R>(&mut self, body: F) -> Result<Definition>
    where
        F: Fn(&Inputs<'_>) -> Result<R> + Send + Sync + 'static,
        R: Into<Value>,
    {
        let body: Body = Arc::new(move |inputs: &Inputs<'_>| body(inputs).map(Into::into));
        self.build(body)
    }

    fn build(&self, body: Body) -> Result<Definition> {
        let params = self.classify()?;

        let mut definitions = Vec::new();
        let mut attribs = AttrMap::new();
        let mut attributes = AttrMap::new();

        for param in &params {
            match param {
                Param::Width => definitions.push(("width".to_string(), Requirement::Empty)),
                Param::Height => definitions.push(("height".to_string(), Requirement::Empty)),
                Param::Input { name, definition } => {
                    attributes.merge(definition.attributes());
                    definitions.push((name.clone(), Requirement::Definition(definition.clone())));
                }
                Param::Attribute { name, default, .. } => attribs.insert(name.clone(), default.clone()),
            }
        }
        attributes.merge(&attribs);

        tracing::debug!(
            definition = %self.name,
            inputs = ?definitions.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            attributes = ?attributes.names().collect::<Vec<_>>(),
            "declared definition"
        );

        Ok(Definition(Arc::new(Inner {
            name: self.name.clone(),
            doc: self.doc.clone(),
            params,
            definitions,
            attribs,
            attributes,
            body,
        })))
    }

    fn classify(&self) -> Result<Vec<Param>> {
        let mut seen = HashSet::new();
        let mut params = Vec::with_capacity(self.params.len());

        for raw in &self.params {
            if !seen.insert(raw.name()) {
                return Err(ArlunioError::declaration(format!(
                    "Duplicate parameter '{}' in definition '{}'",
                    raw.name(),
                    self.name
                )));
            }
            params.push(self.classify_one(raw)?);
        }

        Ok(params)
    }

    fn classify_one(&self, raw: &RawParam) -> Result<Param> {
        match raw {
            RawParam::Positional { name, annotation } => match (name.as_str(), annotation) {
                ("width", Annotation::None | Annotation::Type(AttrType::Int)) => Ok(Param::Width),
                ("height", Annotation::None | Annotation::Type(AttrType::Int)) => Ok(Param::Height),
                ("width" | "height", Annotation::Definition(_)) => Err(ArlunioError::declaration(
                    format!("Invalid input '{}', the name is reserved for the image size", name),
                )),
                (_, Annotation::None) => Err(ArlunioError::declaration(format!(
                    "Unknown input '{}'",
                    name
                ))
                .with_help("Inputs must be annotated with the definition they receive")),
                (_, Annotation::Type(ty)) => Err(ArlunioError::declaration(format!(
                    "Invalid input '{}', type '{}' is not a Definition",
                    name, ty
                ))),
                (_, Annotation::Definition(definition)) => Ok(Param::Input {
                    name: name.clone(),
                    definition: definition.clone(),
                }),
            },
            RawParam::Keyword { name, default, ty } => {
                let default = match ty {
                    Some(ty) => ty.check(default.clone()).ok_or_else(|| {
                        ArlunioError::declaration(format!(
                            "Attribute '{}' of type '{}' cannot default to a value of type '{}'",
                            name,
                            ty,
                            default.type_name()
                        ))
                    })?,
                    None => default.clone(),
                };
                Ok(Param::Attribute {
                    name: name.clone(),
                    default,
                    ty: *ty,
                })
            }
        }
    }
}
