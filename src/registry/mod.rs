//! Named collections of definitions.
//!
//! The registry stores definitions by name and tracks which definitions
//! take which others as inputs.
//!
//! # Example
//!
//! ```ignore
//! use arlunio::registry::RegistryBuilder;
//!
//! let mut builder = RegistryBuilder::new();
//! builder.add(circle);
//!
//! let registry = builder.build()?;
//! // Inputs are registered too, and come first
//! assert_eq!(registry.build_order(), ["X", "Y", "Circle"]);
//! ```

mod graph;

use std::collections::BTreeMap;

use crate::definition::Definition;
use crate::error::{ArlunioError, Result};

pub use graph::{CycleError, DependencyGraph};

/// Definitions by name.
///
/// The registry is immutable after construction - use `RegistryBuilder`
/// to create a new registry.
#[derive(Debug)]
pub struct Registry {
    definitions: BTreeMap<String, Definition>,

    graph: DependencyGraph,

    /// Names in dependency order (inputs first).
    build_order: Vec<String>,
}

impl Registry {
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// Look up a definition, failing with the list of known names.
    pub fn require(&self, name: &str) -> Result<&Definition> {
        self.get(name).ok_or_else(|| ArlunioError::Parse {
            message: format!("Unknown definition '{}'", name),
            help: Some(format!("Known definitions: {}", self.build_order.join(", "))),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// All definitions in build order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.build_order
            .iter()
            .filter_map(|name| self.definitions.get(name))
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Names in build order (inputs before the definitions using them).
    pub fn build_order(&self) -> &[String] {
        &self.build_order
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Builder for constructing a `Registry`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<Definition>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Its inputs are added along with it.
    pub fn add(&mut self, definition: Definition) -> &mut Self {
        self.definitions.push(definition);
        self
    }

    pub fn add_all(&mut self, definitions: impl IntoIterator<Item = Definition>) -> &mut Self {
        for definition in definitions {
            self.add(definition);
        }
        self
    }

    /// Build the registry, computing dependencies and build order.
    ///
    /// Two different definitions with the same name are an error.
    pub fn build(self) -> Result<Registry> {
        let mut definitions: BTreeMap<String, Definition> = BTreeMap::new();
        let mut graph = DependencyGraph::new();

        let mut pending = self.definitions;
        while let Some(definition) = pending.pop() {
            let name = definition.name().to_string();
            if let Some(existing) = definitions.get(&name) {
                if existing.ptr_eq(&definition) {
                    continue;
                }
                return Err(ArlunioError::declaration(format!(
                    "Duplicate definition '{}'",
                    name
                ))
                .with_help("Each definition in a registry needs a unique name"));
            }

            graph.register(name.clone());
            for (_, input) in definition.inputs() {
                graph.add_dependency(name.clone(), input.name());
                pending.push(input.clone());
            }
            definitions.insert(name, definition);
        }

        let build_order = graph.topological_sort().map_err(|e| {
            ArlunioError::declaration(e.to_string())
                .with_help("Check for definitions that take each other as inputs")
        })?;

        tracing::debug!(definitions = definitions.len(), "built registry");

        Ok(Registry {
            definitions,
            graph,
            build_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::define;
    use crate::types::Value;

    fn leaf(name: &str) -> Definition {
        define(name).width().height().body(|_| Ok(Value::None)).unwrap()
    }

    #[test]
    fn test_empty_registry() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(registry.is_empty());
        assert!(registry.build_order().is_empty());
    }

    #[test]
    fn test_inputs_registered_first() {
        let x = leaf("X");
        let y = leaf("Y");
        let both = define("Both")
            .input("x", &x)
            .input("y", &y)
            .body(|_| Ok(Value::None))
            .unwrap();

        let mut builder = RegistryBuilder::new();
        builder.add(both);
        let registry = builder.build().unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.build_order(), ["X", "Y", "Both"]);
        assert!(registry.get("X").unwrap().ptr_eq(&x));
        assert_eq!(registry.graph().dependency_count("Both"), 2);
    }

    #[test]
    fn test_same_definition_twice_is_fine() {
        let x = leaf("X");
        let mut builder = RegistryBuilder::new();
        builder.add_all([x.clone(), x]);
        assert_eq!(builder.build().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.add(leaf("X")).add(leaf("X"));
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("Duplicate definition 'X'"));
    }

    #[test]
    fn test_require_lists_known_names() {
        let mut builder = RegistryBuilder::new();
        builder.add(leaf("X"));
        let registry = builder.build().unwrap();

        assert!(registry.require("X").is_ok());
        let err = registry.require("Nope").unwrap_err();
        assert!(err.to_string().contains("Unknown definition 'Nope'"));
    }
}
