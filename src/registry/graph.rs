//! Dependency graph between definitions.
//!
//! Tracks which definitions take which others as inputs, enabling a
//! dependency-first ordering and cycle detection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A dependency graph keyed by definition name.
///
/// Iteration and sort order are deterministic: ties are broken by name.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// name -> names it depends on.
    dependencies: BTreeMap<String, BTreeSet<String>>,

    /// name -> names that depend on it.
    dependents: BTreeMap<String, BTreeSet<String>>,

    nodes: BTreeSet<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node (even if it has no dependencies).
    pub fn register(&mut self, name: impl Into<String>) {
        self.nodes.insert(name.into());
    }

    /// Add a dependency: `from` depends on `to`. Both are registered.
    pub fn add_dependency(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let (from, to) = (from.into(), to.into());
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());

        self.dependencies
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.dependents.entry(to).or_default().insert(from);
    }

    /// Direct dependencies of `name`.
    pub fn dependencies_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct dependents of `name`.
    pub fn dependents_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.dependents
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn dependency_count(&self, name: &str) -> usize {
        self.dependencies.get(name).map_or(0, BTreeSet::len)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sort with Kahn's algorithm, dependencies before dependents.
    ///
    /// Returns the cycle path if the graph is not acyclic.
    pub fn topological_sort(&self) -> Result<Vec<String>, CycleError> {
        // Remaining unprocessed dependencies per node
        let mut pending: BTreeMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.dependency_count(n)))
            .collect();

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&name, _)| name)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(name) = ready.pop_first() {
            order.push(name.to_string());

            for dependent in self.dependents_of(name) {
                if let Some(count) = pending.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(CycleError {
                cycle: self.find_cycle(),
            });
        }

        Ok(order)
    }

    fn find_cycle(&self) -> Vec<String> {
        let mut visited = BTreeSet::new();
        let mut path = Vec::new();

        for start in &self.nodes {
            if !visited.contains(start.as_str()) {
                if let Some(cycle) = self.walk(start, &mut visited, &mut path) {
                    return cycle;
                }
            }
        }

        Vec::new()
    }

    /// Depth-first walk; `path` holds the current stack.
    fn walk<'a>(
        &'a self,
        node: &'a str,
        visited: &mut BTreeSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(node);
        path.push(node);

        for dep in self.dependencies_of(node) {
            if let Some(start) = path.iter().position(|n| *n == dep) {
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(dep.to_string());
                return Some(cycle);
            }
            if !visited.contains(dep) {
                if let Some(cycle) = self.walk(dep, visited, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        None
    }
}

/// Returned when the dependency graph contains a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// The names on the cycle, starting and ending with the same name.
    pub cycle: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert!(graph.topological_sort().unwrap().is_empty());
    }

    #[test]
    fn test_single_node() {
        let mut graph = DependencyGraph::new();
        graph.register("X");
        assert_eq!(graph.topological_sort().unwrap(), vec!["X".to_string()]);
    }

    #[test]
    fn test_linear_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("R", "X");
        graph.add_dependency("Ring", "R");

        let order = graph.topological_sort().unwrap();
        assert!(position(&order, "X") < position(&order, "R"));
        assert!(position(&order, "R") < position(&order, "Ring"));
    }

    #[test]
    fn test_diamond_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("X", "Base");
        graph.add_dependency("Y", "Base");
        graph.add_dependency("Circle", "X");
        graph.add_dependency("Circle", "Y");

        let order = graph.topological_sort().unwrap();
        assert_eq!(order, vec!["Base", "X", "Y", "Circle"]);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let mut graph = DependencyGraph::new();
        for name in ["c", "a", "b"] {
            graph.register(name);
        }
        assert_eq!(graph.topological_sort().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.add_dependency("b", "c");
        graph.add_dependency("c", "a");

        let err = graph.topological_sort().unwrap_err();
        assert_eq!(err.cycle, vec!["a", "b", "c", "a"]);
        assert_eq!(
            err.to_string(),
            "Circular dependency detected: a -> b -> c -> a"
        );
    }

    #[test]
    fn test_self_reference_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("loop", "loop");
        let err = graph.topological_sort().unwrap_err();
        assert_eq!(err.cycle, vec!["loop", "loop"]);
    }

    #[test]
    fn test_dependencies_and_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("Circle", "X");
        graph.add_dependency("Circle", "Y");
        graph.add_dependency("Square", "X");

        assert_eq!(graph.dependency_count("Circle"), 2);
        assert_eq!(graph.dependency_count("X"), 0);
        assert_eq!(graph.dependencies_of("Circle").collect::<Vec<_>>(), vec!["X", "Y"]);
        assert_eq!(graph.dependents_of("X").collect::<Vec<_>>(), vec!["Circle", "Square"]);
    }
}
