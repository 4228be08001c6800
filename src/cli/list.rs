//! List command implementation.
//!
//! Prints the built-in definitions, inputs before the definitions using them.

use clap::Args;

use crate::error::Result;
use crate::library;
use crate::output::{plural, Printer};
use crate::registry::Registry;

/// List the built-in definitions
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show which definitions each one takes as input
    #[arg(long)]
    pub deps: bool,
}

pub fn run(args: ListArgs, printer: &Printer) -> Result<()> {
    let registry = library::registry()?;

    for line in listing(&registry, args.deps) {
        println!("{}", line);
    }
    printer.info("Listed", &plural(registry.len(), "definition", "definitions"));

    Ok(())
}

fn listing(registry: &Registry, deps: bool) -> Vec<String> {
    registry
        .definitions()
        .map(|definition| {
            let inputs: Vec<&str> = registry
                .graph()
                .dependencies_of(definition.name())
                .collect();
            let summary = definition
                .doc()
                .and_then(|doc| doc.lines().next())
                .unwrap_or("");

            if deps && !inputs.is_empty() {
                format!("{:<14} -> {}", definition.name(), inputs.join(", "))
            } else {
                format!("{:<14} {}", definition.name(), summary)
                    .trim_end()
                    .to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_deps() {
        let registry = library::registry().unwrap();
        let lines = listing(&registry, true);

        assert_eq!(lines.len(), 9);
        assert!(lines.iter().any(|l| l == "Circle         -> X, Y"));
        // Inputs come first
        let x = lines.iter().position(|l| l.starts_with("X ")).unwrap();
        let circle = lines.iter().position(|l| l.starts_with("Circle ")).unwrap();
        assert!(x < circle);
    }
}
