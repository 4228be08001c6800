//! Inspect command implementation.

use clap::Args;

use crate::definition::{Definition, Param};
use crate::error::Result;
use crate::library;

/// Show the inputs and attributes of a definition
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Definition name (e.g. Circle)
    pub name: String,

    /// Print the default instance as JSON instead
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let registry = library::registry()?;
    let definition = registry.require(&args.name)?;

    if args.json {
        println!("{}", definition.instance().to_json()?);
    } else {
        print!("{}", describe(definition));
    }

    Ok(())
}

fn describe(definition: &Definition) -> String {
    let mut out = format!("{}\n", definition.name());
    if let Some(doc) = definition.doc() {
        out.push_str(&format!("  {}\n", doc));
    }

    out.push_str("\nParameters:\n");
    for param in definition.params() {
        let line = match param {
            Param::Width => "width".to_string(),
            Param::Height => "height".to_string(),
            Param::Input { name, definition } => format!("{}: {}", name, definition.name()),
            Param::Attribute { name, default, ty } => match ty {
                Some(ty) => format!("{}: {} = {}", name, ty, default),
                None => format!("{} = {}", name, default),
            },
        };
        out.push_str(&format!("  {}\n", line));
    }

    let inherited: Vec<String> = definition
        .attributes()
        .iter()
        .filter(|(name, _)| !definition.attribs().contains(name))
        .map(|(name, value)| match definition.attr_type(name) {
            Some(ty) => format!("  {}: {} = {}\n", name, ty, value),
            None => format!("  {} = {}\n", name, value),
        })
        .collect();
    if !inherited.is_empty() {
        out.push_str("\nInherited attributes:\n");
        out.extend(inherited);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Library;

    #[test]
    fn test_describe_circle() {
        let library = Library::new().unwrap();
        insta::assert_snapshot!(describe(&library.circle).trim_end(), @r###"
        Circle
          Points within radius r of (xc, yc).

        Parameters:
          x: X
          y: Y
          xc: float = 0.0
          yc: float = 0.0
          r: float = 0.8
          pt: float = None

        Inherited attributes:
          scale: float = 2.0
        "###);
    }
}
