//! Validation checks for a definition registry.
//!
//! Each check takes a `&Registry` and returns a `ValidationResult`.

use crate::registry::Registry;
use crate::types::AttrValue;

use super::warning::{Diagnostic, ValidationResult};

/// Size used when probing definitions for evaluation failures.
pub const PROBE_SIZE: usize = 8;

/// Own attributes that share a name with an inherited one.
pub fn check_shadowed_attributes(registry: &Registry) -> ValidationResult {
    let mut result = ValidationResult::new();

    for definition in registry.definitions() {
        for name in definition.attribs().names() {
            let owners: Vec<&str> = definition
                .inputs()
                .filter(|(_, input)| input.attributes().contains(name))
                .map(|(_, input)| input.name())
                .collect();
            if owners.is_empty() {
                continue;
            }

            result.push(
                Diagnostic::warning(
                    "arlunio::validate::shadowed-attribute",
                    definition.name(),
                    format!(
                        "Attribute '{}' of '{}' shadows the one inherited from {}",
                        name,
                        definition.name(),
                        quoted(&owners)
                    ),
                )
                .with_help(format!(
                    "An override of '{}' applies to both; rename one if they mean different things",
                    name
                )),
            );
        }
    }

    result
}

/// Inputs that supply the same attribute with different defaults.
pub fn check_conflicting_defaults(registry: &Registry) -> ValidationResult {
    let mut result = ValidationResult::new();

    for definition in registry.definitions() {
        let mut seen: Vec<(&str, &AttrValue, &str)> = Vec::new();

        for (_, input) in definition.inputs() {
            for (name, value) in input.attributes().iter() {
                // Own attributes take precedence, so nothing conflicts
                if definition.attribs().contains(name) {
                    continue;
                }

                let earlier = seen
                    .iter()
                    .find(|(n, v, _)| *n == name && *v != value)
                    .map(|(_, v, owner)| (*v, *owner));
                if let Some((earlier_value, owner)) = earlier {
                    result.push(
                        Diagnostic::warning(
                            "arlunio::validate::conflicting-default",
                            definition.name(),
                            format!(
                                "'{}' inherits '{}' as {} from '{}' and {} from '{}'",
                                definition.name(),
                                name,
                                earlier_value,
                                owner,
                                value,
                                input.name()
                            ),
                        )
                        .with_help(format!("The default from '{}' is used", input.name())),
                    );
                }
                seen.push((name, value, input.name()));
            }
        }
    }

    result
}

/// Definitions that cannot vary over the image.
pub fn check_unused_dimensions(registry: &Registry) -> ValidationResult {
    let mut result = ValidationResult::new();

    for definition in registry.definitions() {
        if definition.inputs().next().is_none() && !definition.uses_dimensions() {
            result.push(
                Diagnostic::warning(
                    "arlunio::validate::unused-dimension",
                    definition.name(),
                    format!(
                        "'{}' has no inputs and ignores the image size",
                        definition.name()
                    ),
                )
                .with_help("Its value is the same at every size; take width, height or an input"),
            );
        }
    }

    result
}

/// Definitions whose defaults fail to evaluate.
pub fn check_evaluation(registry: &Registry) -> ValidationResult {
    let mut result = ValidationResult::new();

    for definition in registry.definitions() {
        if let Err(err) = definition.instance().eval(PROBE_SIZE, PROBE_SIZE) {
            result.push(
                Diagnostic::error(
                    "arlunio::validate::evaluation-failed",
                    definition.name(),
                    format!(
                        "'{}' fails to evaluate with its defaults: {}",
                        definition.name(),
                        err
                    ),
                )
                .with_help("Check the attribute defaults and the values the inputs produce"),
            );
        }
    }

    result
}

fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{define, Definition};
    use crate::error::ArlunioError;
    use crate::registry::RegistryBuilder;
    use crate::types::Value;

    fn registry(definitions: Vec<Definition>) -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.add_all(definitions);
        builder.build().unwrap()
    }

    fn base(name: &str, scale: f64) -> Definition {
        define(name)
            .width()
            .height()
            .attr("scale", scale)
            .body(|_| Ok(Value::None))
            .unwrap()
    }

    #[test]
    fn test_shadowed_attribute() {
        let x = base("X", 2.0);
        let zoom = define("Zoom")
            .input("x", &x)
            .attr("scale", 4.0)
            .body(|_| Ok(Value::None))
            .unwrap();

        let result = check_shadowed_attributes(&registry(vec![zoom]));
        assert_eq!(result.warning_count(), 1);

        let d = result.iter().next().unwrap();
        assert_eq!(d.definition, "Zoom");
        assert!(d.message.contains("shadows the one inherited from 'X'"));
    }

    #[test]
    fn test_conflicting_defaults() {
        let a = base("A", 2.0);
        let b = base("B", 3.0);
        let same = base("C", 2.0);

        let mixed = define("Mixed")
            .input("a", &a)
            .input("b", &b)
            .body(|_| Ok(Value::None))
            .unwrap();
        let agreed = define("Agreed")
            .input("a", &a)
            .input("c", &same)
            .body(|_| Ok(Value::None))
            .unwrap();

        let result = check_conflicting_defaults(&registry(vec![mixed, agreed]));
        assert_eq!(result.warning_count(), 1);
        let d = result.iter().next().unwrap();
        assert_eq!(d.definition, "Mixed");
        assert!(d.message.contains("2.0 from 'A' and 3.0 from 'B'"));
    }

    #[test]
    fn test_unused_dimension() {
        let constant = define("Constant")
            .attr("value", 1)
            .body(|i| Ok(Value::Int(i.int("value")?)))
            .unwrap();

        let result = check_unused_dimensions(&registry(vec![constant, base("X", 2.0)]));
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.for_definition("Constant").count(), 1);
    }

    #[test]
    fn test_evaluation_failure() {
        let broken = define("Broken")
            .width()
            .body(|_| -> crate::error::Result<Value> {
                Err(ArlunioError::evaluation("no"))
            })
            .unwrap();

        let result = check_evaluation(&registry(vec![broken, base("X", 2.0)]));
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.for_definition("Broken").count(), 1);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(quoted(&["X", "Y"]), "'X', 'Y'");
    }
}
