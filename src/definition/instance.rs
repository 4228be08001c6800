//! Instances of definitions and their JSON form.

use serde::{Deserialize, Serialize};

use crate::error::{ArlunioError, Result};
use crate::types::{AttrMap, AttrValue, Value};

use super::{Definition, Inputs, Param};

/// A definition with resolved attribute values and bound input instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    definition: Definition,
    attribs: AttrMap,
    inputs: Vec<(String, Instance)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstanceJson {
    name: String,
    attributes: Vec<AttributeJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AttributeJson {
    name: String,
    value: AttrValue,
}

impl Instance {
    /// Declared defaults are type-checked when the definition is built, so
    /// this cannot fail.
    pub(super) fn with_defaults(definition: &Definition) -> Self {
        let inputs = definition
            .inputs()
            .map(|(name, input)| (name.to_string(), input.instance()))
            .collect();

        Self {
            definition: definition.clone(),
            attribs: definition.attribs().clone(),
            inputs,
        }
    }

    pub(super) fn new(definition: &Definition, overrides: &AttrMap) -> Result<Self> {
        if let Some(unknown) = overrides
            .names()
            .find(|name| !definition.attributes().contains(name))
        {
            let known: Vec<_> = definition.attributes().names().collect();
            return Err(ArlunioError::construction(format!(
                "Unknown attribute '{}' for definition '{}'",
                unknown,
                definition.name()
            ))
            .with_help(if known.is_empty() {
                format!("'{}' has no attributes", definition.name())
            } else {
                format!("Known attributes: {}", known.join(", "))
            }));
        }

        let mut inputs = Vec::new();
        for (name, input) in definition.inputs() {
            let shared: AttrMap = overrides
                .iter()
                .filter(|(key, _)| input.attributes().contains(key))
                .map(|(key, value)| (key, value.clone()))
                .collect();
            inputs.push((name.to_string(), input.instantiate(&shared)?));
        }

        let mut attribs = AttrMap::new();
        for param in definition.params() {
            let Param::Attribute { name, default, ty } = param else {
                continue;
            };
            let value = overrides.get(name).cloned().unwrap_or_else(|| default.clone());
            let value = match ty {
                Some(ty) => ty.check(value.clone()).ok_or_else(|| {
                    ArlunioError::construction(format!(
                        "Attribute '{}' of '{}' expects a {}, got {} ({})",
                        name,
                        definition.name(),
                        ty,
                        value,
                        value.type_name()
                    ))
                })?,
                None => value,
            };
            attribs.insert(name.clone(), value);
        }

        Ok(Self {
            definition: definition.clone(),
            attribs,
            inputs,
        })
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// The resolved values of the definition's own attributes.
    pub fn attribs(&self) -> &AttrMap {
        &self.attribs
    }

    /// The resolved values of every attribute reachable from this instance,
    /// own values taking precedence.
    pub fn attributes(&self) -> AttrMap {
        let mut merged = AttrMap::new();
        for (_, input) in &self.inputs {
            merged.merge(&input.attributes());
        }
        merged.merge(&self.attribs);
        merged
    }

    /// The bound input instances.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.inputs.iter().map(|(name, inst)| (name.as_str(), inst))
    }

    /// Evaluate at the given image size.
    ///
    /// Inputs are evaluated first, in declaration order, and their values
    /// handed to the body alongside the own attributes.
    #[tracing::instrument(skip(self), fields(definition = %self.definition.name()))]
    pub fn eval(&self, width: usize, height: usize) -> Result<Value> {
        if width == 0 || height == 0 {
            return Err(ArlunioError::evaluation(format!(
                "Cannot evaluate '{}' at {}x{}",
                self.definition.name(),
                width,
                height
            ))
            .with_help("Width and height must both be positive"));
        }
        crate::eval::check_dimensions(width, height)?;

        let mut values = Vec::with_capacity(self.inputs.len());
        for (name, input) in &self.inputs {
            values.push((name.as_str(), input.eval(width, height)?));
        }

        let inputs = Inputs::new(width, height, values, &self.attribs);
        self.definition.call(&inputs)
    }

    /// Serialize the definition name and every resolved attribute value,
    /// inherited ones included.
    pub fn to_json(&self) -> Result<String> {
        let json = InstanceJson {
            name: self.definition.name().to_string(),
            attributes: self
                .attributes()
                .iter()
                .map(|(name, value)| AttributeJson {
                    name: name.to_string(),
                    value: value.clone(),
                })
                .collect(),
        };

        serde_json::to_string(&json).map_err(|e| ArlunioError::Parse {
            message: format!("Failed to serialize '{}': {}", self.definition.name(), e),
            help: None,
        })
    }
}

impl Definition {
    /// Rebuild an instance from the output of `Instance::to_json`.
    pub fn from_json(&self, json: &str) -> Result<Instance> {
        let parsed: InstanceJson = serde_json::from_str(json).map_err(|e| ArlunioError::Parse {
            message: format!("Invalid instance JSON: {}", e),
            help: None,
        })?;

        if parsed.name != self.name() {
            return Err(ArlunioError::Parse {
                message: format!(
                    "Cannot parse definition '{}' as a '{}'",
                    parsed.name,
                    self.name()
                ),
                help: None,
            });
        }

        let mut overrides = AttrMap::new();
        for attribute in parsed.attributes {
            if !self.attributes().contains(&attribute.name) {
                return Err(ArlunioError::Parse {
                    message: format!(
                        "Unexpected attribute '{}' for definition '{}'",
                        attribute.name,
                        self.name()
                    ),
                    help: Some(format!(
                        "Known attributes: {}",
                        self.attributes().names().collect::<Vec<_>>().join(", ")
                    )),
                });
            }
            overrides.insert(attribute.name, attribute.value);
        }

        self.instantiate(&overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::define;
    use crate::types::AttrType;
    use pretty_assertions::assert_eq;

    fn attrs<const N: usize>(pairs: [(&str, AttrValue); N]) -> AttrMap {
        pairs.into_iter().collect()
    }

    fn base() -> Definition {
        define("Base")
            .width()
            .height()
            .attr("offset", 0)
            .body(|i| Ok(Value::Int((i.width() + i.height()) as i64 + i.int("offset")?)))
            .unwrap()
    }

    fn derived(base: &Definition) -> Definition {
        define("Derived")
            .input("b", base)
            .attr("scale", 2)
            .body(|i| Ok(Value::Int(i.input("b")?.as_i64()? * i.int("scale")?)))
            .unwrap()
    }

    #[test]
    fn test_width_height_only_equals_body() {
        let def = define("Product")
            .width()
            .height()
            .body(|i| Ok(Value::Int((i.width() * i.height()) as i64)))
            .unwrap();

        for (w, h) in [(1, 1), (3, 7), (16, 9)] {
            assert_eq!(def.instance().eval(w, h).unwrap(), Value::Int((w * h) as i64));
        }
    }

    #[test]
    fn test_derived_substitutes_base_value() {
        let base = base();
        let derived = derived(&base);

        assert_eq!(derived.instance().eval(3, 4).unwrap(), Value::Int(14));

        let shifted = derived.instantiate(&attrs([("offset", 1.into())])).unwrap();
        assert_eq!(shifted.eval(3, 4).unwrap(), Value::Int(16));

        let both = derived
            .instantiate(&attrs([("offset", 1.into()), ("scale", 3.into())]))
            .unwrap();
        assert_eq!(both.eval(3, 4).unwrap(), Value::Int(24));
        assert_eq!(both.attribs(), &attrs([("scale", 3.into())]));
        assert_eq!(
            both.attributes(),
            attrs([("offset", 1.into()), ("scale", 3.into())])
        );
    }

    #[test]
    fn test_overrides_reach_any_depth() {
        let base = base();
        let middle = derived(&base);
        let top = define("Top")
            .input("m", &middle)
            .body(|i| Ok(i.input("m")?.clone()))
            .unwrap();

        let inst = top.instantiate(&attrs([("offset", 5.into())])).unwrap();
        assert_eq!(inst.eval(1, 1).unwrap(), Value::Int(14));
    }

    #[test]
    fn test_unknown_override_fails() {
        let err = base()
            .instantiate(&attrs([("nope", 1.into())]))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown attribute 'nope'"));
        assert!(matches!(err, ArlunioError::Construction { .. }));
    }

    #[test]
    fn test_typed_override_checked() {
        let def = define("Typed")
            .typed_attr("r", AttrType::Float, 0.5)
            .body(|i| Ok(Value::Float(i.float("r")?)))
            .unwrap();

        let widened = def.instantiate(&attrs([("r", 2.into())])).unwrap();
        assert_eq!(widened.attribs().get("r"), Some(&AttrValue::Float(2.0)));

        let unset = def.instantiate(&attrs([("r", AttrValue::None)])).unwrap();
        assert!(unset.eval(1, 1).is_err());

        let err = def.instantiate(&attrs([("r", "wide".into())])).unwrap_err();
        assert!(err.to_string().contains("expects a float"));
    }

    #[test]
    fn test_eval_rejects_empty_size() {
        let err = base().instance().eval(0, 4).unwrap_err();
        assert!(matches!(err, ArlunioError::Evaluation { .. }));
    }

    #[test]
    fn test_json_round_trip() {
        let def = derived(&base());
        let inst = def.instantiate(&attrs([("scale", 5.into())])).unwrap();

        let json = inst.to_json().unwrap();
        insta::assert_snapshot!(json, @r#"{"name":"Derived","attributes":[{"name":"offset","value":0},{"name":"scale","value":5}]}"#);

        let back = def.from_json(&json).unwrap();
        assert_eq!(back.attribs(), inst.attribs());
        assert_eq!(back.attributes(), inst.attributes());
    }

    #[test]
    fn test_json_keeps_inherited_overrides() {
        let base = base();
        let def = derived(&base);
        let inst = def.instantiate(&attrs([("offset", 7.into())])).unwrap();

        let back = def.from_json(&inst.to_json().unwrap()).unwrap();
        assert_eq!(back.attributes().get("offset"), Some(&AttrValue::Int(7)));
        assert_eq!(back.eval(3, 4).unwrap(), inst.eval(3, 4).unwrap());
    }

    #[test]
    fn test_json_name_mismatch() {
        let json = r#"{"name": "Other", "attributes": []}"#;
        let err = base().from_json(json).unwrap_err();
        assert!(err
            .to_string()
            .contains("Cannot parse definition 'Other' as a 'Base'"));
    }

    #[test]
    fn test_json_unexpected_attribute() {
        let json = r#"{"name": "Base", "attributes": [{"name": "colour", "value": "red"}]}"#;
        let err = base().from_json(json).unwrap_err();
        assert!(err.to_string().contains("Unexpected attribute 'colour'"));
    }
}
