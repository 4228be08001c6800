//! Validation of definition registries.
//!
//! Runs a suite of checks against a built registry and reports errors
//! and warnings. Used by `arlunio check`.

mod checks;
mod warning;

pub use checks::PROBE_SIZE;
pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::registry::Registry;

/// Run all validation checks against the registry.
pub fn validate_registry(registry: &Registry) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_shadowed_attributes(registry));
    result.merge(checks::check_conflicting_defaults(registry));
    result.merge(checks::check_unused_dimensions(registry));
    result.merge(checks::check_evaluation(registry));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library;
    use crate::registry::RegistryBuilder;

    #[test]
    fn test_validate_empty_registry() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(validate_registry(&registry).is_ok());
    }

    #[test]
    fn test_library_is_clean() {
        let registry = library::registry().unwrap();
        let result = validate_registry(&registry);
        assert!(result.is_ok(), "{:?}", result);
    }
}
