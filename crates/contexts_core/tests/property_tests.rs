//! Property-based tests for the naming helpers.

use contexts_core::plan::plan_lifecycle;
use contexts_core::readable::make_readable;
use contexts_core::roles::{MethodRole, classify};
use proptest::prelude::*;

proptest! {
    /// Classification depends only on the case-folded name.
    #[test]
    fn classification_is_case_insensitive(name in "[a-zA-Z][a-zA-Z_]{0,24}") {
        prop_assert_eq!(classify(&name), classify(&name.to_lowercase()));
        prop_assert_eq!(classify(&name), classify(&name.to_uppercase()));
    }

    /// Classifying the same name twice yields the same role.
    #[test]
    fn classification_is_deterministic(name in "[A-Za-z_][A-Za-z0-9_]{0,24}") {
        prop_assert_eq!(classify(&name), classify(&name));
    }

    /// Private names never take part in the lifecycle.
    #[test]
    fn underscore_names_are_ignored(rest in "[a-z_]{0,16}") {
        let name = format!("_{rest}");
        prop_assert_eq!(classify(&name), MethodRole::Ignored);
    }

    /// Every assertion index in a plan points at an assertion-named method, in order.
    #[test]
    fn plan_assertions_are_ordered(names in proptest::collection::vec("(it|should|helper)_[a-d]{1,6}", 0..12)) {
        let plan = plan_lifecycle("Spec", &names).unwrap();
        prop_assert!(plan.assertions.windows(2).all(|w| w[0] < w[1]));
        for index in plan.assertions {
            prop_assert_eq!(classify(&names[index]), MethodRole::Assertion);
        }
    }

    /// Readable names never contain separators or stray spaces.
    #[test]
    fn readable_names_are_well_spaced(input in "[A-Za-z0-9_.]{0,32}") {
        let readable = make_readable(&input);
        prop_assert!(!readable.starts_with(' '));
        prop_assert!(!readable.ends_with(' '));
        prop_assert!(!readable.contains("  "));
        prop_assert!(!readable.contains('_'));
        prop_assert!(!readable.contains('.'));
    }
}
