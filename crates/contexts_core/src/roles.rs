//! Method-role registry and classifier.
//!
//! A spec is an ordinary type whose methods are sorted into lifecycle roles purely by their names. This module
//! centralizes the recognized name markers so that the runner, the `#[spec]` macro, and the documentation all read
//! from one table instead of scattering string comparisons.
//!
//! ## Notes
//! - Classification is case-insensitive: names are case-folded before any marker is tested.
//! - Names beginning with `_` are private and always [`MethodRole::Ignored`].
//! - The assertion rule is anchored at the start of the name and token-boundary sensitive (`it_works` and `It_Works`
//!   are assertions, `item_count` and `itWorks` are not). It is tested first, so `it_should_run_after_setup` stays an
//!   assertion even though it contains `after`.
//! - The remaining rules are plain substring tests, evaluated in [`RULES`] order; the first match wins.

use std::fmt;

/// Lifecycle role of a spec method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodRole {
    /// Arrange: builds the context. At most one per spec.
    Establish,
    /// Act: performs the action under test. At most one per spec.
    Because,
    /// Assert: verifies one observable property. Any number per spec.
    Assertion,
    /// Teardown: releases what the context acquired. At most one per spec.
    Cleanup,
    /// Data-driven generator of example values. At most one per spec.
    Examples,
    /// Not part of the lifecycle.
    Ignored,
}

impl MethodRole {
    /// Whether a spec may declare at most one method with this role.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            MethodRole::Establish | MethodRole::Because | MethodRole::Cleanup | MethodRole::Examples
        )
    }

    /// Lower-case role name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            MethodRole::Establish => "establish",
            MethodRole::Because => "because",
            MethodRole::Assertion => "assertion",
            MethodRole::Cleanup => "cleanup",
            MethodRole::Examples => "examples",
            MethodRole::Ignored => "ignored",
        }
    }
}

impl fmt::Display for MethodRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule's markers are matched against a case-folded method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMatch {
    /// The name starts with the marker, followed by the end of the name or a word boundary.
    Prefix,
    /// The marker occurs anywhere in the name.
    Contains,
    /// The name is exactly the marker.
    Exact,
}

/// Metadata entry describing one classification rule.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub role: MethodRole,
    pub matching: MarkerMatch,
    pub markers: &'static [&'static str],
    pub description: &'static str,
}

/// Classification rules, in precedence order.
pub const RULES: &[RoleRule] = &[
    RoleRule {
        role: MethodRole::Assertion,
        matching: MarkerMatch::Prefix,
        markers: &["it", "must", "will", "should", "then"],
        description: "Verify one observable property of the context.",
    },
    RoleRule {
        role: MethodRole::Establish,
        matching: MarkerMatch::Contains,
        markers: &["establish", "context", "given"],
        description: "Arrange the context the spec runs in.",
    },
    RoleRule {
        role: MethodRole::Because,
        matching: MarkerMatch::Contains,
        markers: &["because", "when", "since", "after"],
        description: "Perform the action under test.",
    },
    RoleRule {
        role: MethodRole::Cleanup,
        matching: MarkerMatch::Contains,
        markers: &["cleanup"],
        description: "Release resources acquired while arranging.",
    },
    RoleRule {
        role: MethodRole::Examples,
        matching: MarkerMatch::Exact,
        markers: &["examples"],
        description: "Produce example values; the spec runs once per example.",
    },
];

/// Classify a method name into its lifecycle role.
///
/// ## Parameters
/// - `name`: the method name as declared.
///
/// ## Returns
/// - (`MethodRole`): the role of the first matching rule in [`RULES`], or [`MethodRole::Ignored`].
///
/// ## Examples
/// ```rust
/// use contexts_core::roles::{classify, MethodRole};
///
/// assert_eq!(classify("because_we_push"), MethodRole::Because);
/// assert_eq!(classify("Should_Be_Empty"), MethodRole::Assertion);
/// assert_eq!(classify("item_count"), MethodRole::Ignored);
/// assert_eq!(classify("_given_helper"), MethodRole::Ignored);
/// ```
pub fn classify(name: &str) -> MethodRole {
    if name.is_empty() || name.starts_with('_') {
        return MethodRole::Ignored;
    }
    let folded = name.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.markers.iter().any(|marker| marker_matches(rule.matching, &folded, marker)))
        .map_or(MethodRole::Ignored, |rule| rule.role)
}

fn marker_matches(matching: MarkerMatch, folded: &str, marker: &str) -> bool {
    match matching {
        MarkerMatch::Contains => folded.contains(marker),
        MarkerMatch::Exact => folded == marker,
        MarkerMatch::Prefix => folded
            .strip_prefix(marker)
            .is_some_and(|rest| rest.chars().next().is_none_or(|next| !next.is_alphanumeric())),
    }
}

/// Look up the rule that assigns `role`, if any.
pub fn rule_for(role: MethodRole) -> Option<&'static RoleRule> {
    RULES.iter().find(|rule| rule.role == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_markers() {
        assert_eq!(classify("establish_that"), MethodRole::Establish);
        assert_eq!(classify("method_with_establish_in_the_name"), MethodRole::Establish);
        assert_eq!(classify("in_this_context"), MethodRole::Establish);
        assert_eq!(classify("GivenAStack"), MethodRole::Establish);
    }

    #[test]
    fn test_because_markers() {
        assert_eq!(classify("because_we_pop"), MethodRole::Because);
        assert_eq!(classify("when_popping"), MethodRole::Because);
        assert_eq!(classify("since_forever"), MethodRole::Because);
        assert_eq!(classify("after_popping"), MethodRole::Because);
        assert_eq!(classify("method_with_because_in_the_name"), MethodRole::Because);
    }

    #[test]
    fn test_assertion_prefixes_respect_token_boundaries() {
        assert_eq!(classify("it"), MethodRole::Assertion);
        assert_eq!(classify("it_should_pass"), MethodRole::Assertion);
        assert_eq!(classify("It_Should_Pass"), MethodRole::Assertion);
        assert_eq!(classify("must_hold"), MethodRole::Assertion);
        assert_eq!(classify("will_work"), MethodRole::Assertion);
        assert_eq!(classify("should_be_empty"), MethodRole::Assertion);
        assert_eq!(classify("then_it_is"), MethodRole::Assertion);
        assert_eq!(classify("item_count"), MethodRole::Ignored);
        assert_eq!(classify("mustard"), MethodRole::Ignored);
        assert_eq!(classify("thence"), MethodRole::Ignored);
    }

    #[test]
    fn test_assertion_boundary_ignores_original_casing() {
        for (mixed, folded) in [("itWorks", "itworks"), ("ShouldBeEmpty", "shouldbeempty"), ("IT_works", "it_works")] {
            assert_eq!(classify(mixed), classify(folded), "{mixed} vs {folded}");
        }
        assert_eq!(classify("itWorks"), MethodRole::Ignored);
        assert_eq!(classify("IT_works"), MethodRole::Assertion);
    }

    #[test]
    fn test_assertion_rule_wins_over_substring_rules() {
        assert_eq!(classify("it_should_run_these_after_setup"), MethodRole::Assertion);
        assert_eq!(classify("it_has_context"), MethodRole::Assertion);
        assert_eq!(classify("should_cleanup"), MethodRole::Assertion);
    }

    #[test]
    fn test_earliest_substring_rule_wins() {
        assert_eq!(classify("given_when"), MethodRole::Establish);
        assert_eq!(classify("when_cleanup"), MethodRole::Because);
    }

    #[test]
    fn test_cleanup_and_examples() {
        assert_eq!(classify("method_with_cleanup_in_the_name"), MethodRole::Cleanup);
        assert_eq!(classify("Cleanup"), MethodRole::Cleanup);
        assert_eq!(classify("examples"), MethodRole::Examples);
        assert_eq!(classify("Examples"), MethodRole::Examples);
        assert_eq!(classify("more_examples"), MethodRole::Ignored);
    }

    #[test]
    fn test_private_and_unmatched_names_are_ignored() {
        assert_eq!(classify(""), MethodRole::Ignored);
        assert_eq!(classify("_establish"), MethodRole::Ignored);
        assert_eq!(classify("helper"), MethodRole::Ignored);
    }

    #[test]
    fn test_singleton_roles() {
        assert!(MethodRole::Establish.is_singleton());
        assert!(MethodRole::Examples.is_singleton());
        assert!(!MethodRole::Assertion.is_singleton());
        assert!(!MethodRole::Ignored.is_singleton());
    }
}
