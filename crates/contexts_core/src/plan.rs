//! Lifecycle planning: from an ordered list of method names to the arrange/act/assert/teardown plan.
//!
//! The plan refers to methods by their index in the caller's list, so it can be computed from names alone (at macro
//! expansion time or at run time) and applied to any method table with the same order.

use std::error::Error;
use std::fmt;

use crate::roles::{MethodRole, classify};

/// The lifecycle of one spec, as indices into the method list it was planned from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecyclePlan {
    pub establish: Option<usize>,
    pub because: Option<usize>,
    /// Assertions in declaration order (shuffling happens later, at run time).
    pub assertions: Vec<usize>,
    pub cleanup: Option<usize>,
    pub examples: Option<usize>,
}

impl LifecyclePlan {
    /// Index of the method planned for a singleton `role`.
    pub fn singleton(&self, role: MethodRole) -> Option<usize> {
        match role {
            MethodRole::Establish => self.establish,
            MethodRole::Because => self.because,
            MethodRole::Cleanup => self.cleanup,
            MethodRole::Examples => self.examples,
            MethodRole::Assertion | MethodRole::Ignored => None,
        }
    }

    fn singleton_slot(&mut self, role: MethodRole) -> Option<&mut Option<usize>> {
        match role {
            MethodRole::Establish => Some(&mut self.establish),
            MethodRole::Because => Some(&mut self.because),
            MethodRole::Cleanup => Some(&mut self.cleanup),
            MethodRole::Examples => Some(&mut self.examples),
            MethodRole::Assertion | MethodRole::Ignored => None,
        }
    }
}

/// A spec declares more than one method for a role that allows at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSpec {
    pub spec: String,
    pub role: MethodRole,
    /// Every method name that was assigned `role`, in declaration order.
    pub methods: Vec<String>,
}

impl fmt::Display for MalformedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spec '{}' has {} {} methods ({}); at most one is allowed",
            self.spec,
            self.methods.len(),
            self.role,
            self.methods.join(", ")
        )
    }
}

impl Error for MalformedSpec {}

/// Plan the lifecycle of a spec from its method names.
///
/// ## Parameters
/// - `spec`: the spec's name (used in the error only).
/// - `names`: method names in declaration order.
///
/// ## Returns
/// - (`Ok(LifecyclePlan)`): indices of the methods for every role.
/// - (`Err(MalformedSpec)`): a singleton role was claimed by more than one method. The error names the first such
///   role (in rule order) and all of its methods.
///
/// ## Examples
/// ```rust
/// use contexts_core::plan::plan_lifecycle;
///
/// let plan = plan_lifecycle("Spec", &["given_x", "it_a", "helper", "it_b"]).unwrap();
/// assert_eq!(plan.establish, Some(0));
/// assert_eq!(plan.assertions, vec![1, 3]);
/// assert!(plan_lifecycle("Spec", &["given_x", "given_y"]).is_err());
/// ```
pub fn plan_lifecycle<S: AsRef<str>>(spec: &str, names: &[S]) -> Result<LifecyclePlan, MalformedSpec> {
    let mut plan = LifecyclePlan::default();
    let mut duplicate: Option<MethodRole> = None;

    for (index, name) in names.iter().enumerate() {
        let role = classify(name.as_ref());
        if role == MethodRole::Assertion {
            plan.assertions.push(index);
            continue;
        }
        if let Some(slot) = plan.singleton_slot(role) {
            if slot.is_some() {
                duplicate = Some(match duplicate {
                    Some(prev) if rank(prev) <= rank(role) => prev,
                    _ => role,
                });
            } else {
                *slot = Some(index);
            }
        }
    }

    match duplicate {
        None => Ok(plan),
        Some(role) => Err(MalformedSpec {
            spec: spec.to_string(),
            role,
            methods: names
                .iter()
                .map(|name| AsRef::<str>::as_ref(name))
                .filter(|name| classify(name) == role)
                .map(str::to_string)
                .collect(),
        }),
    }
}

fn rank(role: MethodRole) -> usize {
    crate::roles::RULES
        .iter()
        .position(|rule| rule.role == role)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle_plan() {
        let names = [
            "method_with_establish_in_the_name",
            "method_with_because_in_the_name",
            "it_should_run_these_after_setup",
            "method_with_cleanup_in_the_name",
        ];
        let plan = plan_lifecycle("Spec", &names).unwrap();
        assert_eq!(plan.establish, Some(0));
        assert_eq!(plan.because, Some(1));
        assert_eq!(plan.assertions, vec![2]);
        assert_eq!(plan.cleanup, Some(3));
        assert_eq!(plan.examples, None);
    }

    #[test]
    fn test_empty_spec_plans_nothing() {
        let plan = plan_lifecycle::<&str>("Empty", &[]).unwrap();
        assert_eq!(plan, LifecyclePlan::default());
    }

    #[test]
    fn test_ignored_methods_keep_indices_stable() {
        let plan = plan_lifecycle("Spec", &["helper", "examples", "it_works"]).unwrap();
        assert_eq!(plan.examples, Some(1));
        assert_eq!(plan.assertions, vec![2]);
        assert_eq!(plan.singleton(MethodRole::Examples), Some(1));
    }

    #[test]
    fn test_duplicate_singleton_is_malformed() {
        let err = plan_lifecycle("Twice", &["because_a", "it_works", "when_b"]).unwrap_err();
        assert_eq!(err.spec, "Twice");
        assert_eq!(err.role, MethodRole::Because);
        assert_eq!(err.methods, vec!["because_a".to_string(), "when_b".to_string()]);
        assert!(err.to_string().contains("because_a, when_b"));
    }

    #[test]
    fn test_reports_earliest_rule_when_several_roles_are_duplicated() {
        let err = plan_lifecycle("Spec", &["cleanup_a", "cleanup_b", "given_a", "given_b"]).unwrap_err();
        assert_eq!(err.role, MethodRole::Establish);
    }
}
