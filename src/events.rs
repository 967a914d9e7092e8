//! Payloads carried by notifications.
//!
//! The runner builds these descriptors and hands them to plugins. The list-processing hooks receive vectors of them
//! and may reorder or remove entries; the runner then executes what remains, in the resulting order. Entries built
//! outside the runner (with the public constructors) are not attached to anything runnable and are skipped.

use std::fmt;
use std::path::{Path, PathBuf};

/// Marks a descriptor that the runner did not produce.
const DETACHED: usize = usize::MAX;

/// A suite ("module"): a named group of spec classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteInfo {
    pub name: String,
    pub path: Option<PathBuf>,
    pub(crate) slot: usize,
}

impl SuiteInfo {
    pub fn new(name: impl Into<String>, path: Option<&Path>) -> Self {
        Self::attached(name, path, DETACHED)
    }

    pub(crate) fn attached(name: impl Into<String>, path: Option<&Path>, slot: usize) -> Self {
        Self {
            name: name.into(),
            path: path.map(Path::to_path_buf),
            slot,
        }
    }
}

/// A spec class inside a suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub(crate) slot: usize,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self::attached(name, DETACHED)
    }

    pub(crate) fn attached(name: impl Into<String>, slot: usize) -> Self {
        Self {
            name: name.into(),
            slot,
        }
    }
}

/// One execution of a spec: the class, plus the example it runs with (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo {
    pub name: String,
    /// `Debug` rendering of the current example.
    pub example: Option<String>,
}

impl ContextInfo {
    pub fn new(name: impl Into<String>, example: Option<String>) -> Self {
        Self {
            name: name.into(),
            example,
        }
    }
}

impl fmt::Display for ContextInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.example {
            Some(example) => write!(f, "{} -> {}", self.name, example),
            None => f.write_str(&self.name),
        }
    }
}

/// One assertion method of the context currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionInfo {
    pub name: String,
    /// Display name of the owning context.
    pub context: String,
    pub(crate) slot: usize,
}

impl AssertionInfo {
    pub fn new(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::attached(name, context, DETACHED)
    }

    pub(crate) fn attached(name: impl Into<String>, context: impl Into<String>, slot: usize) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            slot,
        }
    }
}

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    /// The method panicked.
    Panic,
    /// The method returned `Err`.
    Returned,
    /// The framework itself (a plugin failure, a malformed spec).
    Framework,
}

/// What went wrong in a failed or errored step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub origin: FailureOrigin,
}

impl Failure {
    pub fn new(message: impl Into<String>, origin: FailureOrigin) -> Self {
        Self {
            message: message.into(),
            origin,
        }
    }

    pub fn framework(message: impl Into<String>) -> Self {
        Self::new(message, FailureOrigin::Framework)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered text frames describing where a failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace(pub Vec<String>);

impl Trace {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn frames(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display_includes_example() {
        assert_eq!(ContextInfo::new("WhenAdding", None).to_string(), "WhenAdding");
        assert_eq!(
            ContextInfo::new("WhenAdding", Some("(1, 2)".into())).to_string(),
            "WhenAdding -> (1, 2)"
        );
    }

    #[test]
    fn test_public_constructors_build_detached_descriptors() {
        assert_eq!(ClassInfo::new("Spec").slot, DETACHED);
        assert_eq!(SuiteInfo::new("suite", None).slot, DETACHED);
        assert_eq!(AssertionInfo::new("it_works", "Spec").slot, DETACHED);
        assert_eq!(ClassInfo::attached("Spec", 3).slot, 3);
    }
}
