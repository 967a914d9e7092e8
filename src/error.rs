//! Error types surfaced by the runner, the configuration, and plugins.
//!
//! Lifecycle-method errors never show up here: the runner turns them into events. What remains are programmer errors
//! (a malformed spec, a plugin rejecting its input) and plugin failures that could not be delivered anywhere.

use std::fmt;
use std::io;

use miette::Diagnostic;
use thiserror::Error;

pub use contexts_core::MalformedSpec;

/// Error returned by a plugin's observer method.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{0}")]
    Message(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        PluginError::Message(message.into())
    }
}

/// A plugin rejected its configuration; the run cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{plugin}: {message}")]
#[diagnostic(code(contexts::invalid_input))]
pub struct InvalidInput {
    /// Kind of the plugin that rejected its input.
    pub plugin: String,
    pub message: String,
}

impl InvalidInput {
    pub fn new(plugin: impl fmt::Display, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }
}

/// One plugin failing (by error or by panic) while handling one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub plugin: String,
    pub notification: &'static str,
    pub message: String,
}

impl fmt::Display for ObserverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plugin '{}' failed in {}: {}",
            self.plugin, self.notification, self.message
        )
    }
}

/// Failures collected while fanning one notification out to every plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverFailures(pub Vec<ObserverFailure>);

impl ObserverFailures {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ObserverFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, failure) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ObserverFailures {
    type Item = ObserverFailure;
    type IntoIter = std::vec::IntoIter<ObserverFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Errors that propagate out of [`crate::run`] and [`crate::run_suites`].
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    #[error(transparent)]
    #[diagnostic(
        code(contexts::malformed_spec),
        help("each of establish, because, cleanup and examples may be claimed by at most one method; rename the others")
    )]
    MalformedSpec(#[from] MalformedSpec),

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// Plugins failed while being told about an earlier plugin failure.
    #[error("plugin errors could not be reported: {0}")]
    #[diagnostic(code(contexts::plugins))]
    Plugins(ObserverFailures),
}

#[cfg(test)]
mod tests {
    use super::*;
    use contexts_core::MethodRole;

    #[test]
    fn test_observer_failures_display_joins_entries() {
        let failures = ObserverFailures(vec![
            ObserverFailure {
                plugin: "a".into(),
                notification: "context_started",
                message: "boom".into(),
            },
            ObserverFailure {
                plugin: "b".into(),
                notification: "context_ended",
                message: "bang".into(),
            },
        ]);
        assert_eq!(
            failures.to_string(),
            "plugin 'a' failed in context_started: boom; plugin 'b' failed in context_ended: bang"
        );
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_run_error_carries_diagnostic_codes() {
        let malformed = RunError::from(MalformedSpec {
            spec: "Twice".into(),
            role: MethodRole::Because,
            methods: vec!["because_a".into(), "when_b".into()],
        });
        assert_eq!(
            malformed.code().map(|code| code.to_string()).as_deref(),
            Some("contexts::malformed_spec")
        );
        assert!(malformed.help().is_some());

        let invalid = RunError::from(InvalidInput::new("path-supplier", "path 'x' does not exist"));
        assert_eq!(invalid.to_string(), "path-supplier: path 'x' does not exist");
        assert_eq!(
            invalid.code().map(|code| code.to_string()).as_deref(),
            Some("contexts::invalid_input")
        );
    }

    #[test]
    fn test_plugin_error_from_io() {
        let err = PluginError::from(io::Error::other("disk full"));
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
