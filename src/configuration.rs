//! Run configuration: the ordered plugin list plus run-level switches.
//!
//! Every observer method is exposed here and forwarded through a [`PluginProxy`]. When a plugin fails, every plugin
//! is told through `unexpected_error`; failures during that second delivery are kept and handed back by
//! [`Configuration::drain`] once the run is over.

use std::fmt;
use std::path::Path;

use crate::error::{ObserverFailure, ObserverFailures, RunError};
use crate::events::{AssertionInfo, ClassInfo, ContextInfo, Failure, SuiteInfo, Trace};
use crate::plugins::{Notification, Plugin, PluginProxy};

/// Run-level switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switches {
    /// Attach the captured location and backtrace to assertion failures.
    pub rewriting: bool,
}

impl Default for Switches {
    fn default() -> Self {
        Self { rewriting: true }
    }
}

pub struct Configuration {
    plugins: Vec<Box<dyn Plugin>>,
    switches: Switches,
    undelivered: Vec<ObserverFailure>,
}

impl Configuration {
    pub fn new(plugins: Vec<Box<dyn Plugin>>, switches: Switches) -> Self {
        Self {
            plugins,
            switches,
            undelivered: Vec::new(),
        }
    }

    /// No plugins: every notification is dropped and every list is left as it is.
    pub fn null() -> Self {
        Self::new(Vec::new(), Switches::default())
    }

    pub fn switches(&self) -> Switches {
        self.switches
    }

    pub fn plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    /// Whether any plugin saw something that should fail the run.
    pub fn reported_failure(&self) -> bool {
        self.plugins.iter().any(|plugin| plugin.reported_failure())
    }

    /// The path the first plugin that supplies one wants the run restricted to.
    pub fn object_to_run(&self) -> Option<&Path> {
        self.plugins.iter().find_map(|plugin| plugin.get_object_to_run())
    }

    /// Hand back failures that could not be reported to any plugin.
    pub fn drain(&mut self) -> Result<(), RunError> {
        if self.undelivered.is_empty() {
            Ok(())
        } else {
            Err(RunError::Plugins(ObserverFailures(std::mem::take(&mut self.undelivered))))
        }
    }

    fn notify(&mut self, notification: Notification<'_>) {
        let name = notification.name();
        let failures = match PluginProxy::new(&mut self.plugins).deliver(notification) {
            Ok(()) => return,
            Err(failures) => failures,
        };
        if name == "unexpected_error" {
            self.undelivered.extend(failures);
            return;
        }
        for failure in failures {
            tracing::warn!(
                plugin = %failure.plugin,
                notification = failure.notification,
                "plugin failed: {}",
                failure.message
            );
            let report = Failure::framework(failure.to_string());
            let mut proxy = PluginProxy::new(&mut self.plugins);
            if let Err(undelivered) = proxy.deliver(Notification::UnexpectedError(&report)) {
                self.undelivered.extend(undelivered);
            }
        }
    }

    pub fn test_run_started(&mut self) {
        self.notify(Notification::TestRunStarted);
    }

    pub fn test_run_ended(&mut self) {
        self.notify(Notification::TestRunEnded);
    }

    pub fn suite_started(&mut self, suite: &SuiteInfo) {
        self.notify(Notification::SuiteStarted(suite));
    }

    pub fn suite_ended(&mut self, suite: &SuiteInfo) {
        self.notify(Notification::SuiteEnded(suite));
    }

    pub fn context_started(&mut self, context: &ContextInfo) {
        self.notify(Notification::ContextStarted(context));
    }

    pub fn context_ended(&mut self, context: &ContextInfo) {
        self.notify(Notification::ContextEnded(context));
    }

    pub fn context_errored(&mut self, context: &ContextInfo, failure: &Failure, trace: &Trace) {
        self.notify(Notification::ContextErrored(context, failure, trace));
    }

    pub fn assertion_started(&mut self, assertion: &AssertionInfo) {
        self.notify(Notification::AssertionStarted(assertion));
    }

    pub fn assertion_passed(&mut self, assertion: &AssertionInfo) {
        self.notify(Notification::AssertionPassed(assertion));
    }

    pub fn assertion_failed(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) {
        self.notify(Notification::AssertionFailed(assertion, failure, trace));
    }

    pub fn assertion_errored(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) {
        self.notify(Notification::AssertionErrored(assertion, failure, trace));
    }

    pub fn unexpected_error(&mut self, failure: &Failure) {
        self.notify(Notification::UnexpectedError(failure));
    }

    pub fn process_module_list(&mut self, suites: &mut Vec<SuiteInfo>) {
        self.notify(Notification::ProcessModuleList(suites));
    }

    pub fn process_class_list(&mut self, suite: Option<&SuiteInfo>, classes: &mut Vec<ClassInfo>) {
        self.notify(Notification::ProcessClassList(suite, classes));
    }

    pub fn process_assertion_list(&mut self, class: &ClassInfo, assertions: &mut Vec<AssertionInfo>) {
        self.notify(Notification::ProcessAssertionList(class, assertions));
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.switches == other.switches
            && self.plugins.len() == other.plugins.len()
            && self
                .plugins
                .iter()
                .zip(&other.plugins)
                .all(|(ours, theirs)| ours.same_as(theirs.as_ref()))
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.plugins.iter().map(|plugin| plugin.kind()).collect();
        f.debug_struct("Configuration")
            .field("plugins", &kinds)
            .field("switches", &self.switches)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugins::{PluginKind, PluginResult};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Grumpy;

    impl Plugin for Grumpy {
        fn kind(&self) -> PluginKind {
            PluginKind("grumpy")
        }

        fn test_run_started(&mut self) -> PluginResult {
            Err(PluginError::new("not today"))
        }
    }

    struct Listener(Log);

    impl Plugin for Listener {
        fn kind(&self) -> PluginKind {
            PluginKind("listener")
        }

        fn test_run_started(&mut self) -> PluginResult {
            self.0.borrow_mut().push("test_run_started".into());
            Ok(())
        }

        fn unexpected_error(&mut self, failure: &Failure) -> PluginResult {
            self.0.borrow_mut().push(format!("unexpected_error: {failure}"));
            Ok(())
        }
    }

    struct Deaf;

    impl Plugin for Deaf {
        fn kind(&self) -> PluginKind {
            PluginKind("deaf")
        }

        fn test_run_started(&mut self) -> PluginResult {
            Err(PluginError::new("cannot start"))
        }

        fn unexpected_error(&mut self, _: &Failure) -> PluginResult {
            Err(PluginError::new("cannot listen either"))
        }
    }

    #[test]
    fn test_plugin_failures_become_unexpected_errors() {
        let log = Log::default();
        let mut config = Configuration::new(
            vec![Box::new(Grumpy), Box::new(Listener(log.clone()))],
            Switches::default(),
        );
        config.test_run_started();
        assert_eq!(
            *log.borrow(),
            [
                "test_run_started",
                "unexpected_error: plugin 'grumpy' failed in test_run_started: not today",
            ]
        );
        assert!(config.drain().is_ok());
    }

    #[test]
    fn test_failures_while_reporting_failures_are_drained() {
        let mut config = Configuration::new(vec![Box::new(Deaf)], Switches::default());
        config.test_run_started();
        let err = config.drain().unwrap_err();
        let RunError::Plugins(failures) = err else {
            panic!("expected plugin failures");
        };
        assert_eq!(failures.0[0].notification, "unexpected_error");
        assert!(config.drain().is_ok());
    }

    #[test]
    fn test_null_configuration_leaves_lists_alone() {
        let mut config = Configuration::null();
        let mut classes = vec![ClassInfo::new("B"), ClassInfo::new("A")];
        config.process_class_list(None, &mut classes);
        assert_eq!(classes, [ClassInfo::new("B"), ClassInfo::new("A")]);
        assert!(!config.reported_failure());
        assert!(config.object_to_run().is_none());
    }

    #[test]
    fn test_equality_is_structural() {
        let log = Log::default();
        let a = Configuration::new(vec![Box::new(Grumpy), Box::new(Listener(log.clone()))], Switches::default());
        let b = Configuration::new(vec![Box::new(Grumpy), Box::new(Listener(Log::default()))], Switches::default());
        let reordered = Configuration::new(vec![Box::new(Listener(log)), Box::new(Grumpy)], Switches::default());
        let no_rewriting = Configuration::new(vec![], Switches { rewriting: false });

        assert_eq!(a, b);
        assert_ne!(a, reordered);
        assert_ne!(Configuration::null(), no_rewriting);
        assert_eq!(Configuration::null(), Configuration::null());
    }
}
