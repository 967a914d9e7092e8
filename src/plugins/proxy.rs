//! Ordered fan-out of one notification to every plugin.
//!
//! A plugin that returns an error or panics does not stop delivery: the failure is recorded and the next plugin
//! still receives the notification. Plugins that do not override a hook receive the trait's no-op default.

use crate::error::{ObserverFailure, ObserverFailures};
use crate::events::{AssertionInfo, ClassInfo, ContextInfo, Failure, SuiteInfo, Trace};
use crate::runner::catch;

use super::{Plugin, PluginResult};

/// One observer call, with its arguments.
#[derive(Debug)]
pub enum Notification<'a> {
    TestRunStarted,
    TestRunEnded,
    SuiteStarted(&'a SuiteInfo),
    SuiteEnded(&'a SuiteInfo),
    ContextStarted(&'a ContextInfo),
    ContextEnded(&'a ContextInfo),
    ContextErrored(&'a ContextInfo, &'a Failure, &'a Trace),
    AssertionStarted(&'a AssertionInfo),
    AssertionPassed(&'a AssertionInfo),
    AssertionFailed(&'a AssertionInfo, &'a Failure, &'a Trace),
    AssertionErrored(&'a AssertionInfo, &'a Failure, &'a Trace),
    UnexpectedError(&'a Failure),
    ProcessModuleList(&'a mut Vec<SuiteInfo>),
    ProcessClassList(Option<&'a SuiteInfo>, &'a mut Vec<ClassInfo>),
    ProcessAssertionList(&'a ClassInfo, &'a mut Vec<AssertionInfo>),
}

impl Notification<'_> {
    /// Name of the observer method this notification calls.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::TestRunStarted => "test_run_started",
            Notification::TestRunEnded => "test_run_ended",
            Notification::SuiteStarted(_) => "suite_started",
            Notification::SuiteEnded(_) => "suite_ended",
            Notification::ContextStarted(_) => "context_started",
            Notification::ContextEnded(_) => "context_ended",
            Notification::ContextErrored(..) => "context_errored",
            Notification::AssertionStarted(_) => "assertion_started",
            Notification::AssertionPassed(_) => "assertion_passed",
            Notification::AssertionFailed(..) => "assertion_failed",
            Notification::AssertionErrored(..) => "assertion_errored",
            Notification::UnexpectedError(_) => "unexpected_error",
            Notification::ProcessModuleList(_) => "process_module_list",
            Notification::ProcessClassList(..) => "process_class_list",
            Notification::ProcessAssertionList(..) => "process_assertion_list",
        }
    }

    /// Call the matching observer method on `plugin`.
    pub fn deliver(&mut self, plugin: &mut dyn Plugin) -> PluginResult {
        match self {
            Notification::TestRunStarted => plugin.test_run_started(),
            Notification::TestRunEnded => plugin.test_run_ended(),
            Notification::SuiteStarted(suite) => plugin.suite_started(suite),
            Notification::SuiteEnded(suite) => plugin.suite_ended(suite),
            Notification::ContextStarted(context) => plugin.context_started(context),
            Notification::ContextEnded(context) => plugin.context_ended(context),
            Notification::ContextErrored(context, failure, trace) => plugin.context_errored(context, failure, trace),
            Notification::AssertionStarted(assertion) => plugin.assertion_started(assertion),
            Notification::AssertionPassed(assertion) => plugin.assertion_passed(assertion),
            Notification::AssertionFailed(assertion, failure, trace) => {
                plugin.assertion_failed(assertion, failure, trace)
            }
            Notification::AssertionErrored(assertion, failure, trace) => {
                plugin.assertion_errored(assertion, failure, trace)
            }
            Notification::UnexpectedError(failure) => plugin.unexpected_error(failure),
            Notification::ProcessModuleList(suites) => plugin.process_module_list(suites),
            Notification::ProcessClassList(suite, classes) => plugin.process_class_list(*suite, classes),
            Notification::ProcessAssertionList(class, assertions) => plugin.process_assertion_list(class, assertions),
        }
    }
}

/// Delivers notifications to a plugin list in registration order.
pub struct PluginProxy<'p> {
    plugins: &'p mut [Box<dyn Plugin>],
}

impl<'p> PluginProxy<'p> {
    pub fn new(plugins: &'p mut [Box<dyn Plugin>]) -> Self {
        Self { plugins }
    }

    /// Deliver `notification` to every plugin.
    ///
    /// ## Returns
    /// - (`Ok(())`): every plugin handled it.
    /// - (`Err(ObserverFailures)`): the plugins that failed, in registration order. All other plugins, including
    ///   those after a failing one, still received the notification.
    pub fn deliver(&mut self, mut notification: Notification<'_>) -> Result<(), ObserverFailures> {
        let name = notification.name();
        let mut failures = Vec::new();
        for plugin in self.plugins.iter_mut() {
            let outcome = catch::capture(|| notification.deliver(plugin.as_mut()));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(caught) => format!("panicked: {}", caught.message()),
            };
            failures.push(ObserverFailure {
                plugin: plugin.kind().to_string(),
                notification: name,
                message,
            });
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ObserverFailures(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugins::PluginKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        kind: &'static str,
        log: Log,
    }

    impl Plugin for Recorder {
        fn kind(&self) -> PluginKind {
            PluginKind(self.kind)
        }

        fn context_started(&mut self, context: &ContextInfo) -> PluginResult {
            self.log.borrow_mut().push(format!("{}:{}", self.kind, context.name));
            Ok(())
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn kind(&self) -> PluginKind {
            PluginKind("failing")
        }

        fn context_started(&mut self, _: &ContextInfo) -> PluginResult {
            Err(PluginError::new("no thanks"))
        }

        fn context_ended(&mut self, _: &ContextInfo) -> PluginResult {
            panic!("exploded")
        }
    }

    struct Reverser;

    impl Plugin for Reverser {
        fn kind(&self) -> PluginKind {
            PluginKind("reverser")
        }

        fn process_class_list(&mut self, _: Option<&SuiteInfo>, classes: &mut Vec<ClassInfo>) -> PluginResult {
            classes.reverse();
            Ok(())
        }
    }

    fn recorder(kind: &'static str, log: &Log) -> Box<dyn Plugin> {
        Box::new(Recorder { kind, log: log.clone() })
    }

    #[test]
    fn test_delivery_follows_registration_order() {
        let log = Log::default();
        let mut plugins = vec![recorder("p1", &log), Box::new(Reverser) as Box<dyn Plugin>, recorder("p3", &log)];
        let context = ContextInfo::new("Spec", None);
        PluginProxy::new(&mut plugins)
            .deliver(Notification::ContextStarted(&context))
            .unwrap();
        assert_eq!(*log.borrow(), ["p1:Spec", "p3:Spec"]);
    }

    #[test]
    fn test_failures_are_isolated_and_collected() {
        let log = Log::default();
        let mut plugins = vec![recorder("p1", &log), Box::new(Failing) as Box<dyn Plugin>, recorder("p3", &log)];
        let context = ContextInfo::new("Spec", None);
        let mut proxy = PluginProxy::new(&mut plugins);

        let failures = proxy.deliver(Notification::ContextStarted(&context)).unwrap_err();
        assert_eq!(*log.borrow(), ["p1:Spec", "p3:Spec"]);
        assert_eq!(failures.0[0].plugin, "failing");
        assert_eq!(failures.0[0].notification, "context_started");
        assert_eq!(failures.0[0].message, "no thanks");

        let failures = proxy.deliver(Notification::ContextEnded(&context)).unwrap_err();
        assert_eq!(failures.0[0].message, "panicked: exploded");
    }

    #[test]
    fn test_list_hooks_share_one_list() {
        let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Reverser), Box::new(Reverser), Box::new(Reverser)];
        let mut classes = vec![ClassInfo::new("A"), ClassInfo::new("B")];
        PluginProxy::new(&mut plugins)
            .deliver(Notification::ProcessClassList(None, &mut classes))
            .unwrap();
        let names: Vec<&str> = classes.iter().map(|class| class.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
