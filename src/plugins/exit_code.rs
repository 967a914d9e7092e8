use super::{Plugin, PluginKind, PluginResult};
use crate::events::{AssertionInfo, ContextInfo, Failure, Trace};

pub const KIND: PluginKind = PluginKind("exit-code");

/// Remembers whether anything failed, so the driver can pick the exit code.
#[derive(Debug, Default)]
pub struct ExitCodeReporter {
    failed: bool,
}

impl ExitCodeReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for ExitCodeReporter {
    fn kind(&self) -> PluginKind {
        KIND
    }

    fn reported_failure(&self) -> bool {
        self.failed
    }

    fn context_errored(&mut self, _: &ContextInfo, _: &Failure, _: &Trace) -> PluginResult {
        self.failed = true;
        Ok(())
    }

    fn assertion_failed(&mut self, _: &AssertionInfo, _: &Failure, _: &Trace) -> PluginResult {
        self.failed = true;
        Ok(())
    }

    fn assertion_errored(&mut self, _: &AssertionInfo, _: &Failure, _: &Trace) -> PluginResult {
        self.failed = true;
        Ok(())
    }

    fn unexpected_error(&mut self, _: &Failure) -> PluginResult {
        self.failed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_events_do_not_fail_the_run() {
        let mut plugin = ExitCodeReporter::new();
        let assertion = AssertionInfo::new("it_works", "Spec");
        plugin.assertion_started(&assertion).unwrap();
        plugin.assertion_passed(&assertion).unwrap();
        assert!(!plugin.reported_failure());
    }

    #[test]
    fn test_any_failure_fails_the_run() {
        let failure = Failure::framework("boom");
        let mut plugin = ExitCodeReporter::new();
        plugin.unexpected_error(&failure).unwrap();
        assert!(plugin.reported_failure());

        let mut plugin = ExitCodeReporter::new();
        plugin
            .context_errored(&ContextInfo::new("Spec", None), &failure, &Trace::default())
            .unwrap();
        assert!(plugin.reported_failure());
    }
}
