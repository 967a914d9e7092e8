//! Plugins: observers of the run that may also contribute CLI flags and take part in configuration.
//!
//! ## Modules
//!
//! - `proxy` - [`Notification`] and the ordered, failure-isolating fan-out
//! - `shuffling` - randomised suite/class/assertion order
//! - `path_supplier` - the positional path argument
//! - `argv` - `--argv` and the scoped argv override
//! - `exit_code` - remembers whether anything failed
//! - `failures_only` - the three cooperating parts behind `--failures-only`
//! - `stream` - the shared, bufferable output of console reporters
//! - `reporters` - dots, verbose and summary console reporters
//!
//! ## Lifecycle of a plugin
//!
//! 1. `setup_parser` adds the plugin's flags to the driver's command.
//! 2. `initialise` reads the parsed flags; returning `false` drops the plugin from the run.
//! 3. Plugins that `request_plugins` are `wire`d with the `handle`s of the kinds they asked for.
//! 4. Observer methods receive events, in registration order.
//!
//! Every method has a default, so a plugin implements only the hooks it cares about.

pub mod argv;
pub mod exit_code;
pub mod failures_only;
pub mod path_supplier;
pub mod proxy;
pub mod reporters;
pub mod shuffling;
pub mod stream;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use clap::{ArgMatches, Command};

use crate::configuration::{Configuration, Switches};
use crate::error::{InvalidInput, PluginError};
use crate::events::{AssertionInfo, ClassInfo, ContextInfo, Failure, SuiteInfo, Trace};

pub use proxy::{Notification, PluginProxy};

/// Result of an observer method.
pub type PluginResult = Result<(), PluginError>;

/// Environment variables visible to plugins during `initialise`.
pub type Environ = HashMap<String, String>;

/// Identifies a kind of plugin, for equality and for the wiring handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKind(pub &'static str);

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Shared state offered by plugins to the plugins that requested them, keyed by kind.
#[derive(Default)]
pub struct PluginHandles {
    handles: HashMap<PluginKind, Rc<dyn Any>>,
}

impl PluginHandles {
    pub fn insert(&mut self, kind: PluginKind, handle: Rc<dyn Any>) {
        self.handles.insert(kind, handle);
    }

    pub fn contains(&self, kind: PluginKind) -> bool {
        self.handles.contains_key(&kind)
    }

    /// The handle of `kind`, if one was offered and it is a `T`.
    pub fn get<T: 'static>(&self, kind: PluginKind) -> Option<Rc<T>> {
        self.handles.get(&kind).cloned()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for PluginHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handles.keys().collect();
        kinds.sort();
        f.debug_struct("PluginHandles").field("kinds", &kinds).finish()
    }
}

/// An observer of the run.
#[allow(unused_variables)]
pub trait Plugin {
    fn kind(&self) -> PluginKind;

    /// Structural equality; plugins of the same kind are equal unless they carry state that says otherwise.
    fn same_as(&self, other: &dyn Plugin) -> bool {
        self.kind() == other.kind()
    }

    // ---- configuration -------------------------------------------------------------------------------------------

    fn setup_parser(&self, command: Command) -> Command {
        command
    }

    /// Whether the plugin takes part in this run.
    fn initialise(&mut self, args: &ArgMatches, environ: &Environ) -> Result<bool, InvalidInput> {
        Ok(true)
    }

    /// Kinds whose handles this plugin needs before the run starts.
    fn request_plugins(&self) -> Vec<PluginKind> {
        Vec::new()
    }

    fn wire(&mut self, plugins: &PluginHandles) -> Result<(), InvalidInput> {
        Ok(())
    }

    /// State this plugin offers to plugins that request its kind.
    fn handle(&self) -> Option<Rc<dyn Any>> {
        None
    }

    // ---- driver queries ------------------------------------------------------------------------------------------

    /// Whether anything this plugin saw should make the run exit non-zero.
    fn reported_failure(&self) -> bool {
        false
    }

    /// The filesystem path the driver should restrict the run to.
    fn get_object_to_run(&self) -> Option<&Path> {
        None
    }

    // ---- observers -----------------------------------------------------------------------------------------------

    fn test_run_started(&mut self) -> PluginResult {
        Ok(())
    }

    fn test_run_ended(&mut self) -> PluginResult {
        Ok(())
    }

    fn suite_started(&mut self, suite: &SuiteInfo) -> PluginResult {
        Ok(())
    }

    fn suite_ended(&mut self, suite: &SuiteInfo) -> PluginResult {
        Ok(())
    }

    fn context_started(&mut self, context: &ContextInfo) -> PluginResult {
        Ok(())
    }

    fn context_ended(&mut self, context: &ContextInfo) -> PluginResult {
        Ok(())
    }

    fn context_errored(&mut self, context: &ContextInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        Ok(())
    }

    fn assertion_started(&mut self, assertion: &AssertionInfo) -> PluginResult {
        Ok(())
    }

    fn assertion_passed(&mut self, assertion: &AssertionInfo) -> PluginResult {
        Ok(())
    }

    fn assertion_failed(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        Ok(())
    }

    fn assertion_errored(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        Ok(())
    }

    fn unexpected_error(&mut self, failure: &Failure) -> PluginResult {
        Ok(())
    }

    // ---- list processing -----------------------------------------------------------------------------------------

    fn process_module_list(&mut self, suites: &mut Vec<SuiteInfo>) -> PluginResult {
        Ok(())
    }

    fn process_class_list(&mut self, suite: Option<&SuiteInfo>, classes: &mut Vec<ClassInfo>) -> PluginResult {
        Ok(())
    }

    fn process_assertion_list(&mut self, class: &ClassInfo, assertions: &mut Vec<AssertionInfo>) -> PluginResult {
        Ok(())
    }
}

/// An ordered plugin list on its way to becoming a [`Configuration`].
pub struct PluginSet {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginSet {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// The standard plugins, in dispatch order. Console reporters write to `stream`.
    pub fn standard(stream: stream::ReportStream) -> Self {
        let master = failures_only::FailuresOnlyMaster::new(stream.clone());
        Self::new(vec![
            Box::new(shuffling::ShufflingPlugin::new()),
            Box::new(path_supplier::PathSupplier::new()),
            Box::new(argv::ArgvForwarder::new()),
            Box::new(exit_code::ExitCodeReporter::new()),
            Box::new(master),
            Box::new(failures_only::FailuresOnlyBefore::new()),
            Box::new(reporters::DotsReporter::new(stream.clone())),
            Box::new(reporters::VerboseReporter::new(stream.clone())),
            Box::new(reporters::SummaryReporter::new(stream)),
            Box::new(failures_only::FailuresOnlyAfter::new()),
        ])
    }

    pub fn kinds(&self) -> Vec<PluginKind> {
        self.plugins.iter().map(|plugin| plugin.kind()).collect()
    }

    /// Let every plugin add its flags.
    pub fn setup_parser(&self, command: Command) -> Command {
        self.plugins
            .iter()
            .fold(command, |command, plugin| plugin.setup_parser(command))
    }

    /// Initialise every plugin, drop those that opt out, then run the wiring handshake.
    ///
    /// ## Errors
    /// - (`InvalidInput`): a plugin rejected its input, or requested a kind that is not taking part.
    pub fn prepare(mut self, args: &ArgMatches, environ: &Environ) -> Result<Self, InvalidInput> {
        let mut participating = Vec::with_capacity(self.plugins.len());
        for mut plugin in self.plugins.drain(..) {
            if plugin.initialise(args, environ)? {
                participating.push(plugin);
            } else {
                tracing::debug!(plugin = %plugin.kind(), "plugin opted out");
            }
        }
        self.plugins = participating;
        self.wire()?;
        Ok(self)
    }

    fn wire(&mut self) -> Result<(), InvalidInput> {
        let mut handles = PluginHandles::default();
        for plugin in &self.plugins {
            if let Some(handle) = plugin.handle() {
                handles.insert(plugin.kind(), handle);
            }
        }
        for plugin in &mut self.plugins {
            let requested = plugin.request_plugins();
            if requested.is_empty() {
                continue;
            }
            if let Some(missing) = requested.iter().find(|kind| !handles.contains(**kind)) {
                tracing::warn!(plugin = %plugin.kind(), requested = %missing, "requested plugin is not active");
                return Err(InvalidInput::new(
                    plugin.kind(),
                    format!("requested plugin '{missing}' is not active"),
                ));
            }
            plugin.wire(&handles)?;
        }
        Ok(())
    }

    pub fn into_configuration(self, switches: Switches) -> Configuration {
        Configuration::new(self.plugins, switches)
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSet").field("kinds", &self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const PROVIDER: PluginKind = PluginKind("provider");

    struct Provider;

    impl Plugin for Provider {
        fn kind(&self) -> PluginKind {
            PROVIDER
        }

        fn handle(&self) -> Option<Rc<dyn Any>> {
            Some(Rc::new(Cell::new(41_u32)))
        }
    }

    #[derive(Default)]
    struct Requester {
        wired: Option<Rc<Cell<u32>>>,
    }

    impl Plugin for Requester {
        fn kind(&self) -> PluginKind {
            PluginKind("requester")
        }

        fn request_plugins(&self) -> Vec<PluginKind> {
            vec![PROVIDER]
        }

        fn wire(&mut self, plugins: &PluginHandles) -> Result<(), InvalidInput> {
            let handle = plugins
                .get::<Cell<u32>>(PROVIDER)
                .ok_or_else(|| InvalidInput::new(self.kind(), "provider offered the wrong handle"))?;
            handle.set(handle.get() + 1);
            self.wired = Some(handle);
            Ok(())
        }
    }

    struct OptOut;

    impl Plugin for OptOut {
        fn kind(&self) -> PluginKind {
            PluginKind("opt-out")
        }

        fn initialise(&mut self, _: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
            Ok(false)
        }
    }

    fn no_args() -> ArgMatches {
        Command::new("contexts").get_matches_from(["contexts"])
    }

    #[test]
    fn test_prepare_drops_plugins_that_opt_out() {
        let set = PluginSet::new(vec![Box::new(OptOut), Box::new(Provider)]);
        let set = set.prepare(&no_args(), &Environ::new()).unwrap();
        assert_eq!(set.kinds(), [PROVIDER]);
    }

    #[test]
    fn test_handshake_hands_out_handles_by_kind() {
        let set = PluginSet::new(vec![Box::new(Requester::default()), Box::new(Provider)]);
        assert!(set.prepare(&no_args(), &Environ::new()).is_ok());
    }

    #[test]
    fn test_handshake_rejects_missing_kinds() {
        let set = PluginSet::new(vec![Box::new(Requester::default())]);
        let err = set.prepare(&no_args(), &Environ::new()).unwrap_err();
        assert_eq!(err.plugin, "requester");
        assert!(err.message.contains("'provider' is not active"));
    }

    #[test]
    fn test_handles_downcast_by_type() {
        let mut handles = PluginHandles::default();
        handles.insert(PROVIDER, Rc::new(7_u8));
        assert_eq!(handles.get::<u8>(PROVIDER).as_deref(), Some(&7));
        assert!(handles.get::<String>(PROVIDER).is_none());
        assert!(handles.get::<u8>(PluginKind("other")).is_none());
    }

    #[test]
    fn test_standard_registration_order() {
        let set = PluginSet::standard(stream::ReportStream::in_memory());
        let kinds: Vec<&str> = set.kinds().into_iter().map(|kind| kind.0).collect();
        assert_eq!(
            kinds,
            [
                "shuffling",
                "path-supplier",
                "argv-forwarder",
                "exit-code",
                "failures-only-master",
                "failures-only-before",
                "dots-reporter",
                "verbose-reporter",
                "summary-reporter",
                "failures-only-after",
            ]
        );
    }

    #[test]
    fn test_setup_parser_collects_every_flag() {
        let set = PluginSet::standard(stream::ReportStream::in_memory());
        let command = set.setup_parser(Command::new("contexts"));
        let ids: Vec<String> = command.get_arguments().map(|arg| arg.get_id().to_string()).collect();
        assert!(ids.contains(&"path".to_string()));
        assert!(ids.contains(&"no_random".to_string()));
        assert!(ids.contains(&"argv".to_string()));
    }
}
