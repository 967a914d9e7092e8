#![forbid(unsafe_code)]
//! Contexts: a behaviour-driven test runner
//!
//! Specs are plain types. Their methods are sorted into an arrange → act → assert → teardown lifecycle purely by
//! name (`given_…`, `because_…`, `it_should_…`, `cleanup`), run once per spec (or once per example), and every step
//! is reported as an event to an ordered set of plugins: reporters, shufflers, argv forwarding, exit-code tracking.
//!
//! ## Layout
//!
//! - `spec` - the spec model: `Spec`, `SpecClass`, `Suite`, examples, method outcomes
//! - `runner` - the lifecycle runner and the suite driver
//! - `configuration` - the ordered plugin list plus run switches
//! - `plugins` - the plugin trait, the fan-out proxy, and the standard plugins
//! - `events` - payloads carried by notifications
//! - `cli` - the command-line driver used by harness binaries
//!
//! ## Panic Policy
//!
//! - **Library code**: errors are `Result`s propagated with `?`. Panics raised by user spec methods and plugins are
//!   caught and turned into events; the runner itself does not panic.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! ## Example
//!
//! ```ignore
//! use contexts::spec;
//!
//! #[derive(Default)]
//! struct WhenPushingOntoAStack {
//!     stack: Vec<i32>,
//! }
//!
//! #[spec]
//! impl WhenPushingOntoAStack {
//!     fn because_we_push_one(&mut self) {
//!         self.stack.push(1);
//!     }
//!
//!     fn it_should_contain_one_item(&self) {
//!         assert_eq!(self.stack.len(), 1);
//!     }
//! }
//!
//! fn main() {
//!     contexts::cli::main(vec![contexts::suite![WhenPushingOntoAStack]]);
//! }
//! ```

// Lets `#[spec]` expansions (which name `::contexts::…`) work inside this crate's own tests.
extern crate self as contexts;

pub mod cli;
pub mod configuration;
pub mod error;
pub mod events;
pub mod plugins;
pub mod runner;
pub mod spec;

pub use configuration::{Configuration, Switches};
pub use contexts_core::make_readable;
pub use contexts_derive::spec;
pub use error::{InvalidInput, ObserverFailure, ObserverFailures, PluginError, RunError};
pub use plugins::argv::argv;
pub use plugins::{Plugin, PluginKind};
pub use runner::{run, run_suites};
pub use spec::{AssertionFailure, Spec, SpecClass, Suite};

/// Fail the current assertion with a formatted message.
///
/// The failure is reported as FAILED (an assertion-style condition), never as ERRORED.
///
/// ```ignore
/// fn it_should_have_two_items(&self) {
///     if self.items.len() != 2 {
///         contexts::fail!("expected 2 items, found {}", self.items.len());
///     }
/// }
/// ```
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        ::std::panic::panic_any($crate::spec::AssertionFailure::new(::std::format!($($arg)*)))
    };
}

/// Build a [`Suite`] named after the current module, tagged with the current source file.
///
/// ```ignore
/// let suite = contexts::suite![WhenPushing, WhenPopping];
/// ```
#[macro_export]
macro_rules! suite {
    ($($spec:ty),* $(,)?) => {
        $crate::spec::Suite::new(::std::module_path!())
            .at(::std::file!())
            $(.spec::<$spec>())*
    };
}
