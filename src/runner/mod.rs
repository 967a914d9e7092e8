//! Running specs.
//!
//! - `lifecycle` - one spec class through arrange → act → assert → teardown, once per example
//! - `suites` - the whole run: suites, their classes, and the run-level events around them
//! - `catch` - panic capture and failed/errored classification

pub(crate) mod catch;
mod lifecycle;
mod suites;

pub use lifecycle::run;
pub use suites::run_suites;
