//! The spec model.
//!
//! - [`Spec`]: implemented (usually by `#[spec]`) for each scenario type
//! - [`SpecClass`]: a type-erased, runnable spec: method table plus factory
//! - [`Suite`]: an ordered group of spec classes
//! - [`Example`], [`example_arg`]: values for data-driven specs
//! - [`AssertionFailure`], [`IntoOutcome`]: how methods report their outcome

mod class;
mod method;
mod suite;

pub use class::{Spec, SpecClass, SpecClassBuilder};
pub(crate) use class::{ErasedClass, ErasedInstance};
pub use method::{AssertionFailure, BoxError, Example, IntoOutcome, MethodResult, SpecMethod, example_arg};
pub use suite::Suite;
