//! Spec methods: named callables, their outcomes, and the examples they may receive.

use std::any::{Any, type_name};
use std::error::Error;
use std::fmt;

/// Error type a lifecycle method may return.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Normalised result of invoking a lifecycle method.
pub type MethodResult = Result<(), BoxError>;

/// Return types a lifecycle method may declare: `()` or `Result<(), E>`.
pub trait IntoOutcome {
    fn into_outcome(self) -> MethodResult;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> MethodResult {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> MethodResult {
        self.map_err(Into::into)
    }
}

/// An assertion-style failure.
///
/// Raised as a panic payload by [`crate::fail!`] or returned as an error, it makes the runner report the step as
/// FAILED rather than ERRORED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for AssertionFailure {}

/// One value produced by a spec's `examples` generator, type-erased.
pub struct Example {
    value: Box<dyn Any>,
    repr: String,
}

impl Example {
    pub fn new<T: fmt::Debug + 'static>(value: T) -> Self {
        let repr = format!("{value:?}");
        Self {
            value: Box::new(value),
            repr,
        }
    }

    /// Wrap every value of a generator.
    pub fn collect<I>(values: I) -> Vec<Example>
    where
        I: IntoIterator,
        I::Item: fmt::Debug + 'static,
    {
        values.into_iter().map(Example::new).collect()
    }

    /// `Debug` rendering of the value, used in reports.
    pub fn repr(&self) -> &str {
        &self.repr
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

/// Resolve the example argument of a lifecycle method.
///
/// ## Returns
/// - (`Ok(&T)`): the current example, when it holds a `T`.
/// - (`Err(BoxError)`): the spec runs without examples, or the example holds another type. The step is then reported
///   as errored.
pub fn example_arg<T: 'static>(example: Option<&Example>) -> Result<&T, BoxError> {
    let example = example.ok_or_else(|| {
        format!(
            "method expects an example of type `{}` but the spec produces no examples",
            type_name::<T>()
        )
    })?;
    example.downcast_ref::<T>().ok_or_else(|| {
        format!("example {} is not a `{}`", example.repr(), type_name::<T>()).into()
    })
}

pub(crate) type CallBody<S> = Box<dyn Fn(&mut S, Option<&Example>) -> MethodResult>;
pub(crate) type ExamplesBody = Box<dyn Fn() -> Vec<Example>>;

pub(crate) enum MethodBody<S> {
    Call(CallBody<S>),
    Examples(ExamplesBody),
}

/// One entry of a spec's method table.
pub struct SpecMethod<S> {
    name: String,
    pub(crate) body: MethodBody<S>,
}

impl<S> SpecMethod<S> {
    /// A lifecycle method (establish, because, assertion or cleanup, depending on `name`).
    pub fn call<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, Option<&Example>) -> MethodResult + 'static,
    {
        Self {
            name: name.into(),
            body: MethodBody::Call(Box::new(body)),
        }
    }

    /// The examples generator.
    pub fn examples<F>(name: impl Into<String>, generator: F) -> Self
    where
        F: Fn() -> Vec<Example> + 'static,
    {
        Self {
            name: name.into(),
            body: MethodBody::Examples(Box::new(generator)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S> fmt::Debug for SpecMethod<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            MethodBody::Call(_) => "call",
            MethodBody::Examples(_) => "examples",
        };
        f.debug_struct("SpecMethod")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}
