//! Spec classes: a spec type's method table plus a factory, behind a type-erased handle.

use std::fmt;

use contexts_core::{LifecyclePlan, MalformedSpec, plan_lifecycle};

use super::method::{Example, MethodBody, MethodResult, SpecMethod};

/// A type whose methods form one arrange/act/assert/teardown scenario.
///
/// Implemented by `#[contexts::spec]`; implement it by hand only to control the method table directly.
pub trait Spec: Sized + 'static {
    fn spec_name() -> &'static str;

    /// Method table in declaration order.
    fn spec_methods() -> Vec<SpecMethod<Self>>;
}

pub(crate) trait ErasedClass {
    fn method_names(&self) -> Vec<&str>;

    /// Run the examples generator at `slot`. May panic.
    fn examples(&self, slot: usize) -> Vec<Example>;

    /// Build a fresh instance. May panic.
    fn instantiate(&self) -> Box<dyn ErasedInstance + '_>;
}

pub(crate) trait ErasedInstance {
    /// Invoke the lifecycle method at `slot`. May panic.
    fn invoke(&mut self, slot: usize, example: Option<&Example>) -> MethodResult;
}

struct TypedClass<S> {
    factory: Box<dyn Fn() -> S>,
    methods: Vec<SpecMethod<S>>,
}

struct TypedInstance<'a, S> {
    spec: S,
    methods: &'a [SpecMethod<S>],
}

impl<S: 'static> ErasedClass for TypedClass<S> {
    fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(SpecMethod::name).collect()
    }

    fn examples(&self, slot: usize) -> Vec<Example> {
        match self.methods.get(slot).map(|method| &method.body) {
            Some(MethodBody::Examples(generator)) => generator(),
            _ => Vec::new(),
        }
    }

    fn instantiate(&self) -> Box<dyn ErasedInstance + '_> {
        Box::new(TypedInstance {
            spec: (self.factory)(),
            methods: &self.methods,
        })
    }
}

impl<S> ErasedInstance for TypedInstance<'_, S> {
    fn invoke(&mut self, slot: usize, example: Option<&Example>) -> MethodResult {
        match self.methods.get(slot).map(|method| (method.name(), &method.body)) {
            Some((_, MethodBody::Call(body))) => body(&mut self.spec, example),
            Some((name, MethodBody::Examples(_))) => {
                Err(format!("`{name}` is an examples generator, not a lifecycle method").into())
            }
            None => Err(format!("no spec method at index {slot}").into()),
        }
    }
}

/// A runnable spec class.
///
/// ## Examples
/// ```rust
/// use contexts::spec::SpecClass;
///
/// #[derive(Default)]
/// struct Counter(u32);
///
/// let class = SpecClass::builder("Counter", Counter::default)
///     .method("because_it_counts", |c: &mut Counter, _| {
///         c.0 += 1;
///         Ok(())
///     })
///     .method("it_should_count_once", |c: &mut Counter, _| {
///         assert_eq!(c.0, 1);
///         Ok(())
///     })
///     .build();
///
/// assert_eq!(class.method_names(), ["because_it_counts", "it_should_count_once"]);
/// ```
pub struct SpecClass {
    name: String,
    inner: Box<dyn ErasedClass>,
}

impl SpecClass {
    /// The class of a `#[spec]` type, instantiated with `Default`.
    pub fn of<S: Spec + Default>() -> Self {
        Self::with_factory(S::default)
    }

    /// The class of a `#[spec]` type, instantiated with `factory`.
    pub fn with_factory<S: Spec>(factory: impl Fn() -> S + 'static) -> Self {
        Self::from_parts(S::spec_name(), Box::new(factory), S::spec_methods())
    }

    /// Assemble a class by hand, with arbitrary method names.
    pub fn builder<S: 'static>(name: impl Into<String>, factory: impl Fn() -> S + 'static) -> SpecClassBuilder<S> {
        SpecClassBuilder {
            name: name.into(),
            factory: Box::new(factory),
            methods: Vec::new(),
        }
    }

    fn from_parts<S: 'static>(name: impl Into<String>, factory: Box<dyn Fn() -> S>, methods: Vec<SpecMethod<S>>) -> Self {
        Self {
            name: name.into(),
            inner: Box::new(TypedClass { factory, methods }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.inner.method_names()
    }

    /// Assign lifecycle roles to the methods.
    pub fn plan(&self) -> Result<LifecyclePlan, MalformedSpec> {
        plan_lifecycle(&self.name, &self.inner.method_names())
    }

    pub(crate) fn erased(&self) -> &dyn ErasedClass {
        self.inner.as_ref()
    }
}

impl fmt::Debug for SpecClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecClass")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Builder returned by [`SpecClass::builder`].
pub struct SpecClassBuilder<S> {
    name: String,
    factory: Box<dyn Fn() -> S>,
    methods: Vec<SpecMethod<S>>,
}

impl<S: 'static> SpecClassBuilder<S> {
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut S, Option<&Example>) -> MethodResult + 'static,
    {
        self.methods.push(SpecMethod::call(name, body));
        self
    }

    pub fn examples<F>(mut self, name: impl Into<String>, generator: F) -> Self
    where
        F: Fn() -> Vec<Example> + 'static,
    {
        self.methods.push(SpecMethod::examples(name, generator));
        self
    }

    pub fn build(self) -> SpecClass {
        SpecClass::from_parts(self.name, self.factory, self.methods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contexts_core::MethodRole;

    #[derive(Default)]
    struct Tally(Vec<&'static str>);

    fn tally_class() -> SpecClass {
        SpecClass::builder("Tally", Tally::default)
            .method("given_a_tally", |t: &mut Tally, _| {
                t.0.push("given");
                Ok(())
            })
            .examples("examples", || Example::collect([1u8, 2]))
            .method("it_records", |t: &mut Tally, _| {
                if t.0 == ["given"] {
                    Ok(())
                } else {
                    Err("wrong order".into())
                }
            })
            .build()
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let class = tally_class();
        assert_eq!(class.name(), "Tally");
        assert_eq!(class.method_names(), ["given_a_tally", "examples", "it_records"]);
    }

    #[test]
    fn test_plan_indexes_the_method_table() {
        let plan = tally_class().plan().unwrap();
        assert_eq!(plan.singleton(MethodRole::Establish), Some(0));
        assert_eq!(plan.examples, Some(1));
        assert_eq!(plan.assertions, vec![2]);
    }

    #[test]
    fn test_instances_invoke_by_slot() {
        let class = tally_class();
        let mut instance = class.erased().instantiate();
        instance.invoke(0, None).unwrap();
        instance.invoke(2, None).unwrap();
        assert!(instance.invoke(1, None).is_err());
        assert!(instance.invoke(9, None).is_err());
        assert_eq!(class.erased().examples(1).len(), 2);
        assert!(class.erased().examples(0).is_empty());
    }

    #[test]
    fn test_each_instantiation_is_fresh() {
        let class = tally_class();
        let mut first = class.erased().instantiate();
        first.invoke(0, None).unwrap();
        first.invoke(0, None).unwrap();
        assert!(first.invoke(2, None).is_err());

        let mut second = class.erased().instantiate();
        second.invoke(0, None).unwrap();
        assert!(second.invoke(2, None).is_ok());
    }
}
