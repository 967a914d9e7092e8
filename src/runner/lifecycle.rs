use contexts_core::{LifecyclePlan, MalformedSpec};

use super::catch::{self, CaptureScope, Fault};
use crate::configuration::Configuration;
use crate::error::RunError;
use crate::events::{AssertionInfo, ClassInfo, ContextInfo};
use crate::spec::{ErasedClass, ErasedInstance, Example, SpecClass};

/// Run one spec class: once, or once per example when it has an `examples` generator.
///
/// Errors raised by the spec's own methods never escape; they are reported as events. A context whose establish or
/// because step fails skips its assertions, but cleanup still runs and `context_ended` is always emitted.
///
/// ## Errors
/// - (`RunError::MalformedSpec`): a singleton role is claimed by more than one method. Nothing is emitted.
/// - (`RunError::Plugins`): plugins failed while being told about another plugin's failure.
#[tracing::instrument(skip_all, fields(spec = class.name()))]
pub fn run(class: &SpecClass, config: &mut Configuration) -> Result<(), RunError> {
    let _scope = CaptureScope::enter();
    run_class(class, &ClassInfo::attached(class.name(), 0), config)?;
    config.drain()
}

pub(crate) fn run_class(class: &SpecClass, info: &ClassInfo, config: &mut Configuration) -> Result<(), MalformedSpec> {
    let plan = class.plan()?;
    tracing::debug!(
        establish = plan.establish.is_some(),
        because = plan.because.is_some(),
        assertions = plan.assertions.len(),
        cleanup = plan.cleanup.is_some(),
        examples = plan.examples.is_some(),
        "planned lifecycle"
    );

    let names = class.method_names();
    let runner = ContextRunner {
        class: class.erased(),
        info,
        plan: &plan,
        names: &names,
        rewriting: config.switches().rewriting,
    };

    let Some(slot) = plan.examples else {
        runner.run(None, config);
        return Ok(());
    };
    match catch::guarded(runner.rewriting, || runner.class.examples(slot)) {
        Ok(examples) => {
            tracing::debug!(count = examples.len(), "examples generated");
            for example in &examples {
                runner.run(Some(example), config);
            }
        }
        Err(fault) => {
            let context = ContextInfo::new(info.name.clone(), None);
            config.context_started(&context);
            report_context_fault(&context, &fault, config);
            config.context_ended(&context);
        }
    }
    Ok(())
}

struct ContextRunner<'r> {
    class: &'r dyn ErasedClass,
    info: &'r ClassInfo,
    plan: &'r LifecyclePlan,
    names: &'r [&'r str],
    rewriting: bool,
}

impl ContextRunner<'_> {
    fn run(&self, example: Option<&Example>, config: &mut Configuration) {
        let context = ContextInfo::new(self.info.name.clone(), example.map(|example| example.repr().to_string()));
        config.context_started(&context);
        match catch::guarded(self.rewriting, || self.class.instantiate()) {
            Ok(mut instance) => self.run_instance(instance.as_mut(), &context, example, config),
            Err(fault) => report_context_fault(&context, &fault, config),
        }
        config.context_ended(&context);
    }

    fn run_instance(
        &self,
        instance: &mut (dyn ErasedInstance + '_),
        context: &ContextInfo,
        example: Option<&Example>,
        config: &mut Configuration,
    ) {
        let arranged = [self.plan.establish, self.plan.because]
            .into_iter()
            .flatten()
            .try_for_each(|slot| catch::invoke(self.rewriting, || instance.invoke(slot, example)));

        match arranged {
            Ok(()) => self.run_assertions(instance, context, example, config),
            Err(fault) => {
                tracing::debug!(context = %context, "context errored, skipping assertions");
                report_context_fault(context, &fault, config);
            }
        }

        if let Some(slot) = self.plan.cleanup {
            if let Err(fault) = catch::invoke(self.rewriting, || instance.invoke(slot, example)) {
                report_context_fault(context, &fault, config);
            }
        }
    }

    fn run_assertions(
        &self,
        instance: &mut (dyn ErasedInstance + '_),
        context: &ContextInfo,
        example: Option<&Example>,
        config: &mut Configuration,
    ) {
        let owner = context.to_string();
        let mut assertions: Vec<AssertionInfo> = self
            .plan
            .assertions
            .iter()
            .filter_map(|&slot| {
                let name = self.names.get(slot)?;
                Some(AssertionInfo::attached(*name, owner.as_str(), slot))
            })
            .collect();
        config.process_assertion_list(self.info, &mut assertions);

        for assertion in &assertions {
            if !self.plan.assertions.contains(&assertion.slot) {
                tracing::debug!(assertion = %assertion.name, "not an assertion of this spec, skipping");
                continue;
            }
            config.assertion_started(assertion);
            match catch::invoke(self.rewriting, || instance.invoke(assertion.slot, example)) {
                Ok(()) => config.assertion_passed(assertion),
                Err(Fault::Failed(failure, trace)) => config.assertion_failed(assertion, &failure, &trace),
                Err(Fault::Errored(failure, trace)) => config.assertion_errored(assertion, &failure, &trace),
            }
        }
    }
}

fn report_context_fault(context: &ContextInfo, fault: &Fault, config: &mut Configuration) {
    config.context_errored(context, fault.failure(), fault.trace());
}
