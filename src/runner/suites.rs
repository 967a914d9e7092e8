use super::catch::CaptureScope;
use super::lifecycle::run_class;
use crate::configuration::Configuration;
use crate::error::RunError;
use crate::events::{ClassInfo, Failure, SuiteInfo};
use crate::spec::Suite;

/// Run every suite, wrapped in `test_run_started` / `test_run_ended`.
///
/// Plugins may reorder (or drop) suites, classes and assertions through the list-processing hooks. A malformed spec
/// is reported through `unexpected_error` and the run moves on to the next class; `test_run_ended` is always emitted.
///
/// ## Errors
/// - (`RunError::Plugins`): plugins failed while being told about another plugin's failure.
#[tracing::instrument(skip_all)]
pub fn run_suites<'s, I>(suites: I, config: &mut Configuration) -> Result<(), RunError>
where
    I: IntoIterator<Item = &'s Suite>,
{
    let suites: Vec<&Suite> = suites.into_iter().collect();
    tracing::debug!(suites = suites.len(), "starting run");
    let _scope = CaptureScope::enter();

    config.test_run_started();
    let mut modules: Vec<SuiteInfo> = suites
        .iter()
        .enumerate()
        .map(|(slot, suite)| SuiteInfo::attached(suite.name(), suite.path(), slot))
        .collect();
    config.process_module_list(&mut modules);

    for info in &modules {
        match suites.get(info.slot) {
            Some(suite) => run_suite(suite, info, config),
            None => tracing::debug!(suite = %info.name, "suite was not produced by the runner, skipping"),
        }
    }

    config.test_run_ended();
    config.drain()
}

fn run_suite(suite: &Suite, info: &SuiteInfo, config: &mut Configuration) {
    config.suite_started(info);
    let mut classes: Vec<ClassInfo> = suite
        .classes()
        .iter()
        .enumerate()
        .map(|(slot, class)| ClassInfo::attached(class.name(), slot))
        .collect();
    config.process_class_list(Some(info), &mut classes);

    for class_info in &classes {
        let Some(class) = suite.classes().get(class_info.slot) else {
            tracing::debug!(class = %class_info.name, "class was not produced by the runner, skipping");
            continue;
        };
        if let Err(malformed) = run_class(class, class_info, config) {
            tracing::warn!(spec = %malformed.spec, "skipping malformed spec");
            config.unexpected_error(&Failure::framework(malformed.to_string()));
        }
    }
    config.suite_ended(info);
}
