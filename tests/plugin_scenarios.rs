//! Plugins driven through the public API: fan-out, path supply, argv forwarding and the CLI driver

use std::cell::RefCell;
use std::rc::Rc;

use clap::Command;
use contexts::cli::{ExitCode, execute};
use contexts::events::{ContextInfo, Failure};
use contexts::plugins::path_supplier::PathSupplier;
use contexts::plugins::stream::ReportStream;
use contexts::plugins::{Environ, Notification, PluginProxy, PluginResult};
use contexts::{Plugin, PluginKind, SpecClass, Suite, spec};

// =============================================================================
// Fan-out
// =============================================================================

type Calls = Rc<RefCell<Vec<String>>>;

struct Listening(&'static str, Calls);

impl Plugin for Listening {
    fn kind(&self) -> PluginKind {
        PluginKind(self.0)
    }

    fn unexpected_error(&mut self, failure: &Failure) -> PluginResult {
        self.1.borrow_mut().push(format!("{}.unexpected_error({failure})", self.0));
        Ok(())
    }
}

/// Implements nothing beyond its kind.
struct Silent;

impl Plugin for Silent {
    fn kind(&self) -> PluginKind {
        PluginKind("p2")
    }
}

#[test]
fn test_proxy_skips_plugins_without_the_hook() {
    let calls = Calls::default();
    let mut plugins: Vec<Box<dyn Plugin>> = vec![
        Box::new(Listening("p1", calls.clone())),
        Box::new(Silent),
        Box::new(Listening("p3", calls.clone())),
    ];
    let failure = Failure::framework("x");

    let result = PluginProxy::new(&mut plugins).deliver(Notification::UnexpectedError(&failure));

    assert!(result.is_ok());
    assert_eq!(*calls.borrow(), ["p1.unexpected_error(x)", "p3.unexpected_error(x)"]);
}

// =============================================================================
// Path supplier
// =============================================================================

#[test]
fn test_path_supplier_rejects_a_missing_path() {
    let mut plugin = PathSupplier::new();
    let args = plugin
        .setup_parser(Command::new("contexts"))
        .try_get_matches_from(["contexts", "made/up/path"])
        .unwrap();

    let err = plugin.initialise(&args, &Environ::new()).unwrap_err();

    assert_eq!(err.plugin, "path-supplier");
    assert!(err.message.contains("made/up/path"));
}

// =============================================================================
// Argv forwarding, end to end
// =============================================================================

#[derive(Default)]
struct WhenReadingTheArguments {
    seen: Vec<String>,
}

#[spec]
impl WhenReadingTheArguments {
    fn because_the_code_under_test_reads_argv(&mut self) {
        self.seen = contexts::argv();
    }

    fn it_should_see_the_forwarded_tail(&self) {
        assert_eq!(&self.seen[1..], ["a", "b", "c d"]);
    }
}

#[test]
fn test_argv_is_forwarded_during_the_run_only() {
    let before = contexts::argv();
    let suites = [Suite::new("argv").spec::<WhenReadingTheArguments>()];
    let stream = ReportStream::in_memory();

    let code = execute(
        ["contexts", "--no-colour", "--argv", "a b 'c d'"],
        &Environ::new(),
        &suites,
        stream.clone(),
    )
    .unwrap();

    assert_eq!(code, ExitCode::SUCCESS, "{}", stream.captured());
    assert_eq!(contexts::argv(), before);
}

// =============================================================================
// Driver
// =============================================================================

#[derive(Default)]
struct WhenTheBallFindsTheGutter {
    pins: u32,
}

#[spec]
impl WhenTheBallFindsTheGutter {
    fn because_no_pins_fall(&mut self) {
        self.pins = 0;
    }

    fn it_should_score_nothing(&self) {
        assert_eq!(self.pins, 0);
    }

    fn it_should_leave_a_spare_chance(&self) -> Result<(), String> {
        Err("spares are not implemented".to_string())
    }
}

fn drive(args: &[&str]) -> (ExitCode, String) {
    let suites = [Suite::new("gutter").spec::<WhenTheBallFindsTheGutter>()];
    let stream = ReportStream::in_memory();
    let mut argv = vec!["contexts", "--no-colour", "--no-random"];
    argv.extend_from_slice(args);
    let code = execute(argv, &Environ::new(), &suites, stream.clone()).unwrap();
    (code, stream.captured())
}

#[test]
fn test_driver_verbose_report() {
    let (code, output) = drive(&["-v"]);
    assert_eq!(code, ExitCode::FAILURE);
    let report: Vec<&str> = output.lines().take(4).collect();
    insta::assert_snapshot!(report.join("\n"), @r"
When the ball finds the gutter
  - it should score nothing (PASSED)
  - it should leave a spare chance (ERROR)
      spares are not implemented
");
}

#[test]
fn test_driver_quiet_dots() {
    let (code, output) = drive(&["-q"]);
    assert_eq!(code, ExitCode::FAILURE);
    assert_eq!(output, ".E\n");
}

#[test]
fn test_driver_failures_only_hides_passing_contexts() {
    let passing = SpecClass::builder("WhenAllIsWell", || ())
        .method("it_passes", |_, _| Ok(()))
        .build();
    let suites = [Suite::new("calm").class(passing)];
    let stream = ReportStream::in_memory();

    let code = execute(
        ["contexts", "--no-colour", "-q", "--failures-only"],
        &Environ::new(),
        &suites,
        stream.clone(),
    )
    .unwrap();

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(stream.captured(), "\n");
}

#[test]
fn test_context_display_matches_the_report() {
    let context = ContextInfo::new("WhenTheBallFindsTheGutter", None);
    assert_eq!(contexts::make_readable(&context.name), "When the ball finds the gutter");
}
