//! Console reporters.
//!
//! - [`DotsReporter`]: one character per assertion (`.` passed, `F` failed, `E` errored). Default.
//! - [`VerboseReporter`]: readable context and assertion names with their outcome (`-v`).
//! - [`SummaryReporter`]: failure details and a totals line at the end of the run (disabled by `-q`).
//!
//! All of them write through a shared [`ReportStream`] and use ANSI colours unless `--no-colour` is given or
//! `NO_COLOR` is set.

use std::io::Write;
use std::time::{Duration, Instant};

use clap::ArgMatches;
use contexts_core::make_readable;

use super::stream::ReportStream;
use super::{Environ, Plugin, PluginKind, PluginResult};
use crate::error::InvalidInput;
use crate::events::{AssertionInfo, ContextInfo, Failure, Trace};

pub const DOTS: PluginKind = PluginKind("dots-reporter");
pub const VERBOSE: PluginKind = PluginKind("verbose-reporter");
pub const SUMMARY: PluginKind = PluginKind("summary-reporter");

const RULE: &str = "----------------------------------------------------------------------";

fn flag(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

/// ANSI colouring, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn from_args(args: &ArgMatches, environ: &Environ) -> Self {
        Self::new(!flag(args, "no_colour") && !environ.contains_key("NO_COLOR"))
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}

fn readable_context(context: &ContextInfo) -> String {
    let name = make_readable(&context.name);
    match &context.example {
        Some(example) => format!("{name} -> {example}"),
        None => name,
    }
}

fn write_failure(out: &mut impl Write, indent: &str, failure: &Failure, trace: &Trace) -> PluginResult {
    for line in failure.message.lines() {
        writeln!(out, "{indent}{line}")?;
    }
    for frame in trace.frames() {
        writeln!(out, "{indent}  {frame}")?;
    }
    Ok(())
}

// ============================================================================
// Dots
// ============================================================================

#[derive(Debug)]
pub struct DotsReporter {
    stream: ReportStream,
    palette: Palette,
}

impl DotsReporter {
    pub fn new(stream: ReportStream) -> Self {
        Self {
            stream,
            palette: Palette::default(),
        }
    }

    fn mark(&mut self, mark: String) -> PluginResult {
        write!(self.stream, "{mark}")?;
        self.stream.flush()?;
        Ok(())
    }
}

impl Plugin for DotsReporter {
    fn kind(&self) -> PluginKind {
        DOTS
    }

    fn initialise(&mut self, args: &ArgMatches, environ: &Environ) -> Result<bool, InvalidInput> {
        self.palette = Palette::from_args(args, environ);
        Ok(!flag(args, "verbose"))
    }

    fn assertion_passed(&mut self, _: &AssertionInfo) -> PluginResult {
        self.mark(".".to_string())
    }

    fn assertion_failed(&mut self, _: &AssertionInfo, _: &Failure, _: &Trace) -> PluginResult {
        let mark = self.palette.red("F");
        self.mark(mark)
    }

    fn assertion_errored(&mut self, _: &AssertionInfo, _: &Failure, _: &Trace) -> PluginResult {
        let mark = self.palette.red("E");
        self.mark(mark)
    }

    fn context_errored(&mut self, _: &ContextInfo, _: &Failure, _: &Trace) -> PluginResult {
        let mark = self.palette.red("E");
        self.mark(mark)
    }

    fn test_run_ended(&mut self) -> PluginResult {
        writeln!(self.stream)?;
        Ok(())
    }
}

// ============================================================================
// Verbose
// ============================================================================

#[derive(Debug)]
pub struct VerboseReporter {
    stream: ReportStream,
    palette: Palette,
}

impl VerboseReporter {
    pub fn new(stream: ReportStream) -> Self {
        Self {
            stream,
            palette: Palette::default(),
        }
    }
}

impl Plugin for VerboseReporter {
    fn kind(&self) -> PluginKind {
        VERBOSE
    }

    fn initialise(&mut self, args: &ArgMatches, environ: &Environ) -> Result<bool, InvalidInput> {
        self.palette = Palette::from_args(args, environ);
        Ok(flag(args, "verbose"))
    }

    fn context_started(&mut self, context: &ContextInfo) -> PluginResult {
        writeln!(self.stream, "{}", readable_context(context))?;
        Ok(())
    }

    fn context_errored(&mut self, _: &ContextInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        writeln!(self.stream, "  {}", self.palette.red("ERROR"))?;
        write_failure(&mut self.stream, "    ", failure, trace)
    }

    fn assertion_passed(&mut self, assertion: &AssertionInfo) -> PluginResult {
        let status = self.palette.green("PASSED");
        writeln!(self.stream, "  - {} ({status})", make_readable(&assertion.name))?;
        Ok(())
    }

    fn assertion_failed(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        let status = self.palette.red("FAILED");
        writeln!(self.stream, "  - {} ({status})", make_readable(&assertion.name))?;
        write_failure(&mut self.stream, "      ", failure, trace)
    }

    fn assertion_errored(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        let status = self.palette.red("ERROR");
        writeln!(self.stream, "  - {} ({status})", make_readable(&assertion.name))?;
        write_failure(&mut self.stream, "      ", failure, trace)
    }

    fn unexpected_error(&mut self, failure: &Failure) -> PluginResult {
        writeln!(self.stream, "{}", self.palette.red("UNEXPECTED ERROR"))?;
        write_failure(&mut self.stream, "  ", failure, &Trace::default())
    }
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Failure,
    Error,
}

#[derive(Debug)]
struct Problem {
    severity: Severity,
    title: String,
    failure: Failure,
    trace: Trace,
}

/// Counts and failure details, printed at the end of the run.
#[derive(Debug)]
pub struct SummaryReporter {
    stream: ReportStream,
    palette: Palette,
    started: Option<Instant>,
    contexts: usize,
    assertions: usize,
    problems: Vec<Problem>,
}

impl SummaryReporter {
    pub fn new(stream: ReportStream) -> Self {
        Self {
            stream,
            palette: Palette::default(),
            started: None,
            contexts: 0,
            assertions: 0,
            problems: Vec::new(),
        }
    }

    fn record(&mut self, severity: Severity, title: String, failure: &Failure, trace: &Trace) {
        self.problems.push(Problem {
            severity,
            title,
            failure: failure.clone(),
            trace: trace.clone(),
        });
    }

    fn count(&self, severity: Severity) -> usize {
        self.problems.iter().filter(|problem| problem.severity == severity).count()
    }

    /// The end-of-run report.
    pub fn render(&self, elapsed: Duration) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render_into(&mut out, elapsed);
        String::from_utf8_lossy(&out).into_owned()
    }

    fn render_into(&self, out: &mut Vec<u8>, elapsed: Duration) -> PluginResult {
        if !self.problems.is_empty() {
            writeln!(out)?;
            for problem in &self.problems {
                let label = match problem.severity {
                    Severity::Failure => "FAIL",
                    Severity::Error => "ERROR",
                };
                writeln!(out, "{RULE}")?;
                writeln!(out, "{}: {}", self.palette.red(label), problem.title)?;
                write_failure(out, "  ", &problem.failure, &problem.trace)?;
            }
            writeln!(out, "{RULE}")?;
        }

        let failed = self.count(Severity::Failure);
        let errors = self.count(Severity::Error);
        let totals = format!(
            "====== {}, {}: {} failed, {} in {:.2}s ======",
            plural(self.contexts, "context"),
            plural(self.assertions, "assertion"),
            failed,
            plural(errors, "error"),
            elapsed.as_secs_f64()
        );
        if self.problems.is_empty() {
            writeln!(out, "{}", self.palette.green(&totals))?;
            writeln!(out, "{}", self.palette.green("PASSED!"))?;
        } else {
            writeln!(out, "{}", self.palette.red(&totals))?;
            writeln!(out, "{}", self.palette.red("FAILED!"))?;
        }
        Ok(())
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

impl Plugin for SummaryReporter {
    fn kind(&self) -> PluginKind {
        SUMMARY
    }

    fn initialise(&mut self, args: &ArgMatches, environ: &Environ) -> Result<bool, InvalidInput> {
        self.palette = Palette::from_args(args, environ);
        Ok(!flag(args, "quiet"))
    }

    fn test_run_started(&mut self) -> PluginResult {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn context_started(&mut self, _: &ContextInfo) -> PluginResult {
        self.contexts += 1;
        Ok(())
    }

    fn assertion_started(&mut self, _: &AssertionInfo) -> PluginResult {
        self.assertions += 1;
        Ok(())
    }

    fn context_errored(&mut self, context: &ContextInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        self.record(Severity::Error, context.to_string(), failure, trace);
        Ok(())
    }

    fn assertion_failed(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        let title = format!("{} :: {}", assertion.context, assertion.name);
        self.record(Severity::Failure, title, failure, trace);
        Ok(())
    }

    fn assertion_errored(&mut self, assertion: &AssertionInfo, failure: &Failure, trace: &Trace) -> PluginResult {
        let title = format!("{} :: {}", assertion.context, assertion.name);
        self.record(Severity::Error, title, failure, trace);
        Ok(())
    }

    fn unexpected_error(&mut self, failure: &Failure) -> PluginResult {
        self.record(Severity::Error, "unexpected error".to_string(), failure, &Trace::default());
        Ok(())
    }

    fn test_run_ended(&mut self) -> PluginResult {
        let elapsed = self.started.map(|started| started.elapsed()).unwrap_or_default();
        let report = self.render(elapsed);
        self.stream.write_all(report.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }
}
