//! Command-line driver for spec harnesses.
//!
//! A harness is a small binary (or `[[example]]`, or `harness = false` test target) that lists its suites and hands
//! them to [`main`]:
//!
//! ```ignore
//! fn main() {
//!     contexts::cli::main(vec![contexts::suite![WhenRollingAStrike, WhenRollingAGutterGame]]);
//! }
//! ```
//!
//! ## Flags
//!
//! - `[PATH]` - only run suites whose source file lives under this path (default: everything)
//! - `-v/--verbose` - readable context and assertion names instead of dots
//! - `-q/--quiet` - no summary
//! - `--failures-only` - only show output of contexts that failed
//! - `--no-random` - keep declaration order
//! - `--no-colour` - plain output (`NO_COLOR` works too)
//! - `--no-assert` - report assertion panics without source locations
//! - `--argv "..."` - arguments the code under test sees through [`crate::argv`]
//!
//! ## Design
//!
//! The driver's own flags are a clap derive; plugins add theirs through the builder API on top of it.
//! [`execute`] returns `CliResult` instead of calling `process::exit`. Only [`main`] exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, FromArgMatches, Parser};

use crate::configuration::Switches;
use crate::plugins::stream::ReportStream;
use crate::plugins::{Environ, PluginSet};
use crate::runner::run_suites;
use crate::spec::Suite;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. [`main`] prints the message and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run behaviour specs
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "contexts", version, about = "Run behaviour specs", long_about = None)]
pub struct Cli {
    /// Print readable context and assertion names
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip the summary at the end of the run
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Only show output for contexts that failed or errored
    #[arg(long)]
    pub failures_only: bool,

    /// Disable coloured output
    #[arg(long = "no-colour", alias = "no-color")]
    pub no_colour: bool,

    /// Report assertion panics without source locations or backtraces
    #[arg(long)]
    pub no_assert: bool,
}

impl Cli {
    pub fn switches(&self) -> Switches {
        Switches {
            rewriting: !self.no_assert,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Harness entry point: parse the process arguments, run `suites`, exit non-zero on failure.
///
/// This is the only place where `process::exit` is called.
pub fn main(suites: Vec<Suite>) {
    // Diagnostics go to stderr so they never interleave with the report
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let environ: Environ = env::vars().collect();
    match execute(env::args_os(), &environ, &suites, ReportStream::stdout()) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Parse `args`, configure the standard plugins and run the selected suites, reporting to `stream`.
///
/// ## Errors
/// - usage errors from clap, with clap's exit code
/// - invalid plugin input (a missing path, unbalanced `--argv` quotes)
/// - plugin failures that could not be reported through the plugins themselves
pub fn execute<I, T>(args: I, environ: &Environ, suites: &[Suite], stream: ReportStream) -> CliResult<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let plugins = PluginSet::standard(stream);
    let command = plugins.setup_parser(Cli::command());
    let matches = match command.try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) if err.exit_code() == 0 => {
            // --help / --version
            let _ = err.print();
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(CliError::with_code(err.render().to_string(), err.exit_code())),
    };
    let cli = Cli::from_arg_matches(&matches).map_err(|err| CliError::with_code(err.to_string(), err.exit_code()))?;

    let plugins = plugins
        .prepare(&matches, environ)
        .map_err(|err| CliError::failure(format!("{:?}", miette::Report::new(err))))?;
    let mut config = plugins.into_configuration(cli.switches());

    let cwd = env::current_dir().map_err(|e| CliError::failure(format!("Error reading working directory: {e}")))?;
    let selected = select_suites(suites, config.object_to_run(), &cwd);
    tracing::debug!(selected = selected.len(), total = suites.len(), "suites selected");

    run_suites(selected, &mut config).map_err(|err| CliError::failure(format!("{:?}", miette::Report::new(err))))?;

    if config.reported_failure() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Suites whose source file lives under `target`. Every suite is selected when there is no target or the target is
/// the working directory itself; suites without a recorded path are only selected then.
///
/// A relative suite path comes from `file!()`, which is relative to the workspace root rather than to the member a
/// harness runs from. It is resolved against the nearest of `cwd` and its ancestors where the file exists.
pub fn select_suites<'s>(suites: &'s [Suite], target: Option<&Path>, cwd: &Path) -> Vec<&'s Suite> {
    let Some(target) = target else {
        return suites.iter().collect();
    };
    let cwd = canonical(cwd.to_path_buf());
    if target == cwd {
        return suites.iter().collect();
    }
    suites
        .iter()
        .filter(|suite| {
            suite
                .path()
                .map(|path| locate(path, &cwd))
                .is_some_and(|path| path.starts_with(target))
        })
        .collect()
}

fn locate(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        return canonical(path.to_path_buf());
    }
    cwd.ancestors()
        .map(|base| base.join(path))
        .find(|candidate| candidate.exists())
        .map_or_else(|| cwd.join(path), canonical)
}

fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

// ============================================================================
// Tests
// ============================================================================
