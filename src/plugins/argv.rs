//! Forwarding `--argv` to the code under test.
//!
//! A Rust process cannot rewrite its own argument vector, so the override lives in a process-wide slot read through
//! [`argv`]. Code under test that wants to honour `--argv` reads its arguments from there instead of
//! `std::env::args`.

use std::env;
use std::sync::{Mutex, PoisonError};

use clap::{Arg, ArgMatches, Command};

use super::{Environ, Plugin, PluginKind, PluginResult};
use crate::error::InvalidInput;

pub const KIND: PluginKind = PluginKind("argv-forwarder");

static OVERRIDE: Mutex<Option<Vec<String>>> = Mutex::new(None);

/// The argument vector the code under test should see: the `--argv` override while a run is forwarding one, the
/// process arguments otherwise.
pub fn argv() -> Vec<String> {
    let current = OVERRIDE.lock().unwrap_or_else(PoisonError::into_inner).clone();
    current.unwrap_or_else(process_args)
}

fn process_args() -> Vec<String> {
    env::args_os().map(|arg| arg.to_string_lossy().into_owned()).collect()
}

/// Replaces the tail of [`argv`] until dropped. The program name (`argv[0]`) is kept.
#[derive(Debug)]
pub struct ArgvGuard {
    previous: Option<Vec<String>>,
}

impl ArgvGuard {
    pub fn install(tail: Vec<String>) -> Self {
        let mut slot = OVERRIDE.lock().unwrap_or_else(PoisonError::into_inner);
        let program = slot
            .as_ref()
            .and_then(|current| current.first().cloned())
            .or_else(|| env::args_os().next().map(|arg| arg.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let mut replacement = Vec::with_capacity(tail.len() + 1);
        replacement.push(program);
        replacement.extend(tail);
        let previous = slot.replace(replacement);
        Self { previous }
    }
}

impl Drop for ArgvGuard {
    fn drop(&mut self) {
        *OVERRIDE.lock().unwrap_or_else(PoisonError::into_inner) = self.previous.take();
    }
}

/// Installs the `--argv` override for the duration of the run.
#[derive(Debug, Default)]
pub struct ArgvForwarder {
    tail: Option<Vec<String>>,
    guard: Option<ArgvGuard>,
}

impl ArgvForwarder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for ArgvForwarder {
    fn kind(&self) -> PluginKind {
        KIND
    }

    fn setup_parser(&self, command: Command) -> Command {
        command.arg(
            Arg::new("argv")
                .long("argv")
                .value_name("ARGS")
                .allow_hyphen_values(true)
                .help("Arguments the code under test sees while the run is active (shell quoting rules)"),
        )
    }

    fn initialise(&mut self, args: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
        let Some(raw) = args.try_get_one::<String>("argv").ok().flatten() else {
            return Ok(false);
        };
        let tail = shlex::split(raw)
            .ok_or_else(|| InvalidInput::new(KIND, format!("cannot tokenize --argv {raw:?}")))?;
        tracing::debug!(?tail, "forwarding argv");
        self.tail = Some(tail);
        Ok(true)
    }

    fn test_run_started(&mut self) -> PluginResult {
        if let Some(tail) = &self.tail {
            self.guard = None;
            self.guard = Some(ArgvGuard::install(tail.clone()));
        }
        Ok(())
    }

    fn test_run_ended(&mut self) -> PluginResult {
        self.guard = None;
        Ok(())
    }
}
