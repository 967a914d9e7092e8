//! `--failures-only`: show console output only for contexts that failed or errored.
//!
//! Three plugins cooperate around the console reporters. `Before` is registered ahead of them and starts buffering
//! the shared [`ReportStream`] when a context starts. The master tracks whether the current context failed. `After`
//! is registered behind the reporters and, when the context ends, flushes the buffer if it failed or drops it
//! otherwise. `Before` and `After` reach the master's state through the wiring handshake.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use clap::ArgMatches;

use super::stream::ReportStream;
use super::{Environ, Plugin, PluginHandles, PluginKind, PluginResult};
use crate::error::InvalidInput;
use crate::events::{AssertionInfo, ContextInfo, Failure, Trace};

pub const MASTER: PluginKind = PluginKind("failures-only-master");
pub const BEFORE: PluginKind = PluginKind("failures-only-before");
pub const AFTER: PluginKind = PluginKind("failures-only-after");

fn enabled(args: &ArgMatches) -> bool {
    args.try_get_one::<bool>("failures_only").ok().flatten().copied().unwrap_or(false)
}

/// State the master shares with its two helpers.
#[derive(Debug)]
pub struct FailuresOnlyState {
    stream: ReportStream,
    failed: Cell<bool>,
}

impl FailuresOnlyState {
    pub fn context_failed(&self) -> bool {
        self.failed.get()
    }
}

fn master_state(requester: PluginKind, plugins: &PluginHandles) -> Result<Rc<FailuresOnlyState>, InvalidInput> {
    plugins
        .get::<FailuresOnlyState>(MASTER)
        .ok_or_else(|| InvalidInput::new(requester, format!("needs '{MASTER}' to be active")))
}

#[derive(Debug)]
pub struct FailuresOnlyMaster {
    state: Rc<FailuresOnlyState>,
}

impl FailuresOnlyMaster {
    pub fn new(stream: ReportStream) -> Self {
        Self {
            state: Rc::new(FailuresOnlyState {
                stream,
                failed: Cell::new(false),
            }),
        }
    }
}

impl Plugin for FailuresOnlyMaster {
    fn kind(&self) -> PluginKind {
        MASTER
    }

    fn initialise(&mut self, args: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
        Ok(enabled(args))
    }

    fn handle(&self) -> Option<Rc<dyn Any>> {
        Some(self.state.clone())
    }

    fn context_started(&mut self, _: &ContextInfo) -> PluginResult {
        self.state.failed.set(false);
        Ok(())
    }

    fn context_errored(&mut self, _: &ContextInfo, _: &Failure, _: &Trace) -> PluginResult {
        self.state.failed.set(true);
        Ok(())
    }

    fn assertion_failed(&mut self, _: &AssertionInfo, _: &Failure, _: &Trace) -> PluginResult {
        self.state.failed.set(true);
        Ok(())
    }

    fn assertion_errored(&mut self, _: &AssertionInfo, _: &Failure, _: &Trace) -> PluginResult {
        self.state.failed.set(true);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FailuresOnlyBefore {
    state: Option<Rc<FailuresOnlyState>>,
}

impl FailuresOnlyBefore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for FailuresOnlyBefore {
    fn kind(&self) -> PluginKind {
        BEFORE
    }

    fn initialise(&mut self, args: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
        Ok(enabled(args))
    }

    fn request_plugins(&self) -> Vec<PluginKind> {
        vec![MASTER]
    }

    fn wire(&mut self, plugins: &PluginHandles) -> Result<(), InvalidInput> {
        self.state = Some(master_state(BEFORE, plugins)?);
        Ok(())
    }

    fn context_started(&mut self, _: &ContextInfo) -> PluginResult {
        if let Some(state) = &self.state {
            state.stream.begin_buffering();
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FailuresOnlyAfter {
    state: Option<Rc<FailuresOnlyState>>,
}

impl FailuresOnlyAfter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for FailuresOnlyAfter {
    fn kind(&self) -> PluginKind {
        AFTER
    }

    fn initialise(&mut self, args: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
        Ok(enabled(args))
    }

    fn request_plugins(&self) -> Vec<PluginKind> {
        vec![MASTER]
    }

    fn wire(&mut self, plugins: &PluginHandles) -> Result<(), InvalidInput> {
        self.state = Some(master_state(AFTER, plugins)?);
        Ok(())
    }

    fn context_ended(&mut self, _: &ContextInfo) -> PluginResult {
        let Some(state) = &self.state else {
            return Ok(());
        };
        if state.context_failed() {
            state.stream.flush_buffer()?;
        } else {
            state.stream.discard_buffer();
        }
        Ok(())
    }
}
