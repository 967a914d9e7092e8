//! Catching panics and errors raised by user code, and sorting them into failed vs errored.
//!
//! While a [`CaptureScope`] is alive a process-wide panic hook is installed. On a thread that is inside [`capture`]
//! it records where the panic happened instead of printing it; everywhere else it defers to the hook that was
//! installed before. Scopes are reference-counted: the previous hook comes back when the last one ends.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::events::{Failure, FailureOrigin, Trace};
use crate::spec::{AssertionFailure, BoxError, MethodResult};

type SharedHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

struct HookState {
    scopes: usize,
    installed: bool,
}

static INSTALL: Mutex<HookState> = Mutex::new(HookState {
    scopes: 0,
    installed: false,
});

// Kept apart from INSTALL so the hook never waits on a thread that is installing or restoring.
static PREVIOUS: Mutex<Option<SharedHook>> = Mutex::new(None);

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
}

struct PanicRecord {
    location: Option<String>,
    backtrace: Vec<String>,
}

/// Keeps the capturing panic hook installed.
pub(crate) struct CaptureScope {
    _private: (),
}

impl CaptureScope {
    pub(crate) fn enter() -> Self {
        let mut state = INSTALL.lock().unwrap_or_else(PoisonError::into_inner);
        state.scopes += 1;
        if !state.installed {
            let previous: SharedHook = Arc::from(panic::take_hook());
            *PREVIOUS.lock().unwrap_or_else(PoisonError::into_inner) = Some(previous);
            panic::set_hook(Box::new(capture_hook));
            state.installed = true;
            tracing::trace!("panic capture hook installed");
        }
        Self { _private: () }
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        let mut state = INSTALL.lock().unwrap_or_else(PoisonError::into_inner);
        state.scopes = state.scopes.saturating_sub(1);
        // The hook cannot be swapped while unwinding; it stays installed and the next scope reuses it.
        if state.scopes > 0 || !state.installed || thread::panicking() {
            return;
        }
        let previous = PREVIOUS.lock().unwrap_or_else(PoisonError::into_inner).take();
        match previous {
            Some(previous) => panic::set_hook(Box::new(move |info| previous(info))),
            None => drop(panic::take_hook()),
        }
        state.installed = false;
        tracing::trace!("panic capture hook removed");
    }
}

fn capture_hook(info: &PanicHookInfo<'_>) {
    if CAPTURING.with(Cell::get) {
        let location = info
            .location()
            .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()));
        let backtrace = Backtrace::capture();
        let backtrace = match backtrace.status() {
            BacktraceStatus::Captured => backtrace.to_string().lines().map(str::to_string).collect(),
            _ => Vec::new(),
        };
        LAST_PANIC.with(|last| *last.borrow_mut() = Some(PanicRecord { location, backtrace }));
        return;
    }
    let previous = PREVIOUS.lock().unwrap_or_else(PoisonError::into_inner).clone();
    if let Some(previous) = previous {
        previous(info);
    }
}

/// A panic caught by [`capture`].
pub(crate) struct Caught {
    payload: Box<dyn Any + Send>,
    record: Option<PanicRecord>,
}

impl Caught {
    pub(crate) fn message(&self) -> String {
        panic_message(self.payload.as_ref())
    }
}

/// Run `f`, catching any panic it raises.
pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> Result<T, Caught> {
    let was_capturing = CAPTURING.with(|capturing| capturing.replace(true));
    LAST_PANIC.with(|last| last.borrow_mut().take());
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|capturing| capturing.set(was_capturing));
    result.map_err(|payload| Caught {
        payload,
        record: LAST_PANIC.with(|last| last.borrow_mut().take()),
    })
}

/// Why a step did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fault {
    /// An assertion-style condition.
    Failed(Failure, Trace),
    /// Anything else.
    Errored(Failure, Trace),
}

impl Fault {
    pub(crate) fn failure(&self) -> &Failure {
        match self {
            Fault::Failed(failure, _) | Fault::Errored(failure, _) => failure,
        }
    }

    pub(crate) fn trace(&self) -> &Trace {
        match self {
            Fault::Failed(_, trace) | Fault::Errored(_, trace) => trace,
        }
    }
}

/// Run code that may only panic (factories, example generators).
pub(crate) fn guarded<T>(rewriting: bool, f: impl FnOnce() -> T) -> Result<T, Fault> {
    capture(f).map_err(|caught| panic_fault(caught, rewriting))
}

/// Run a lifecycle method, sorting both panics and returned errors.
pub(crate) fn invoke(rewriting: bool, f: impl FnOnce() -> MethodResult) -> Result<(), Fault> {
    match capture(f) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(error_fault(err, rewriting)),
        Err(caught) => Err(panic_fault(caught, rewriting)),
    }
}

/// How `assert!`, `assert_eq!` and `assert_ne!` begin their panic messages.
const STD_ASSERTION_PREFIXES: &[&str] = &["assertion failed:", "assertion `left"];

fn panic_fault(caught: Caught, rewriting: bool) -> Fault {
    let (message, assertion) = match caught.payload.downcast_ref::<AssertionFailure>() {
        Some(failure) => (failure.message().to_string(), true),
        None => {
            let message = caught.message();
            let assertion = STD_ASSERTION_PREFIXES.iter().any(|prefix| message.starts_with(prefix));
            (message, assertion)
        }
    };
    let trace = caught.record.map_or_else(Trace::default, |record| {
        Trace(record.location.into_iter().map(|at| format!("at {at}")).chain(record.backtrace).collect())
    });
    let failure = Failure::new(message, FailureOrigin::Panic);
    if assertion {
        Fault::Failed(failure, if rewriting { trace } else { Trace::default() })
    } else {
        Fault::Errored(failure, trace)
    }
}

fn error_fault(err: BoxError, rewriting: bool) -> Fault {
    let mut frames = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        frames.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    let failure = Failure::new(err.to_string(), FailureOrigin::Returned);
    if err.downcast_ref::<AssertionFailure>().is_some() {
        Fault::Failed(failure, if rewriting { Trace(frames) } else { Trace::default() })
    } else {
        Fault::Errored(failure, Trace(frames))
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(failure) = payload.downcast_ref::<AssertionFailure>() {
        failure.message().to_string()
    } else {
        "unknown panic payload".to_string()
    }
}
