use crate::{context::ErrorInjector, error::Error};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

///
/// NeverFail
///
/// Baseline injector: every operation succeeds.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NeverFail;

impl ErrorInjector for NeverFail {
    fn inject(&self, _op_index: usize) -> Option<Error> {
        None
    }
}

///
/// FailOnNthOperation
///
/// The nth injected call (1-based, counted across runs) fails with the
/// configured error; every other call succeeds.
///

#[derive(Debug)]
pub struct FailOnNthOperation {
    nth: usize,
    error: Error,
    calls: AtomicUsize,
}

impl FailOnNthOperation {
    #[must_use]
    pub const fn new(nth: usize, error: Error) -> Self {
        Self {
            nth,
            error,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ErrorInjector for FailOnNthOperation {
    fn inject(&self, _op_index: usize) -> Option<Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (call == self.nth).then(|| self.error.clone())
    }
}

///
/// FailOnEachOperation
///
/// Each operation position fails exactly once, in order: the first run
/// fails at position 0, the next at position 1, and so on. Once every
/// position has failed a full run goes through clean. Drives retry
/// loops in tests; `last_injected_index` and `should_continue` observe
/// the latest run.
///

#[derive(Debug)]
pub struct FailOnEachOperation {
    error: Error,
    state: Mutex<EachState>,
}

#[derive(Debug, Default)]
struct EachState {
    fail_at: usize,
    last_injected: Option<usize>,
}

impl FailOnEachOperation {
    #[must_use]
    pub fn new(error: Error) -> Self {
        Self {
            error,
            state: Mutex::new(EachState::default()),
        }
    }

    /// Position that failed during the latest started run, if any.
    #[must_use]
    pub fn last_injected_index(&self) -> Option<usize> {
        self.state.lock().expect("injector lock").last_injected
    }

    /// True while the latest started run had an error injected, i.e.
    /// the retry loop has more positions to cover.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        self.last_injected_index().is_some()
    }
}

impl ErrorInjector for FailOnEachOperation {
    fn inject(&self, op_index: usize) -> Option<Error> {
        let mut state = self.state.lock().expect("injector lock");
        if op_index == 0 {
            state.last_injected = None;
        }
        if op_index == state.fail_at {
            state.fail_at += 1;
            state.last_injected = Some(op_index);
            return Some(self.error.clone());
        }
        None
    }
}
