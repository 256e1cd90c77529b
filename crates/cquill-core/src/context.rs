use crate::error::Error;
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

///
/// ErrorInjector
///
/// Test hook carried by a `Context`. Multi-operations call `inject` once
/// per operation with the operation's per-run index (0-based); a
/// returned error aborts the run and surfaces verbatim.
///

pub trait ErrorInjector: Send + Sync {
    fn inject(&self, op_index: usize) -> Option<Error>;
}

///
/// CancelHandle
///
/// Trips the cancellation flag shared with one or more contexts.
///

#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///
/// Context
///
/// Per-run carrier for cancellation and error injection. Cheap to clone
/// and freely shareable; the default context never cancels and never
/// injects.
///

#[derive(Clone, Default)]
pub struct Context {
    cancel: Option<Arc<AtomicBool>>,
    injector: Option<Arc<dyn ErrorInjector>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context plus the handle that cancels it.
    #[must_use]
    pub fn cancellable() -> (Self, CancelHandle) {
        let handle = CancelHandle::default();
        let ctx = Self {
            cancel: Some(Arc::clone(&handle.0)),
            injector: None,
        };
        (ctx, handle)
    }

    /// Attach an error injector; statement execution consults it before
    /// every operation.
    #[must_use]
    pub fn with_error_injector(mut self, injector: Arc<dyn ErrorInjector>) -> Self {
        self.injector = Some(injector);
        self
    }

    /// True when the context carries neither a cancellation flag nor an
    /// injector; merges keep the existing context in that case.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.cancel.is_none() && self.injector.is_none()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Error to return before executing, if cancellation has tripped.
    pub fn check_cancelled(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn injector(&self) -> Option<&Arc<dyn ErrorInjector>> {
        self.injector.as_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("has_injector", &self.injector.is_some())
            .finish()
    }
}
