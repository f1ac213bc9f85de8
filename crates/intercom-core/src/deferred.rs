//! Deferred destruction of host-owned handles.
//!
//! A call must never be released on the stack of a handler that the call
//! itself invoked: the dispatch still iterating that call's headers would
//! return into freed state. Scheduling the owned handle here parks it on a
//! process-wide pending list that is dropped in one pass on the next
//! reactor tick, after the current dispatch has fully unwound.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

struct Inner {
    pending: Mutex<Vec<Box<dyn Any + Send>>>,
    armed: AtomicBool,
}

/// Process-wide queue of handles awaiting release.
#[derive(Clone)]
pub struct DeferredDestructionQueue {
    inner: Arc<Inner>,
}

impl DeferredDestructionQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: Mutex::new(Vec::new()),
                armed: AtomicBool::new(false),
            }),
        }
    }

    /// Appends a handle to the pending list and arms the zero-delay flush.
    /// Arming while already armed is a no-op; everything scheduled within
    /// the same tick is released together, in append order, on the next.
    pub fn schedule(&self, handle: Box<dyn Any + Send>) {
        self.inner.pending.lock().push(handle);

        if self.inner.armed.swap(true, Ordering::AcqRel) {
            return;
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            inner.armed.store(false, Ordering::Release);

            let drained = std::mem::take(&mut *inner.pending.lock());
            debug!("intercom: releasing {} deferred handle(s)", drained.len());
            drop(drained);
        });
    }

    /// Number of handles still awaiting release.
    pub fn pending(&self) -> usize {
        self.inner.pending.lock().len()
    }
}

impl Default for DeferredDestructionQueue {
    fn default() -> Self {
        Self::new()
    }
}
