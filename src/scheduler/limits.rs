//! In-flight request accounting and the optional concurrency ceiling

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Tracks outstanding requests and optionally caps them
///
/// Without a limit `acquire` never waits.
#[derive(Debug)]
pub struct InFlightLimiter {
    semaphore: Option<Arc<Semaphore>>,
    limit: Option<NonZeroUsize>,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightLimiter {
    pub fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            semaphore: limit.map(|n| Arc::new(Semaphore::new(n.get()))),
            limit,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }

    /// Wait for a slot and mark one request as outstanding until the guard drops
    pub async fn acquire(self: &Arc<Self>) -> InFlightGuard {
        let permit = match &self.semaphore {
            // The semaphore is never closed, so a failed acquire only means no permit
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        InFlightGuard {
            limiter: Arc::clone(self),
            _permit: permit,
        }
    }

    /// Requests outstanding right now
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously outstanding requests so far
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Default for InFlightLimiter {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Slot held by one outstanding request
#[derive(Debug)]
pub struct InFlightGuard {
    limiter: Arc<InFlightLimiter>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::SeqCst);
    }
}
