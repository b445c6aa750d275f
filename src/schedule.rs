//! Latest-request-wins frame scheduling.
//!
//! Input changes arrive faster than frames can be drawn. A
//! [`FrameScheduler`] holds at most one pending frame; each request
//! replaces the previous one and advances a shared generation, so work
//! started for an older request can notice it has been superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifies one scheduled frame.
#[derive(Debug, Clone)]
pub struct FrameToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl FrameToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false once a newer frame was requested or the frame was
    /// cancelled.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

/// A cloneable handle to a single pending-frame slot.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    latest: Arc<AtomicU64>,
    pending: Arc<Mutex<Option<(u64, T)>>>,
}

impl<T> Clone for FrameScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            latest: Arc::clone(&self.latest),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<(u64, T)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self, generation: u64) -> FrameToken {
        FrameToken {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Schedules `frame`, superseding any pending or in-flight frame.
    pub fn request(&self, frame: T) -> FrameToken {
        let mut slot = self.slot();
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        *slot = Some((generation, frame));
        self.token(generation)
    }

    /// Drops the pending frame and invalidates every outstanding token.
    pub fn cancel(&self) {
        let mut slot = self.slot();
        self.latest.fetch_add(1, Ordering::AcqRel);
        *slot = None;
    }

    /// Takes the pending frame, if any, for drawing.
    pub fn take(&self) -> Option<(FrameToken, T)> {
        let taken = self.slot().take();
        taken.map(|(generation, frame)| (self.token(generation), frame))
    }

    pub fn has_pending(&self) -> bool {
        self.slot().is_some()
    }

    /// Generation of the most recent request or cancellation.
    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}
