//! Thread-safe render request queue.
//!
//! Commands arrive on a console context that may run concurrently with the
//! simulation, while rendering must stay on the tick context that owns the
//! device. The queue is the only data shared between the two: enqueue from
//! anywhere, drain at most one job per tick. No priority, no deduplication,
//! no cancellation; a map queued twice renders twice.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Opaque token naming a loaded map.
///
/// Handles are re-resolved against the host at render time, so a handle
/// whose map was unloaded after queueing fails that job gracefully instead
/// of dereferencing stale data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapHandle {
    name: String,
}

impl MapHandle {
    /// Create a handle for a map name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The map name this handle resolves through.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One queued export request, consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub handle: MapHandle,
}

/// Unbounded FIFO queue of render jobs, safe for concurrent enqueue and
/// dequeue. Clones share the same underlying queue.
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    inner: Arc<Mutex<VecDeque<RenderJob>>>,
}

impl RenderQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job to the back of the queue. Always succeeds.
    pub fn enqueue(&self, handle: MapHandle) {
        self.lock().push_back(RenderJob { handle });
    }

    /// Take the oldest job, or `None` when no work is pending.
    ///
    /// Non-blocking; callers drain at most one job per tick so a batch
    /// export spreads its cost over many ticks instead of stalling one.
    pub fn try_dequeue(&self) -> Option<RenderJob> {
        self.lock().pop_front()
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether any work is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<RenderJob>> {
        // A panicked enqueue cannot leave the deque inconsistent, so a
        // poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = RenderQueue::new();
        queue.enqueue(MapHandle::new("Farm"));
        queue.enqueue(MapHandle::new("Town"));
        queue.enqueue(MapHandle::new("Beach"));

        assert_eq!(queue.try_dequeue().unwrap().handle.name(), "Farm");
        assert_eq!(queue.try_dequeue().unwrap().handle.name(), "Town");
        assert_eq!(queue.try_dequeue().unwrap().handle.name(), "Beach");
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_empty_dequeue_is_none() {
        let queue = RenderQueue::new();
        assert!(queue.is_empty());
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let queue = RenderQueue::new();
        queue.enqueue(MapHandle::new("Farm"));
        queue.enqueue(MapHandle::new("Farm"));

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_clones_share_the_queue() {
        let queue = RenderQueue::new();
        let submitter = queue.clone();

        submitter.enqueue(MapHandle::new("Farm"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_dequeue().unwrap().handle.name(), "Farm");
        assert!(submitter.is_empty());
    }

    #[test]
    fn test_concurrent_enqueue_while_draining() {
        let queue = RenderQueue::new();
        let threads: Vec<_> = (0..4)
            .map(|t| {
                let q = queue.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        q.enqueue(MapHandle::new(format!("map-{}-{}", t, i)));
                    }
                })
            })
            .collect();

        // Drain concurrently with the submitters.
        let mut drained = 0;
        while drained < 100 {
            if queue.try_dequeue().is_some() {
                drained += 1;
            }
        }

        for t in threads {
            t.join().unwrap();
        }
        assert!(queue.is_empty());
    }
}
