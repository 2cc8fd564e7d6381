//! Cross-context change hints.
//!
//! The second delivery lane: when one context writes the slot, every *other*
//! context sharing it must find out. The platform's native storage-change
//! signal is never delivered back to the writing context, and its payload is
//! not to be trusted, so the bus carries a payload-free hint and recipients
//! re-read the slot themselves. The writing context relies on the
//! synchronous local lane in [`crate::notifier`] instead.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A context attached to the bus.
pub(crate) trait StorageEventSink: Send + Sync {
    /// A sibling context rewrote the slot: re-read and redeliver locally.
    fn storage_event(&self);
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    sinks: Vec<(u64, Weak<dyn StorageEventSink>)>,
}

/// In-process carrier of the cross-context storage-change hint.
///
/// Contexts sharing one slot share one bus; clones refer to the same bus.
/// Attachment is by weak reference, so a dropped context simply falls off
/// the bus on the next broadcast.
#[derive(Clone, Default)]
pub struct StorageEventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl StorageEventBus {
    /// Create a bus with no attached contexts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a context; returns the id used to exclude it from its own
    /// broadcasts.
    pub(crate) fn attach(&self, sink: Weak<dyn StorageEventSink>) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.sinks.push((id, sink));
        id
    }

    /// Deliver the change hint to every attached context except `origin`.
    pub(crate) fn broadcast_from(&self, origin: u64) {
        let recipients: Vec<Arc<dyn StorageEventSink>> = {
            let mut inner = self.lock();
            inner.sinks.retain(|(_, sink)| sink.strong_count() > 0);
            inner
                .sinks
                .iter()
                .filter(|(id, _)| *id != origin)
                .filter_map(|(_, sink)| sink.upgrade())
                .collect()
        };
        for sink in recipients {
            sink.storage_event();
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StorageEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEventBus")
            .field("contexts", &self.lock().sinks.len())
            .finish()
    }
}
