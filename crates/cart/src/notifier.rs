//! Same-context listener fan-out.
//!
//! One of the two delivery lanes behind [`CartStore::subscribe`]: listeners
//! in the writing context are invoked synchronously with the exact snapshot
//! just written, with no roundtrip through persistence. The cross-context
//! lane lives in [`crate::bus`].
//!
//! [`CartStore::subscribe`]: crate::store::CartStore::subscribe

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use kbmv_core::CartSnapshot;

/// Callback invoked with the latest snapshot whenever the cart changes.
pub type Listener = Arc<dyn Fn(&CartSnapshot) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Registry of cart-change listeners for one context.
///
/// Delivery is synchronous; ordering across listeners is unspecified. The
/// registry is snapshotted before iterating, so a listener registered or
/// deregistered from inside another listener's callback neither crashes the
/// delivery nor skips unrelated listeners.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    table: Arc<Mutex<ListenerTable>>,
}

impl ChangeNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it fires on every subsequent change until the
    /// returned [`Subscription`] is dropped.
    pub fn subscribe(
        &self,
        listener: impl Fn(&CartSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let mut table = self.lock();
        let id = table.next_id;
        table.next_id += 1;
        table.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Deliver `snapshot` to every listener registered at this moment.
    pub(crate) fn emit(&self, snapshot: &CartSnapshot) {
        let listeners: Vec<Listener> = self
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListenerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.lock().entries.len())
            .finish()
    }
}

/// Handle that keeps a listener registered.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// deregisters the listener; hold it for as long as updates are wanted.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    /// Explicitly deregister the listener.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entries.retain(|(id, _)| *id != self.id);
        }
    }
}
