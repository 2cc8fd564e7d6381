//! Durable cart store.
//!
//! Single source of truth for the cart of one context. `read` hydrates the
//! latest persisted snapshot (leniently: corruption degrades to an empty
//! cart, never an error), `write` replaces it wholesale and then notifies
//! both delivery lanes. Mutations are pure helpers on
//! [`CartSnapshot`]; call them on a freshly read snapshot and write the
//! result back:
//!
//! ```rust
//! use kbmv_cart::{CartStore, MemorySlot, StorageEventBus};
//! use kbmv_core::Product;
//! use rust_decimal::Decimal;
//!
//! let bus = StorageEventBus::new();
//! let store = CartStore::attach(MemorySlot::new(), &bus);
//!
//! let karaffel = Product::new("kbmv-01", "Fjordglass Karaffel", Decimal::from(890));
//! store.write(store.read().add_or_increment(&karaffel));
//! assert_eq!(store.read().item_count(), 1);
//! ```

use std::sync::{Arc, Weak};

use kbmv_core::CartSnapshot;
use tracing::{debug, info, warn};

use crate::bus::{StorageEventBus, StorageEventSink};
use crate::config::{CART_SLOT_KEY, StoreConfig};
use crate::notifier::{ChangeNotifier, Subscription};
use crate::slot::{DetachedSlot, FileSlot, StorageSlot};

/// Handle to the canonical cart state of one context.
///
/// Cheaply cloneable; clones share the same context (same slot, same
/// listeners, same position on the event bus). Independent contexts over a
/// shared slot — the separate-tabs scenario — are created by calling
/// [`CartStore::attach`] once per context with the same slot and bus.
///
/// No public operation on the store fails: storage trouble degrades to an
/// empty read or an unpersisted (but still notified) write, keeping the UI
/// responsive over a non-critical, easily-reconstructed cache.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<StoreInner>,
    bus: StorageEventBus,
    bus_id: u64,
}

struct StoreInner {
    slot: Box<dyn StorageSlot>,
    notifier: ChangeNotifier,
}

impl CartStore {
    /// Open a store for this environment.
    ///
    /// With a state directory configured the cart is file-backed and
    /// survives restarts. Without one, or when the directory cannot be
    /// created, the store runs detached: reads are empty, writes are
    /// dropped, notifications still fire.
    #[must_use]
    pub fn open(config: &StoreConfig) -> Self {
        let slot: Box<dyn StorageSlot> = match &config.state_dir {
            Some(dir) => match FileSlot::open(dir, CART_SLOT_KEY) {
                Ok(slot) => {
                    info!(dir = %dir.display(), "opened durable cart slot");
                    Box::new(slot)
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cart state dir unusable, running detached");
                    Box::new(DetachedSlot)
                }
            },
            None => {
                debug!("no cart state dir configured, running detached");
                Box::new(DetachedSlot)
            }
        };
        Self::attach_boxed(slot, &StorageEventBus::new())
    }

    /// Attach one context to an explicit slot and event bus.
    ///
    /// This is the injected-dependency form: tests substitute a
    /// [`MemorySlot`](crate::slot::MemorySlot), and multiple contexts
    /// attached to the same slot and bus observe each other's writes.
    #[must_use]
    pub fn attach(slot: impl StorageSlot + 'static, bus: &StorageEventBus) -> Self {
        Self::attach_boxed(Box::new(slot), bus)
    }

    fn attach_boxed(slot: Box<dyn StorageSlot>, bus: &StorageEventBus) -> Self {
        let inner = Arc::new(StoreInner {
            slot,
            notifier: ChangeNotifier::new(),
        });
        let sink_arc: Arc<dyn StorageEventSink> = inner.clone();
        let sink: Weak<dyn StorageEventSink> = Arc::downgrade(&sink_arc);
        let bus_id = bus.attach(sink);
        Self {
            inner,
            bus: bus.clone(),
            bus_id,
        }
    }

    /// The current persisted snapshot.
    ///
    /// A missing slot value reads as the empty cart. So does a value that
    /// fails to parse: the corrupt payload is logged, treated as empty, and
    /// left in place until the next successful write replaces it. A UI must
    /// never hard-fail because of storage corruption.
    #[must_use]
    pub fn read(&self) -> CartSnapshot {
        self.inner.read()
    }

    /// Persist `snapshot` wholesale, then notify.
    ///
    /// Same-context listeners fire synchronously with the exact snapshot
    /// written — no re-read, so there is no read-after-write race within one
    /// context. Sibling contexts on the bus receive a payload-free hint and
    /// re-read the slot themselves. A failed persist is logged and the
    /// notifications still fire with the attempted snapshot.
    pub fn write(&self, snapshot: CartSnapshot) {
        match serde_json::to_string(&snapshot) {
            Ok(payload) => {
                if let Err(e) = self.inner.slot.store(&payload) {
                    warn!(error = %e, "cart write not persisted");
                }
            }
            Err(e) => warn!(error = %e, "cart snapshot failed to serialize"),
        }
        debug!(
            items = snapshot.len(),
            units = snapshot.item_count(),
            "cart written"
        );
        self.inner.notifier.emit(&snapshot);
        self.bus.broadcast_from(self.bus_id);
    }

    /// Register a cart-change listener.
    ///
    /// Fires for writes in this context and for changes observed from
    /// sibling contexts; callers need not distinguish the origin. Dropping
    /// the returned [`Subscription`] deregisters the listener.
    pub fn subscribe(
        &self,
        listener: impl Fn(&CartSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.notifier.subscribe(listener)
    }

    /// Re-read the slot and redeliver to this context's listeners.
    ///
    /// The external-signal adapter entry point: an embedder translating a
    /// platform change notification (a file watcher, a focus event) calls
    /// this rather than trusting the notification's payload.
    pub fn refresh(&self) {
        self.inner.storage_event();
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("bus_id", &self.bus_id)
            .field("notifier", &self.inner.notifier)
            .finish_non_exhaustive()
    }
}

impl StoreInner {
    fn read(&self) -> CartSnapshot {
        let raw = match self.slot.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return CartSnapshot::empty(),
            Err(e) => {
                warn!(error = %e, "cart slot unreadable, treating as empty");
                return CartSnapshot::empty();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "corrupt cart payload, treating as empty");
            CartSnapshot::empty()
        })
    }
}

impl StorageEventSink for StoreInner {
    fn storage_event(&self) {
        let snapshot = self.read();
        debug!(items = snapshot.len(), "re-read cart after sibling write");
        self.notifier.emit(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;
    use kbmv_core::Product;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    fn product(id: &str, price: i64) -> Product {
        Product::new(id, id.to_uppercase(), Decimal::from(price))
    }

    fn memory_store() -> (CartStore, MemorySlot) {
        let slot = MemorySlot::new();
        let bus = StorageEventBus::new();
        (CartStore::attach(slot.clone(), &bus), slot)
    }

    fn recorded(snapshots: &Arc<Mutex<Vec<CartSnapshot>>>) -> Vec<CartSnapshot> {
        snapshots.lock().unwrap().clone()
    }

    fn recording_listener(
        snapshots: &Arc<Mutex<Vec<CartSnapshot>>>,
    ) -> impl Fn(&CartSnapshot) + Send + Sync + 'static {
        let snapshots = Arc::clone(snapshots);
        move |snapshot| snapshots.lock().unwrap().push(snapshot.clone())
    }

    #[test]
    fn test_write_then_read_roundtrips() {
        let (store, _slot) = memory_store();
        let snapshot = CartSnapshot::empty()
            .add_or_increment(&product("kbmv-01", 890))
            .add_or_increment(&product("kbmv-02", 1450));

        store.write(snapshot.clone());
        assert_eq!(store.read(), snapshot);
    }

    #[test]
    fn test_unwritten_slot_reads_empty() {
        let (store, _slot) = memory_store();
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_corrupt_payload_reads_empty_and_stays_put() {
        let (store, slot) = memory_store();
        slot.set_raw("not-json");

        assert!(store.read().is_empty());
        // Lenient read does not erase the corrupt value.
        assert_eq!(slot.load().unwrap().as_deref(), Some("not-json"));
    }

    #[test]
    fn test_corrupt_payload_heals_on_next_write() {
        let (store, slot) = memory_store();
        slot.set_raw("not-json");

        let snapshot = store.read().add_or_increment(&product("kbmv-01", 890));
        store.write(snapshot.clone());

        assert_eq!(store.read(), snapshot);
        assert_ne!(slot.load().unwrap().as_deref(), Some("not-json"));
    }

    #[test]
    fn test_foreign_shaped_payload_reads_empty() {
        let (store, slot) = memory_store();
        slot.set_raw(r#"{"version":2,"items":[]}"#);
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_write_notifies_once_synchronously_with_exact_snapshot() {
        let (store, _slot) = memory_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = store.subscribe(recording_listener(&seen));

        let snapshot = CartSnapshot::empty().add_or_increment(&product("kbmv-01", 100));
        store.write(snapshot.clone());

        // Synchronous delivery: already observable, exactly once, the exact
        // snapshot written.
        assert_eq!(recorded(&seen), vec![snapshot]);
    }

    #[test]
    fn test_writes_notify_in_issue_order() {
        let (store, _slot) = memory_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = store.subscribe(recording_listener(&seen));

        let first = CartSnapshot::empty().add_or_increment(&product("kbmv-01", 100));
        let second = first.clone().add_or_increment(&product("kbmv-02", 200));
        store.write(first.clone());
        store.write(second.clone());

        assert_eq!(recorded(&seen), vec![first, second]);
    }

    #[test]
    fn test_detached_store_reads_empty_but_still_notifies() {
        let store = CartStore::open(&StoreConfig::detached());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = store.subscribe(recording_listener(&seen));

        let snapshot = CartSnapshot::empty().add_or_increment(&product("kbmv-01", 890));
        store.write(snapshot.clone());

        assert!(store.read().is_empty());
        assert_eq!(recorded(&seen), vec![snapshot]);
    }

    #[test]
    fn test_sibling_context_gets_reread_snapshot_not_payload() {
        let slot = MemorySlot::new();
        let bus = StorageEventBus::new();
        let tab_a = CartStore::attach(slot.clone(), &bus);
        let tab_b = CartStore::attach(slot.clone(), &bus);

        let a_seen = Arc::new(Mutex::new(Vec::new()));
        let b_seen = Arc::new(Mutex::new(Vec::new()));
        let _a_sub = tab_a.subscribe(recording_listener(&a_seen));
        let _b_sub = tab_b.subscribe(recording_listener(&b_seen));

        let snapshot = CartSnapshot::empty().add_or_increment(&product("kbmv-01", 890));
        tab_a.write(snapshot.clone());

        // The writer hears its own synchronous delivery only; the sibling
        // hears the hint-triggered re-read.
        assert_eq!(recorded(&a_seen), vec![snapshot.clone()]);
        assert_eq!(recorded(&b_seen), vec![snapshot]);
    }

    #[test]
    fn test_refresh_redelivers_current_state() {
        let (store, slot) = memory_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = store.subscribe(recording_listener(&seen));

        // Out-of-band change the store never wrote.
        let snapshot = CartSnapshot::empty().add_or_increment(&product("kbmv-03", 320));
        slot.set_raw(serde_json::to_string(&snapshot).unwrap());

        store.refresh();
        assert_eq!(recorded(&seen), vec![snapshot]);
    }

    #[test]
    fn test_clones_share_one_context() {
        let (store, _slot) = memory_store();
        let clone = store.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = store.subscribe(recording_listener(&seen));

        // A clone's write is a same-context write: one synchronous delivery,
        // no hint-triggered duplicate.
        clone.write(CartSnapshot::empty().add_or_increment(&product("kbmv-01", 890)));
        assert_eq!(recorded(&seen).len(), 1);
    }
}
