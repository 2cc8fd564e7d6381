//! KBMV Cart - durable cart state and cross-view synchronization.
//!
//! The cart core has two halves:
//!
//! - the **durable store** ([`CartStore`]): the canonical ordered list of
//!   line items, persisted to a single keyed slot that survives restarts.
//!   Reads are lenient — a missing or corrupt payload degrades to an empty
//!   cart, never an error — and writes replace the slot wholesale.
//! - the **change notifier**: a synchronous same-context listener fan-out
//!   plus a payload-free cross-context hint ([`StorageEventBus`]) for
//!   sibling contexts sharing the slot, which re-read rather than trust a
//!   payload. Both lanes sit behind one [`CartStore::subscribe`].
//!
//! Consumers read a snapshot on mount, subscribe for updates, and write
//! mutated snapshots back through the store. The mutation helpers live on
//! [`kbmv_core::CartSnapshot`] and are pure; call them on a freshly read
//! snapshot, since concurrent contexts are last-write-wins with no merge.
//!
//! # Modules
//!
//! - [`store`] - the [`CartStore`] handle
//! - [`slot`] - storage-slot capability trait and its file-backed,
//!   in-memory, and detached implementations
//! - [`notifier`] - same-context listener registry
//! - [`bus`] - cross-context storage-event hints
//! - [`checkout`] - order placement and receipts
//! - [`config`] - environment-driven store configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bus;
pub mod checkout;
pub mod config;
pub mod notifier;
pub mod slot;
pub mod store;

pub use bus::StorageEventBus;
pub use checkout::{CheckoutDetails, Receipt};
pub use config::{CART_SLOT_KEY, StoreConfig};
pub use notifier::Subscription;
pub use slot::{DetachedSlot, FileSlot, MemorySlot, SlotError, StorageSlot};
pub use store::CartStore;
