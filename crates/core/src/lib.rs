//! KBMV Core - Shared types library.
//!
//! This crate provides the common types used across the KBMV storefront
//! components:
//! - `cart` - Cart state and cross-view synchronization
//! - UI consumers (shop panel, navbar badge) that render cart state
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! persistence, no platform access. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, line items, cart snapshots, and NOK
//!   price formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
