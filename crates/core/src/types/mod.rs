//! Core types for the KBMV storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{CartSnapshot, LineItem};
pub use id::*;
pub use price::format_nok;
pub use product::Product;
