//! Integration tests for the KBMV cart core.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kbmv-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - persistence, lenient reads, and cross-context delivery
//! - `checkout_flow` - end-to-end shop-then-checkout behavior
//!
//! The helpers below mirror the demo catalog the shop UI renders, so tests
//! exercise the store with the same shapes production data has.

use kbmv_core::Product;
use rust_decimal::Decimal;

/// The demo catalog: four products, prices in kroner.
#[must_use]
pub fn demo_catalog() -> Vec<Product> {
    vec![
        Product::new("kbmv-01", "Fjordglass Karaffel", Decimal::from(890)),
        Product::new("kbmv-02", "Signert Seilduk", Decimal::from(1450)),
        Product::new("kbmv-03", "Kystlinje Notatbok", Decimal::from(320)),
        Product::new("kbmv-04", "Salt & Vin Duftlys", Decimal::from(410)),
    ]
}

/// Look up a demo product by id.
///
/// # Panics
///
/// Panics if `id` is not part of the demo catalog; tests are expected to ask
/// for products that exist.
#[must_use]
pub fn demo_product(id: &str) -> Product {
    demo_catalog()
        .into_iter()
        .find(|product| product.id.as_str() == id)
        .unwrap_or_else(|| panic!("no demo product with id {id}"))
}
