//! Catalog product handed to the cart by the shop UI.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A purchasable catalog entry, as seen by the cart.
///
/// The cart snapshots `title` and `price` at the moment an item is added;
/// later catalog edits do not flow back into existing line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable catalog identifier (e.g. `kbmv-01`).
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Unit price in kroner.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Product {
    /// Create a new product.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
        }
    }
}
