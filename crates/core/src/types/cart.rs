//! Cart line items and snapshots.
//!
//! A [`CartSnapshot`] is the full ordered cart at one instant. The mutation
//! helpers are pure read-modify-write steps: each consumes a caller-supplied
//! snapshot and returns its successor, leaving persistence and change
//! notification to the store layer. Callers should mutate the freshest
//! snapshot they have read; the helpers never re-read state themselves.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::product::Product;

/// One distinct purchasable entry in the cart.
///
/// There is at most one line item per product id in a snapshot; repeated adds
/// increment `quantity` instead of appending duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    /// Stable identifier of the underlying product.
    pub id: ProductId,
    /// Display name at the time the item was added; never re-synced.
    pub title: String,
    /// Unit price snapshot at the time the item was added, in kroner.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Number of units, always at least 1. An item that would reach 0 is
    /// removed from the snapshot instead of being stored at 0.
    #[serde(deserialize_with = "positive_quantity")]
    pub quantity: u32,
}

impl LineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Reject persisted quantities below 1; the containing payload is then
/// treated as corrupt by the lenient read path.
fn positive_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = u32::deserialize(deserializer)?;
    if quantity == 0 {
        return Err(serde::de::Error::custom("quantity must be at least 1"));
    }
    Ok(quantity)
}

/// The full ordered cart at one instant.
///
/// Serializes as a bare JSON array of line items. Insertion order is
/// preserved when items are added, stable under quantity edits, and only
/// changes through removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<LineItem>,
}

impl CartSnapshot {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items (the navbar badge number).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Sum of line totals, in kroner.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Add one unit of `product`.
    ///
    /// If a line item with the product's id already exists its quantity grows
    /// by 1 and every other field keeps its value and position; otherwise a
    /// new line item with quantity 1 is appended at the end.
    #[must_use]
    pub fn add_or_increment(mut self, product: &Product) -> Self {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return self;
        }
        self.items.push(LineItem {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            quantity: 1,
        });
        self
    }

    /// Add `delta` to the quantity of the line item with `id`.
    ///
    /// A result below 1 removes the item entirely; quantities are never
    /// stored below 1. Items with other ids are untouched and keep their
    /// positions. A missing id leaves the snapshot unchanged.
    #[must_use]
    pub fn adjust_quantity(mut self, id: &ProductId, delta: i32) -> Self {
        self.items.retain_mut(|item| {
            if item.id != *id {
                return true;
            }
            let next = i64::from(item.quantity).saturating_add(i64::from(delta));
            if next < 1 {
                return false;
            }
            item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
            true
        });
        self
    }

    /// Remove the line item with `id`, if present. All other items keep
    /// their relative order.
    #[must_use]
    pub fn remove(mut self, id: &ProductId) -> Self {
        self.items.retain(|item| item.id != *id);
        self
    }

    /// Empty the cart (used after a successful checkout).
    #[must_use]
    pub fn clear(mut self) -> Self {
        self.items.clear();
        self
    }
}

impl From<Vec<LineItem>> for CartSnapshot {
    fn from(items: Vec<LineItem>) -> Self {
        Self { items }
    }
}
