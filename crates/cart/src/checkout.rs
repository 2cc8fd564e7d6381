//! Order placement.
//!
//! Checkout collects opaque customer details, issues a receipt, and clears
//! the cart through the store so every open view resets at once. Nothing is
//! persisted server-side; the receipt is the whole outcome of a placed
//! order.

use chrono::{DateTime, Utc};
use kbmv_core::{CartSnapshot, format_nok};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::store::CartStore;

/// Customer details collected by the checkout form.
///
/// Opaque to the cart core: the fields pass through to the receipt
/// unvalidated and uninterpreted.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    /// Customer name as entered.
    pub name: String,
    /// Customer email as entered.
    pub email: String,
}

impl CheckoutDetails {
    /// Create checkout details.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Confirmation issued for a placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    /// Order reference.
    pub order_id: Uuid,
    /// Customer name as entered at checkout.
    pub customer_name: String,
    /// Customer email as entered at checkout.
    pub customer_email: String,
    /// Units across the ordered line items.
    pub item_count: u32,
    /// Order total in kroner.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

impl Receipt {
    /// Confirmation line shown to the customer, e.g.
    /// `Takk Kari! Kvittering på 1 780 kr sendt til kari@example.no.`
    #[must_use]
    pub fn confirmation(&self) -> String {
        format!(
            "Takk {}! Kvittering på {} sendt til {}.",
            self.customer_name,
            format_nok(self.total),
            self.customer_email
        )
    }
}

impl CartStore {
    /// Place an order for `snapshot` with the customer's `details`.
    ///
    /// An empty cart places nothing and returns `None`. Otherwise the cart
    /// is cleared through [`CartStore::write`] — notifying this context and
    /// every sibling — and a receipt for the ordered items is returned. As
    /// with the other mutations, pass the snapshot read immediately before
    /// checkout.
    pub fn place_order(
        &self,
        snapshot: CartSnapshot,
        details: &CheckoutDetails,
    ) -> Option<Receipt> {
        if snapshot.is_empty() {
            return None;
        }

        let receipt = Receipt {
            order_id: Uuid::new_v4(),
            customer_name: details.name.clone(),
            customer_email: details.email.clone(),
            item_count: snapshot.item_count(),
            total: snapshot.subtotal(),
            placed_at: Utc::now(),
        };
        info!(
            order_id = %receipt.order_id,
            units = receipt.item_count,
            "order placed"
        );

        self.write(snapshot.clear());
        Some(receipt)
    }
}
