//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::LineItemId;
use super::price::Price;

/// A product as offered to the cart, before it has a quantity.
///
/// This is what presentation code passes to `add_to_cart`. The descriptive
/// fields are carried verbatim; the cart never validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: LineItemId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl NewLineItem {
    /// Create a new line item offer.
    #[must_use]
    pub fn new(
        id: impl Into<LineItemId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: impl Into<Price>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price: price.into(),
        }
    }

    /// Attach a quantity, producing a cart line.
    #[must_use]
    pub fn with_quantity(self, quantity: i64) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

/// One product entry in the cart.
///
/// Field order matches the durable snapshot layout
/// (`id`, `title`, `image_url`, `price`, `quantity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
    /// Number of units. Not clamped: decrementing past zero goes negative.
    pub quantity: i64,
}

impl LineItem {
    /// Overwrite the descriptive fields from `item` and add one unit.
    pub(crate) fn merge(&mut self, item: NewLineItem) {
        self.title = item.title;
        self.image_url = item.image_url;
        self.price = item.price;
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Total price of this line (`price * quantity`), or `None` if the
    /// price or the product does not fit a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<rust_decimal::Decimal> {
        self.price.times(self.quantity)
    }
}
