//! The cart collection and its merge rules.
//!
//! [`Cart`] is an ordered list of [`LineItem`]s keyed by [`LineItemId`]. Order
//! is insertion order; it carries no meaning except that it keeps serialized
//! snapshots reproducible. Every constructor and mutation keeps ids unique.
//!
//! | Operation   | Existing id                              | Unknown id       |
//! |-------------|------------------------------------------|------------------|
//! | `add`       | quantity + 1, metadata overwritten       | appended, qty 1  |
//! | `increment` | quantity + 1                             | no-op            |
//! | `decrement` | quantity - 1 (no floor)                  | no-op            |
//! | `remove`    | entry removed                            | no-op            |

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::id::LineItemId;
use super::line_item::{LineItem, NewLineItem};

/// Errors that can occur when building a [`Cart`] from existing lines.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Two lines share the same id.
    #[error("duplicate line item id: {0}")]
    DuplicateId(LineItemId),
}

/// Ordered collection of cart lines with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

/// Values derived from a cart, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of all quantities.
    pub item_count: i64,
    /// Sum of `price * quantity` over all lines. `None` if any line total,
    /// or the sum, does not fit a `Decimal`.
    pub subtotal: Option<Decimal>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing lines, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateId`] if two lines share an id.
    pub fn from_lines(items: Vec<LineItem>) -> Result<Self, CartError> {
        let duplicate = {
            let mut seen = HashSet::with_capacity(items.len());
            items
                .iter()
                .find(|item| !seen.insert(item.id.as_str()))
                .map(|item| item.id.clone())
        };
        match duplicate {
            Some(id) => Err(CartError::DuplicateId(id)),
            None => Ok(Self { items }),
        }
    }

    /// Add one unit of `item`.
    ///
    /// If a line with the same id exists its quantity goes up by one and its
    /// descriptive fields are replaced by `item`'s. Otherwise `item` is
    /// appended with quantity 1. Returns the line's new quantity.
    pub fn add(&mut self, item: NewLineItem) -> i64 {
        if let Some(line) = self.get_mut(item.id.as_str()) {
            line.merge(item);
            return line.quantity;
        }
        self.items.push(item.with_quantity(1));
        1
    }

    /// Add one unit to the line with `id`. Returns `false` if there is none.
    pub fn increment(&mut self, id: &str) -> bool {
        self.get_mut(id).is_some_and(|line| {
            line.quantity = line.quantity.saturating_add(1);
            true
        })
    }

    /// Take one unit from the line with `id`. Returns `false` if there is none.
    ///
    /// Quantity is not clamped at zero.
    pub fn decrement(&mut self, id: &str) -> bool {
        self.get_mut(id).is_some_and(|line| {
            line.quantity = line.quantity.saturating_sub(1);
            true
        })
    }

    /// Remove the line with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Get the line with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id == id)
    }

    /// Whether a line with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Compute the cart's derived values.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.items.iter().fold(
            CartSummary {
                line_count: self.items.len(),
                item_count: 0,
                subtotal: Some(Decimal::ZERO),
            },
            |mut summary, line| {
                summary.item_count = summary.item_count.saturating_add(line.quantity);
                summary.subtotal = summary
                    .subtotal
                    .zip(line.line_total())
                    .and_then(|(sum, total)| sum.checked_add(total));
                summary
            },
        )
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|line| line.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| line.id == id)
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_lines(items)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
