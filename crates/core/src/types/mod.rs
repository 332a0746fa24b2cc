//! Core types for Go Marketplace.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart;
pub mod id;
pub mod line_item;
pub mod price;

pub use cart::{Cart, CartError, CartSummary};
pub use id::LineItemId;
pub use line_item::{LineItem, NewLineItem};
pub use price::Price;
