//! Go Marketplace Core - Shared cart types.
//!
//! This crate provides the types used by the cart store and its consumers:
//! - `gomarketplace-cart` - Write-through cart store with durable snapshots
//! - presentation layers that read the cart and call its mutations
//!
//! # Architecture
//!
//! The core crate contains only types and the cart's merge rules - no I/O,
//! no storage backends, no async runtime. This keeps it lightweight and
//! allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Line items, prices, the cart collection and its summary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
