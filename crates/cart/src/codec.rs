//! Durable snapshot encoding.
//!
//! The snapshot is a JSON array of line items in cart order:
//!
//! ```json
//! [{"id":"1","title":"Sneakers","image_url":"https://...","price":200,"quantity":2}]
//! ```
//!
//! Prices are written back exactly as they were read, including exponent
//! forms and digits beyond what a `Decimal` or `f64` holds.
//!
//! Decoding is strict: anything that is not an array of complete line items
//! with unique ids is rejected, and the store treats it as "no snapshot".

use gomarketplace_core::{Cart, LineItem};

use crate::error::CodecError;

/// Serialize the full cart.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, CodecError> {
    Ok(serde_json::to_string(cart)?)
}

/// Parse a snapshot previously produced by [`encode`].
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed input and [`CodecError::Cart`]
/// if two lines share an id.
pub fn decode(raw: &str) -> Result<Cart, CodecError> {
    let lines: Vec<LineItem> = serde_json::from_str(raw)?;
    Ok(Cart::from_lines(lines)?)
}
