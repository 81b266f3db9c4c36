//! Keys Module
//!
//! Structured configuration addresses and their mapping onto the flat
//! key space of the store.

mod address;
mod codec;

pub use address::{ConfigAddress, NamedConfigAddress};
pub use codec::{prefix_range_end, KeyCodec, KEY_SEPARATOR};
