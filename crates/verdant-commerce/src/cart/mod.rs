//! Shopping cart module.
//!
//! Contains line items, the immutable cart snapshot and the store that swaps
//! snapshots on every mutation.

mod cart;
mod pricing;

pub use cart::{CartState, CartStore, LineItem, SharedCart};
pub use pricing::CartTotals;
