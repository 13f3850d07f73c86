//! Product catalog module.
//!
//! Reference data the cart adds from. The storefront ships a fixed list
//! (oils, coffee, teas), loaded from configuration.

mod product;

pub use product::{Product, ProductCatalog, ProductCategory};
