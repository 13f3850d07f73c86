//! Pricing core for the Verdant wellness storefront.
//!
//! - **Cart**: immutable snapshots, one per mutation, with derived totals
//! - **Coupon**: eligibility rules and discount computation
//! - **Checkout**: payment state machine, provider dispatch, settlement
//! - **Orders**: confirmed orders behind an admin capability check
//!
//! # Example
//!
//! ```rust,ignore
//! use verdant_commerce::prelude::*;
//!
//! let cart = CartStore::shared(Currency::INR);
//! cart.lock().await.add_item(&product);
//!
//! let desk = CouponDesk::new(cart.clone(), Arc::new(evaluator));
//! desk.apply("WELCOME100").await?;
//!
//! let checkout = CheckoutOrchestrator::new(cart, pending, confirmation);
//! let outcome = checkout.pay(&customer).await?;
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod orders;

pub use error::{CheckoutError, CommerceError, PaymentError};
pub use ids::*;
pub use money::{Currency, Money, Rounding};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{CheckoutConfig, CouponConfig, PricingConfig};
    pub use crate::error::{CheckoutError, CommerceError, PaymentError};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money, Rounding};

    // Catalog
    pub use crate::catalog::{Product, ProductCatalog, ProductCategory};

    // Cart
    pub use crate::cart::{CartState, CartStore, CartTotals, LineItem, SharedCart};

    // Coupon
    pub use crate::coupon::{
        AppliedCouponResult, Clock, Coupon, CouponCatalog, CouponDesk, CouponEvaluator,
        CouponKind, StaticCouponCatalog, SystemClock,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutOrchestrator, CheckoutOrder, CheckoutOutcome, CheckoutPhase, CheckoutQuote,
        CustomerField, CustomerInfo, FieldErrors, MemoryPendingOrders, OrderConfirmation,
        PaymentGateway, PaymentProvider, PaymentRequest, PendingOrderStore, ProviderRefs,
        RedirectReturn, UpiCollect, UpiIntent, UpiStatus, WalletRedirect,
    };

    // Orders
    pub use crate::orders::{AdminCapability, Anonymous, OrderBook};
}
