//! Cart snapshot and line item types.
//!
//! A [`CartState`] is immutable. [`CartStore`] mutations build the next
//! snapshot in one step (items, coupon and totals together) and swap it in,
//! so a reader holding an `Arc<CartState>` never sees a half-applied change.

use crate::cart::CartTotals;
use crate::catalog::Product;
use crate::coupon::AppliedCouponResult;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Cart store shared between the storefront and the checkout orchestrator.
pub type SharedCart = Arc<Mutex<CartStore>>;

/// One product entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    /// Product id; unique within a cart.
    pub id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Image reference.
    pub image: String,
    /// Product URL slug.
    pub slug: String,
    /// Quantity, at least 1 while the item is in the cart.
    pub quantity: i64,
}

impl LineItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

impl From<&Product> for LineItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            slug: product.slug.clone(),
            quantity: 1,
        }
    }
}

impl From<Product> for LineItem {
    fn from(product: Product) -> Self {
        LineItem::from(&product)
    }
}

/// Immutable cart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartState {
    currency: Currency,
    items: Vec<LineItem>,
    applied_coupon: Option<AppliedCouponResult>,
    totals: CartTotals,
    /// Bumped on every mutation.
    revision: u64,
}

impl CartState {
    /// An empty cart.
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
            applied_coupon: None,
            totals: CartTotals::zero(currency),
            revision: 0,
        }
    }

    /// Build the successor snapshot.
    ///
    /// A coupon never survives an empty cart.
    fn next(&self, items: Vec<LineItem>, applied_coupon: Option<AppliedCouponResult>) -> Self {
        let applied_coupon = if items.is_empty() { None } else { applied_coupon };
        let totals = CartTotals::compute(&items, applied_coupon.as_ref(), self.currency);
        Self {
            currency: self.currency,
            items,
            applied_coupon,
            totals,
            revision: self.revision.wrapping_add(1),
        }
    }

    fn with_item_added(&self, item: LineItem) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => items.push(LineItem { quantity: 1, ..item }),
        }
        self.next(items, self.applied_coupon.clone())
    }

    fn with_item_removed(&self, id: &ProductId) -> Self {
        let items = self.items.iter().filter(|i| &i.id != id).cloned().collect();
        self.next(items, self.applied_coupon.clone())
    }

    fn with_quantity(&self, id: &ProductId, quantity: i64) -> Self {
        let quantity = quantity.max(0);
        if quantity == 0 {
            return self.with_item_removed(id);
        }
        let items = self
            .items
            .iter()
            .map(|i| {
                if &i.id == id {
                    LineItem { quantity, ..i.clone() }
                } else {
                    i.clone()
                }
            })
            .collect();
        self.next(items, self.applied_coupon.clone())
    }

    fn with_coupon(&self, applied_coupon: Option<AppliedCouponResult>) -> Self {
        self.next(self.items.clone(), applied_coupon)
    }

    fn cleared(&self) -> Self {
        self.next(Vec::new(), None)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get_item(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Result of the last coupon evaluation, failed ones included.
    pub fn applied_coupon(&self) -> Option<&AppliedCouponResult> {
        self.applied_coupon.as_ref()
    }

    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    pub fn subtotal(&self) -> Money {
        self.totals.subtotal
    }

    pub fn item_count(&self) -> i64 {
        self.totals.item_count
    }

    pub fn discount_amount(&self) -> Money {
        self.totals.discount
    }

    pub fn final_total(&self) -> Money {
        self.totals.final_total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when a successful coupon was evaluated against a different
    /// subtotal than the current one.
    pub fn needs_coupon_revalidation(&self) -> bool {
        match &self.applied_coupon {
            Some(result) if result.is_success() => {
                result.evaluated_subtotal() != Some(self.totals.subtotal)
            }
            _ => false,
        }
    }
}

/// Holds the current cart snapshot.
#[derive(Debug, Clone)]
pub struct CartStore {
    state: Arc<CartState>,
}

impl CartStore {
    /// Create an empty store.
    pub fn new(currency: Currency) -> Self {
        Self {
            state: Arc::new(CartState::empty(currency)),
        }
    }

    /// Create an empty store behind a shared async mutex.
    pub fn shared(currency: Currency) -> SharedCart {
        Arc::new(Mutex::new(Self::new(currency)))
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<CartState> {
        Arc::clone(&self.state)
    }

    fn swap(&mut self, next: CartState) -> Arc<CartState> {
        self.state = Arc::new(next);
        debug!(
            revision = self.state.revision(),
            items = self.state.items().len(),
            subtotal = self.state.subtotal().amount,
            final_total = self.state.final_total().amount,
            "cart updated"
        );
        self.state()
    }

    /// Add one unit of a product; an existing line is incremented.
    pub fn add_item(&mut self, item: impl Into<LineItem>) -> Arc<CartState> {
        let next = self.state.with_item_added(item.into());
        self.swap(next)
    }

    /// Remove a line. Absent ids are a no-op.
    pub fn remove_item(&mut self, id: &ProductId) -> Arc<CartState> {
        let next = self.state.with_item_removed(id);
        self.swap(next)
    }

    /// Set a line's quantity, clamped at zero; zero removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Arc<CartState> {
        let next = self.state.with_quantity(id, quantity);
        self.swap(next)
    }

    /// Store the outcome of a coupon evaluation.
    pub fn apply_coupon_result(&mut self, result: AppliedCouponResult) -> Arc<CartState> {
        let next = self.state.with_coupon(Some(result));
        self.swap(next)
    }

    /// Drop any applied coupon result.
    pub fn remove_coupon(&mut self) -> Arc<CartState> {
        let next = self.state.with_coupon(None);
        self.swap(next)
    }

    /// Reset to an empty cart.
    pub fn clear(&mut self) -> Arc<CartState> {
        let next = self.state.cleared();
        self.swap(next)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Currency::INR)
    }
}
