//! Coupon module.
//!
//! Coupon reference data, the evaluator that decides eligibility, and the
//! desk that feeds evaluation results into a shared cart.

mod catalog;
mod clock;
mod coupon;
mod desk;
mod evaluator;

pub use catalog::{CouponCatalog, StaticCouponCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use coupon::{AppliedCouponResult, Coupon, CouponKind};
pub use desk::CouponDesk;
pub use evaluator::{evaluate, messages, CouponEvaluator};
