//! End-to-end storefront scenarios: cart, coupon desk, checkout and
//! settlement wired together with deterministic collaborators.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use verdant_commerce::prelude::*;
use verdant_commerce::coupon::FixedClock;

// -- collaborators ---------------------------------------------------------

/// Widget that replays a fixed list of outcomes, approving once exhausted.
#[derive(Default)]
struct ScriptedGateway {
    outcomes: Mutex<VecDeque<Result<ProviderRefs, PaymentError>>>,
    opened: AtomicU32,
}

impl ScriptedGateway {
    fn new(outcomes: Vec<Result<ProviderRefs, PaymentError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            opened: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn open(&self, _request: &PaymentRequest) -> Result<ProviderRefs, PaymentError> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ProviderRefs::new(format!("pay_{n}"))))
    }
}

/// Widget that stays open until released.
#[derive(Default)]
struct HeldGateway {
    release: Notify,
    requests: Mutex<Vec<PaymentRequest>>,
}

#[async_trait]
impl PaymentGateway for HeldGateway {
    async fn open(&self, request: &PaymentRequest) -> Result<ProviderRefs, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        self.release.notified().await;
        Ok(ProviderRefs::new("pay_held"))
    }
}

struct ScriptedUpi {
    statuses: Mutex<VecDeque<UpiStatus>>,
    checks: AtomicU32,
}

impl ScriptedUpi {
    fn new(statuses: Vec<UpiStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            checks: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl UpiCollect for ScriptedUpi {
    async fn start(&self, request: &PaymentRequest) -> Result<UpiIntent, PaymentError> {
        Ok(UpiIntent {
            reference: format!("upi-{}", request.order_id),
            intent_url: format!("upi://pay?pa=verdant@upi&am={}", request.amount.amount),
        })
    }

    async fn status(&self, _intent: &UpiIntent) -> Result<UpiStatus, PaymentError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(UpiStatus::Pending))
    }
}

struct FakeWallet;

#[async_trait]
impl WalletRedirect for FakeWallet {
    async fn begin(&self, request: &PaymentRequest) -> Result<String, PaymentError> {
        Ok(format!("https://wallet.example/pay/{}", request.order_id))
    }
}

// -- fixtures --------------------------------------------------------------

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn catalog() -> ProductCatalog {
    ProductCatalog::new(vec![
        Product::new("lavender-oil", "Lavender Essential Oil", "lavender-oil", Money::inr(899)),
        Product::new("filter-coffee", "Filter Coffee", "filter-coffee", Money::inr(450)),
        Product::new("tulsi-tea", "Tulsi Green Tea", "tulsi-tea", Money::inr(500)),
    ])
}

fn coupons() -> StaticCouponCatalog {
    let expires = NaiveDate::from_ymd_opt(2027, 3, 31).unwrap();
    StaticCouponCatalog::new(vec![
        Coupon::flat("WELCOME100", 100, expires).with_min_order_value(499),
        Coupon::flat("BIGBASKET", 150, expires).with_min_order_value(699),
        Coupon::percent("CHAI15", 15, expires),
    ])
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        email: "meera@example.in".to_string(),
        first_name: "Meera".to_string(),
        last_name: "Iyer".to_string(),
        phone: "9123456780".to_string(),
        address: "4 Residency Road".to_string(),
        city: "Chennai".to_string(),
        state: "Tamil Nadu".to_string(),
        pincode: "600001".to_string(),
    }
}

struct Store {
    cart: SharedCart,
    desk: CouponDesk,
    book: Arc<OrderBook>,
    pending: Arc<MemoryPendingOrders>,
}

impl Store {
    fn new() -> Self {
        let cart = CartStore::shared(Currency::INR);
        let evaluator = CouponEvaluator::new(Arc::new(coupons()))
            .with_clock(Arc::new(FixedClock::on(today())))
            .with_config(CouponConfig {
                latency_ms: 0,
                ..CouponConfig::default()
            });
        Self {
            desk: CouponDesk::new(cart.clone(), Arc::new(evaluator)),
            cart,
            book: Arc::new(OrderBook::new()),
            pending: Arc::new(MemoryPendingOrders::new()),
        }
    }

    async fn add(&self, slug: &str) -> Arc<CartState> {
        let catalog = catalog();
        let product = catalog.find(slug).unwrap();
        self.cart.lock().await.add_item(product)
    }

    async fn state(&self) -> Arc<CartState> {
        self.cart.lock().await.state()
    }

    fn checkout(&self) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(self.cart.clone(), self.pending.clone(), self.book.clone())
            .with_config(CheckoutConfig {
                upi_poll_interval_ms: 3_000,
                upi_max_polls: 3,
            })
    }

    fn redirect_return(&self) -> RedirectReturn {
        RedirectReturn::new(self.cart.clone(), self.pending.clone(), self.book.clone())
    }
}

struct Admin;

impl AdminCapability for Admin {
    fn is_authorized(&self) -> bool {
        true
    }
}

// -- scenarios -------------------------------------------------------------

#[tokio::test]
async fn test_cod_checkout_with_flat_coupon_totals_993() {
    let store = Store::new();
    let state = store.add("lavender-oil").await;
    assert_eq!(state.subtotal(), Money::inr(899));

    let state = store.desk.apply("WELCOME100").await.unwrap();
    assert_eq!(state.discount_amount(), Money::inr(100));
    assert_eq!(state.final_total(), Money::inr(799));

    let checkout = store.checkout();
    let quote = checkout.quote().await;
    assert_eq!(quote.tax, Money::inr(144));
    assert_eq!(quote.total, Money::inr(993));

    let outcome = checkout.pay(&customer()).await.unwrap();
    let order = outcome.order().unwrap();
    assert_eq!(order.total, Money::inr(993));
    assert_eq!(order.cod_charges, Some(Money::inr(50)));
    assert_eq!(order.coupon_code.as_deref(), Some("WELCOME100"));
    assert!(order.is_consistent());

    let state = store.state().await;
    assert!(state.is_empty());
    assert!(state.applied_coupon().is_none());

    let recorded = store.book.list(&Admin).await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(&recorded[0], order);
}

#[tokio::test]
async fn test_below_minimum_coupon_states_shortfall() {
    let store = Store::new();
    store.add("tulsi-tea").await;

    let state = store.desk.apply("BIGBASKET").await.unwrap();
    let applied = state.applied_coupon().unwrap();
    assert!(!applied.is_success());
    assert!(applied.message().contains("\u{20b9}199"), "{}", applied.message());
    assert!(state.discount_amount().is_zero());
    assert_eq!(state.final_total(), Money::inr(500));
}

#[tokio::test]
async fn test_same_coupon_twice_does_not_stack() {
    let store = Store::new();
    store.add("filter-coffee").await;
    store.add("filter-coffee").await;

    let first = store.desk.apply("CHAI15").await.unwrap();
    let second = store.desk.apply("chai15").await.unwrap();
    assert_eq!(first.discount_amount(), Money::inr(135));
    assert_eq!(second.discount_amount(), Money::inr(135));
    assert_eq!(second.final_total(), Money::inr(765));
}

#[tokio::test]
async fn test_removing_only_item_drops_coupon() {
    let store = Store::new();
    store.add("lavender-oil").await;
    store.desk.apply("WELCOME100").await.unwrap();

    let state = store
        .cart
        .lock()
        .await
        .remove_item(&ProductId::new("lavender-oil"));
    assert!(state.items().is_empty());
    assert!(state.applied_coupon().is_none());
    assert_eq!(state.final_total(), Money::inr(0));
}

#[tokio::test]
async fn test_checkout_refuses_coupon_priced_for_old_subtotal() {
    let store = Store::new();
    store.add("filter-coffee").await;
    store.add("tulsi-tea").await;
    let state = store.desk.apply("BIGBASKET").await.unwrap();
    assert_eq!(state.discount_amount(), Money::inr(150));

    let state = store
        .cart
        .lock()
        .await
        .remove_item(&ProductId::new("tulsi-tea"));
    assert!(state.needs_coupon_revalidation());

    let checkout = store.checkout();
    let err = checkout.pay(&customer()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::CouponNeedsRevalidation(ref code) if code == "BIGBASKET"));
    assert_eq!(checkout.phase(), CheckoutPhase::Idle);
    assert_eq!(store.state().await, state);
    assert!(store.book.is_empty().await);

    // ₹450 no longer meets the ₹699 minimum.
    let state = store.desk.revalidate().await.unwrap();
    assert!(!state.applied_coupon().unwrap().is_success());
    assert!(state.discount_amount().is_zero());

    let outcome = checkout.pay(&customer()).await.unwrap();
    let order = outcome.order().unwrap();
    assert_eq!(order.discount, Money::inr(0));
    assert_eq!(order.coupon_code, None);
    assert_eq!(order.total, Money::inr(450 + 81 + 50));
}

#[tokio::test]
async fn test_dismissed_widget_preserves_cart_and_allows_retry() {
    let store = Store::new();
    store.add("lavender-oil").await;
    store.desk.apply("WELCOME100").await.unwrap();
    let before = store.state().await;

    let gateway = Arc::new(ScriptedGateway::new(vec![Err(PaymentError::Dismissed)]));
    let checkout = store.checkout().with_gateway(gateway.clone());
    checkout.select_provider(PaymentProvider::GatewayCard).unwrap();

    let err = checkout.pay(&customer()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Payment(PaymentError::Dismissed)));
    assert!(err.is_retryable());
    assert_eq!(store.state().await, before);
    assert!(store.book.is_empty().await);
    assert!(matches!(checkout.phase(), CheckoutPhase::Failed { .. }));

    let outcome = checkout.pay(&customer()).await.unwrap();
    let order = outcome.order().unwrap();
    assert_eq!(order.total, Money::inr(943));
    assert!(order.cod_charges.is_none());
    assert_eq!(order.payment_id.as_ref().map(|p| p.as_str()), Some("pay_2"));
    assert_eq!(gateway.opened.load(Ordering::SeqCst), 2);
    assert!(store.state().await.is_empty());
}

#[tokio::test]
async fn test_gateway_receives_minor_units_and_prefill() {
    let store = Store::new();
    store.add("filter-coffee").await;

    let gateway = Arc::new(HeldGateway::default());
    let checkout = store.checkout().with_gateway(gateway.clone());
    checkout.select_provider(PaymentProvider::GatewayUpi).unwrap();

    let buyer = customer();
    let (result, _) = tokio::join!(checkout.pay(&buyer), async {
        tokio::task::yield_now().await;
        gateway.release.notify_one();
    });
    result.unwrap();

    let requests = gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    // 450 + 81 tax
    assert_eq!(requests[0].amount, Money::inr(531));
    assert_eq!(requests[0].amount_minor, 53_100);
    assert_eq!(requests[0].currency, "INR");
    assert_eq!(requests[0].prefill.name, "Meera Iyer");
}

#[tokio::test]
async fn test_second_pay_while_in_flight_is_rejected() {
    let store = Store::new();
    store.add("lavender-oil").await;

    let gateway = Arc::new(HeldGateway::default());
    let checkout = store.checkout().with_gateway(gateway.clone());
    checkout.select_provider(PaymentProvider::GatewayCard).unwrap();

    let buyer = customer();
    let (first, _) = tokio::join!(checkout.pay(&buyer), async {
        tokio::task::yield_now().await;
        assert!(checkout.is_in_flight());

        let second = checkout.pay(&customer()).await;
        assert!(matches!(second, Err(CheckoutError::AttemptInProgress)));
        assert!(matches!(
            checkout.select_provider(PaymentProvider::CashOnDelivery),
            Err(CheckoutError::AttemptInProgress)
        ));

        gateway.release.notify_one();
    });

    assert!(first.is_ok());
    assert_eq!(gateway.requests.lock().unwrap().len(), 1);
    assert_eq!(store.book.len().await, 1);
    assert!(!checkout.is_in_flight());
}

#[tokio::test]
async fn test_cancel_during_widget_leaves_cart_untouched() {
    let store = Store::new();
    store.add("lavender-oil").await;
    store.desk.apply("WELCOME100").await.unwrap();
    let before = store.state().await;

    let gateway = Arc::new(HeldGateway::default());
    let checkout = store.checkout().with_gateway(gateway);
    checkout.select_provider(PaymentProvider::GatewayCard).unwrap();

    let buyer = customer();
    let (result, _) = tokio::join!(checkout.pay(&buyer), async {
        while !checkout.cancel() {
            tokio::task::yield_now().await;
        }
    });

    assert!(matches!(result, Err(CheckoutError::Cancelled)));
    assert_eq!(checkout.phase(), CheckoutPhase::Idle);
    assert_eq!(store.state().await, before);
    assert!(store.book.is_empty().await);
    assert!(!checkout.cancel());
}

#[tokio::test(start_paused = true)]
async fn test_upi_polling_settles_on_success() {
    let store = Store::new();
    store.add("tulsi-tea").await;

    let upi = Arc::new(ScriptedUpi::new(vec![
        UpiStatus::Pending,
        UpiStatus::Success {
            payment_id: PaymentId::new("upi_txn_9"),
        },
    ]));
    let checkout = store.checkout().with_upi(upi.clone());
    checkout.select_provider(PaymentProvider::UpiQr).unwrap();

    let outcome = checkout.pay(&customer()).await.unwrap();
    let order = outcome.order().unwrap();
    assert_eq!(order.payment_id.as_ref().map(|p| p.as_str()), Some("upi_txn_9"));
    assert_eq!(upi.checks.load(Ordering::SeqCst), 2);
    assert!(store.state().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_upi_polling_times_out() {
    let store = Store::new();
    store.add("tulsi-tea").await;
    let before = store.state().await;

    let upi = Arc::new(ScriptedUpi::new(Vec::new()));
    let checkout = store.checkout().with_upi(upi.clone());
    checkout.select_provider(PaymentProvider::UpiQr).unwrap();

    let err = checkout.pay(&customer()).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Payment(PaymentError::TimedOut { attempts: 3 })
    ));
    assert_eq!(upi.checks.load(Ordering::SeqCst), 3);
    assert_eq!(store.state().await, before);
}

#[tokio::test(start_paused = true)]
async fn test_upi_failure_is_declined() {
    let store = Store::new();
    store.add("tulsi-tea").await;

    let upi = Arc::new(ScriptedUpi::new(vec![UpiStatus::Failure {
        reason: "collect request expired".to_string(),
    }]));
    let checkout = store.checkout().with_upi(upi);
    checkout.select_provider(PaymentProvider::UpiQr).unwrap();

    let err = checkout.pay(&customer()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Payment(PaymentError::Declined(_))));
    assert_eq!(store.state().await.item_count(), 1);
}

#[tokio::test]
async fn test_wallet_redirect_settles_on_return() {
    let store = Store::new();
    store.add("lavender-oil").await;

    let checkout = store.checkout().with_wallet(Arc::new(FakeWallet));
    checkout.select_provider(PaymentProvider::WalletRedirect).unwrap();

    let outcome = checkout.pay(&customer()).await.unwrap();
    let CheckoutOutcome::Redirected {
        order_id,
        redirect_url,
    } = outcome
    else {
        panic!("expected a redirect");
    };
    assert!(redirect_url.ends_with(order_id.as_str()));
    assert_eq!(store.state().await.item_count(), 1);
    assert_eq!(store.pending.list().await.unwrap().len(), 1);

    let ret = store.redirect_return();
    let order = ret.complete(&order_id, "wallet_ref_7").await.unwrap();
    assert_eq!(order.total, Money::inr(1061));
    assert!(store.state().await.is_empty());
    assert_eq!(store.book.len().await, 1);

    let again = ret.complete(&order_id, "wallet_ref_7").await;
    assert!(matches!(again, Err(CheckoutError::PendingOrderNotFound(_))));
    assert_eq!(store.book.len().await, 1);
}

#[tokio::test]
async fn test_cart_change_mid_flight_settles_captured_amount() {
    let store = Store::new();
    store.add("filter-coffee").await;

    let gateway = Arc::new(HeldGateway::default());
    let checkout = store.checkout().with_gateway(gateway.clone());
    checkout.select_provider(PaymentProvider::GatewayCard).unwrap();
    let captured = checkout.quote().await.total;

    let buyer = customer();
    let (result, _) = tokio::join!(checkout.pay(&buyer), async {
        tokio::task::yield_now().await;
        assert!(!checkout.attempt_is_stale().await);
        store.add("tulsi-tea").await;
        assert!(checkout.attempt_is_stale().await);
        gateway.release.notify_one();
    });

    let outcome = result.unwrap();
    let order = outcome.order().unwrap();
    assert_eq!(order.total, captured);
    assert_eq!(order.items.len(), 1);
    assert!(store.state().await.is_empty());
}

#[tokio::test]
async fn test_invalid_details_do_not_touch_cart() {
    let store = Store::new();
    store.add("lavender-oil").await;
    let before = store.state().await;

    let checkout = store.checkout();
    let info = CustomerInfo {
        email: "meera-at-example".to_string(),
        pincode: String::new(),
        ..customer()
    };
    let err = checkout.pay(&info).await.unwrap_err();
    let CheckoutError::Validation(fields) = err else {
        panic!("expected validation errors");
    };
    assert!(fields.contains(CustomerField::Email));
    assert!(fields.contains(CustomerField::Pincode));
    assert_eq!(store.state().await, before);
    assert_eq!(checkout.phase(), CheckoutPhase::Idle);
}
