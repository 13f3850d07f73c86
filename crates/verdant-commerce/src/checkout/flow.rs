//! Checkout state machine.
//!
//! `Idle -> Validating -> Dispatching -> {Redirected | Polling | Confirmed}
//! -> Settled | Failed`. One attempt runs at a time; a second `pay` while an
//! attempt is in flight is rejected without touching the first. A cancelled
//! attempt goes back to `Idle`.

use crate::cart::SharedCart;
use crate::checkout::{
    CheckoutOrder, CheckoutQuote, CustomerInfo, DispatchKind, OrderConfirmation, PaymentGateway,
    PaymentProvider, PaymentRequest, PendingOrderStore, UpiCollect, UpiStatus, WalletRedirect,
};
use crate::config::{CheckoutConfig, PricingConfig};
use crate::error::{CheckoutError, PaymentError};
use crate::ids::{AttemptId, OrderId, PaymentId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Observable checkout phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Validating,
    Dispatching {
        provider: PaymentProvider,
        total: Money,
    },
    /// Customer sent to a wallet; confirmation arrives out of band.
    Redirected {
        order_id: OrderId,
        redirect_url: String,
    },
    /// Waiting on a UPI collect request.
    Polling {
        intent_url: String,
        attempt: u32,
        max_attempts: u32,
    },
    /// Payment confirmed, order not yet recorded.
    Confirmed,
    Settled {
        order_id: OrderId,
    },
    Failed {
        reason: String,
    },
}

impl CheckoutPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Idle => "idle",
            CheckoutPhase::Validating => "validating",
            CheckoutPhase::Dispatching { .. } => "dispatching",
            CheckoutPhase::Redirected { .. } => "redirected",
            CheckoutPhase::Polling { .. } => "polling",
            CheckoutPhase::Confirmed => "confirmed",
            CheckoutPhase::Settled { .. } => "settled",
            CheckoutPhase::Failed { .. } => "failed",
        }
    }

    /// An attempt is between validation and its result.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::Validating
                | CheckoutPhase::Dispatching { .. }
                | CheckoutPhase::Polling { .. }
                | CheckoutPhase::Confirmed
        )
    }
}

/// Result of a successful `pay`.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Order placed and cart cleared.
    Settled(CheckoutOrder),
    /// Customer must finish on the wallet's page; the cart stays until
    /// [`RedirectReturn::complete`](crate::checkout::RedirectReturn::complete).
    Redirected {
        order_id: OrderId,
        redirect_url: String,
    },
}

impl CheckoutOutcome {
    pub fn order(&self) -> Option<&CheckoutOrder> {
        match self {
            CheckoutOutcome::Settled(order) => Some(order),
            CheckoutOutcome::Redirected { .. } => None,
        }
    }
}

/// Cart revision a running attempt was priced against.
#[derive(Debug, Clone)]
struct Attempt {
    id: AttemptId,
    revision: u64,
}

/// How a dispatch branch finished.
enum Dispatched {
    Paid(Option<PaymentId>),
    Redirected(String),
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clear the cart and hand the order to the confirmation display.
///
/// The cart is emptied under its lock before anyone sees the order.
pub(crate) async fn settle(
    cart: &SharedCart,
    confirmation: &dyn OrderConfirmation,
    order: CheckoutOrder,
) -> CheckoutOrder {
    cart.lock().await.clear();
    info!(
        order_id = %order.order_id,
        provider = order.provider.as_str(),
        total = order.total.amount,
        "order settled"
    );
    confirmation.confirm(&order).await;
    order
}

/// Drives one cart through payment.
pub struct CheckoutOrchestrator {
    cart: SharedCart,
    pending: Arc<dyn PendingOrderStore>,
    confirmation: Arc<dyn OrderConfirmation>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    wallet: Option<Arc<dyn WalletRedirect>>,
    upi: Option<Arc<dyn UpiCollect>>,
    pricing: PricingConfig,
    config: CheckoutConfig,
    provider: Mutex<PaymentProvider>,
    in_flight: AtomicBool,
    phase: watch::Sender<CheckoutPhase>,
    cancel: Mutex<Option<watch::Sender<bool>>>,
    attempt: Mutex<Option<Attempt>>,
}

impl CheckoutOrchestrator {
    /// Create an orchestrator with cash on delivery selected.
    ///
    /// Providers that need a collaborator fail with
    /// [`PaymentError::Unreachable`] until one is attached.
    pub fn new(
        cart: SharedCart,
        pending: Arc<dyn PendingOrderStore>,
        confirmation: Arc<dyn OrderConfirmation>,
    ) -> Self {
        let (phase, _) = watch::channel(CheckoutPhase::Idle);
        Self {
            cart,
            pending,
            confirmation,
            gateway: None,
            wallet: None,
            upi: None,
            pricing: PricingConfig::default(),
            config: CheckoutConfig::default(),
            provider: Mutex::new(PaymentProvider::default()),
            in_flight: AtomicBool::new(false),
            phase,
            cancel: Mutex::new(None),
            attempt: Mutex::new(None),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletRedirect>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_upi(mut self, upi: Arc<dyn UpiCollect>) -> Self {
        self.upi = Some(upi);
        self
    }

    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Current phase.
    pub fn phase(&self) -> CheckoutPhase {
        self.phase.borrow().clone()
    }

    /// Follow phase changes.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase.subscribe()
    }

    pub fn provider(&self) -> PaymentProvider {
        *lock(&self.provider)
    }

    /// Switch payment provider and reset to `Idle`.
    pub fn select_provider(&self, provider: PaymentProvider) -> Result<(), CheckoutError> {
        if self.in_flight.load(Ordering::Acquire) {
            return Err(CheckoutError::AttemptInProgress);
        }
        *lock(&self.provider) = provider;
        self.publish(CheckoutPhase::Idle);
        Ok(())
    }

    /// Price the current cart for the selected provider.
    pub async fn quote(&self) -> CheckoutQuote {
        let state = self.cart.lock().await.state();
        CheckoutQuote::compute(&state, self.provider(), &self.pricing)
    }

    /// Whether a payment attempt is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Abort a running widget or UPI attempt.
    ///
    /// Returns `false` when there is nothing to cancel.
    pub fn cancel(&self) -> bool {
        match lock(&self.cancel).as_ref() {
            Some(tx) => {
                info!("checkout cancel requested");
                tx.send_replace(true);
                true
            }
            None => false,
        }
    }

    /// True when the cart changed after the running attempt was priced.
    ///
    /// The attempt still charges the amount it captured.
    pub async fn attempt_is_stale(&self) -> bool {
        let captured = lock(&self.attempt).as_ref().map(|a| a.revision);
        match captured {
            Some(revision) => self.cart.lock().await.state().revision() != revision,
            None => false,
        }
    }

    fn publish(&self, phase: CheckoutPhase) {
        debug!(phase = phase.as_str(), "checkout phase");
        self.phase.send_replace(phase);
    }

    /// Run one payment attempt for the current cart.
    ///
    /// Every error leaves the cart and its coupon untouched.
    pub async fn pay(&self, customer: &CustomerInfo) -> Result<CheckoutOutcome, CheckoutError> {
        let _guard = InFlight::acquire(&self.in_flight).ok_or_else(|| {
            warn!("payment attempt rejected, another is in flight");
            CheckoutError::AttemptInProgress
        })?;

        self.publish(CheckoutPhase::Validating);
        let errors = customer.validate();
        if !errors.is_empty() {
            debug!(fields = errors.len(), "customer details invalid");
            self.publish(CheckoutPhase::Idle);
            return Err(CheckoutError::Validation(errors));
        }

        let state = self.cart.lock().await.state();
        if state.is_empty() {
            self.publish(CheckoutPhase::Idle);
            return Err(CheckoutError::EmptyCart);
        }
        if state.needs_coupon_revalidation() {
            let code = state
                .applied_coupon()
                .and_then(|result| result.code())
                .unwrap_or_default();
            debug!(code = %code, "applied coupon priced against an older subtotal");
            self.publish(CheckoutPhase::Idle);
            return Err(CheckoutError::CouponNeedsRevalidation(code));
        }

        let provider = self.provider();
        let quote = CheckoutQuote::compute(&state, provider, &self.pricing);
        let draft =
            CheckoutOrder::from_quote(OrderId::generate(), &state, &quote, customer.clone());
        let attempt = Attempt {
            id: AttemptId::generate(),
            revision: state.revision(),
        };
        info!(
            attempt = %attempt.id,
            order_id = %draft.order_id,
            provider = provider.as_str(),
            total = quote.total.amount,
            "dispatching payment"
        );
        *lock(&self.attempt) = Some(attempt);
        self.publish(CheckoutPhase::Dispatching {
            provider,
            total: quote.total,
        });

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *lock(&self.cancel) = Some(cancel_tx);

        let result = self.dispatch(provider, &draft, cancel_rx).await;

        *lock(&self.cancel) = None;
        let outcome = match result {
            Ok(Dispatched::Paid(payment_id)) => {
                self.publish(CheckoutPhase::Confirmed);
                if self.attempt_is_stale().await {
                    warn!(
                        order_id = %draft.order_id,
                        "cart changed during payment, settling the captured amount"
                    );
                }
                let order = match payment_id {
                    Some(id) => draft.with_payment_id(id),
                    None => draft,
                };
                let order = settle(&self.cart, self.confirmation.as_ref(), order).await;
                self.publish(CheckoutPhase::Settled {
                    order_id: order.order_id.clone(),
                });
                Ok(CheckoutOutcome::Settled(order))
            }
            Ok(Dispatched::Redirected(redirect_url)) => {
                info!(order_id = %draft.order_id, "customer redirected to wallet");
                self.publish(CheckoutPhase::Redirected {
                    order_id: draft.order_id.clone(),
                    redirect_url: redirect_url.clone(),
                });
                Ok(CheckoutOutcome::Redirected {
                    order_id: draft.order_id,
                    redirect_url,
                })
            }
            Err(CheckoutError::Cancelled) => {
                info!(order_id = %draft.order_id, "payment attempt cancelled");
                self.publish(CheckoutPhase::Idle);
                Err(CheckoutError::Cancelled)
            }
            Err(e) => {
                warn!(order_id = %draft.order_id, error = %e, "payment attempt failed");
                self.publish(CheckoutPhase::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        };
        *lock(&self.attempt) = None;
        outcome
    }

    async fn dispatch(
        &self,
        provider: PaymentProvider,
        draft: &CheckoutOrder,
        cancel: watch::Receiver<bool>,
    ) -> Result<Dispatched, CheckoutError> {
        let request = PaymentRequest::new(draft.order_id.clone(), draft.total, &draft.customer);
        match provider.dispatch_kind() {
            DispatchKind::Immediate => Ok(Dispatched::Paid(None)),
            DispatchKind::Widget => {
                let gateway = self.gateway.as_ref().ok_or_else(|| missing("payment gateway"))?;
                tokio::select! {
                    refs = gateway.open(&request) => Ok(Dispatched::Paid(Some(refs?.payment_id))),
                    _ = cancelled(cancel) => Err(CheckoutError::Cancelled),
                }
            }
            DispatchKind::Redirect => {
                let wallet = self.wallet.as_ref().ok_or_else(|| missing("wallet"))?;
                self.pending.save(draft).await?;
                match wallet.begin(&request).await {
                    Ok(url) => Ok(Dispatched::Redirected(url)),
                    Err(e) => {
                        if let Err(cleanup) = self.pending.delete(&draft.order_id).await {
                            warn!(error = %cleanup, "failed to drop pending order");
                        }
                        Err(e.into())
                    }
                }
            }
            DispatchKind::Polling => {
                let upi = self.upi.as_ref().ok_or_else(|| missing("UPI collect"))?;
                tokio::select! {
                    paid = self.poll_upi(upi.as_ref(), &request) => {
                        Ok(Dispatched::Paid(Some(paid?)))
                    }
                    _ = cancelled(cancel) => Err(CheckoutError::Cancelled),
                }
            }
        }
    }

    /// Poll until the collect request resolves or attempts run out.
    async fn poll_upi(
        &self,
        upi: &dyn UpiCollect,
        request: &PaymentRequest,
    ) -> Result<PaymentId, PaymentError> {
        let intent = upi.start(request).await?;
        let max_attempts = self.config.upi_max_polls;
        self.publish(CheckoutPhase::Polling {
            intent_url: intent.intent_url.clone(),
            attempt: 0,
            max_attempts,
        });

        for attempt in 1..=max_attempts {
            tokio::time::sleep(self.config.upi_poll_interval()).await;
            self.publish(CheckoutPhase::Polling {
                intent_url: intent.intent_url.clone(),
                attempt,
                max_attempts,
            });
            match upi.status(&intent).await? {
                UpiStatus::Pending => continue,
                UpiStatus::Success { payment_id } => return Ok(payment_id),
                UpiStatus::Failure { reason } => return Err(PaymentError::Declined(reason)),
            }
        }
        Err(PaymentError::TimedOut {
            attempts: max_attempts,
        })
    }
}

fn missing(what: &str) -> CheckoutError {
    PaymentError::Unreachable(format!("no {what} configured")).into()
}

/// Resolves once cancel is signalled; never if the sender goes away.
async fn cancelled(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
