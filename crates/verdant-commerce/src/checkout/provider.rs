//! Payment providers.

use serde::{Deserialize, Serialize};

/// Payment method chosen by the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    /// Cash on delivery.
    #[default]
    CashOnDelivery,
    /// Card payment in the gateway widget.
    GatewayCard,
    /// UPI collected through the gateway widget.
    GatewayUpi,
    /// Wallet that takes the customer to its own page.
    WalletRedirect,
    /// In-app UPI intent or QR, confirmed by status polling.
    UpiQr,
}

/// How a provider is driven to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchKind {
    /// Settles without talking to anyone.
    Immediate,
    /// Opens a widget and waits for its callback.
    Widget,
    /// Leaves the storefront; confirmed out of band.
    Redirect,
    /// Shows an intent and polls for status.
    Polling,
}

impl PaymentProvider {
    pub const ALL: [PaymentProvider; 5] = [
        PaymentProvider::CashOnDelivery,
        PaymentProvider::GatewayCard,
        PaymentProvider::GatewayUpi,
        PaymentProvider::WalletRedirect,
        PaymentProvider::UpiQr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::CashOnDelivery => "cod",
            PaymentProvider::GatewayCard => "card",
            PaymentProvider::GatewayUpi => "gateway_upi",
            PaymentProvider::WalletRedirect => "wallet",
            PaymentProvider::UpiQr => "upi_qr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentProvider::CashOnDelivery => "Cash on Delivery",
            PaymentProvider::GatewayCard => "Card",
            PaymentProvider::GatewayUpi => "UPI (gateway)",
            PaymentProvider::WalletRedirect => "Wallet",
            PaymentProvider::UpiQr => "UPI QR",
        }
    }

    /// Parse the short name used on the command line.
    pub fn from_str(s: &str) -> Option<Self> {
        PaymentProvider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn dispatch_kind(&self) -> DispatchKind {
        match self {
            PaymentProvider::CashOnDelivery => DispatchKind::Immediate,
            PaymentProvider::GatewayCard | PaymentProvider::GatewayUpi => DispatchKind::Widget,
            PaymentProvider::WalletRedirect => DispatchKind::Redirect,
            PaymentProvider::UpiQr => DispatchKind::Polling,
        }
    }

    /// Only cash on delivery carries the surcharge.
    pub fn has_cod_surcharge(&self) -> bool {
        matches!(self, PaymentProvider::CashOnDelivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_kinds() {
        assert_eq!(PaymentProvider::CashOnDelivery.dispatch_kind(), DispatchKind::Immediate);
        assert_eq!(PaymentProvider::GatewayUpi.dispatch_kind(), DispatchKind::Widget);
        assert_eq!(PaymentProvider::WalletRedirect.dispatch_kind(), DispatchKind::Redirect);
        assert_eq!(PaymentProvider::UpiQr.dispatch_kind(), DispatchKind::Polling);
    }

    #[test]
    fn test_parse_short_names() {
        for provider in PaymentProvider::ALL {
            assert_eq!(PaymentProvider::from_str(provider.as_str()), Some(provider));
        }
        assert_eq!(PaymentProvider::from_str("COD"), Some(PaymentProvider::CashOnDelivery));
        assert_eq!(PaymentProvider::from_str("paypal"), None);
    }
}
