//! Newtype IDs for type-safe identifiers.
//!
//! Keeps a product id from being passed where an order id is expected, and
//! gives each generated id a readable prefix (`ORD-`, `ATT-`).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident, $prefix:expr) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used by [`Self::generate`].
            pub const PREFIX: &'static str = $prefix;

            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(format!("{}-{}", Self::PREFIX, generate_suffix()))
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId, "PRD");
define_id!(OrderId, "ORD");
define_id!(PaymentId, "PAY");
define_id!(AttemptId, "ATT");

/// Time-ordered UUIDv7, upper-case hex without hyphens.
///
/// The random tail keeps ids distinct across processes sharing a state
/// directory, even within one millisecond.
fn generate_suffix() -> String {
    Uuid::now_v7().simple().to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("lavender-oil");
        assert_eq!(id.as_str(), "lavender-oil");
    }

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert!(a.as_str().starts_with("ORD-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_ids_do_not_repeat_within_a_millisecond() {
        let ids: std::collections::HashSet<OrderId> =
            (0..10_000).map(|_| OrderId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_generated_suffix_is_a_uuid() {
        let id = PaymentId::generate();
        let suffix = id.as_str().strip_prefix("PAY-").unwrap();
        let parsed = Uuid::parse_str(suffix).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("ORD-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ORD-1\"");
    }
}
