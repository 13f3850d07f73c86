//! Customer contact and shipping details.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Contact and shipping fields collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CustomerInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Street address.
    pub address: String,
    pub city: String,
    pub state: String,
    /// Postal code.
    pub pincode: String,
}

/// A customer field, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    Email,
    FirstName,
    LastName,
    Phone,
    Address,
    City,
    State,
    Pincode,
}

impl CustomerField {
    pub const ALL: [CustomerField; 8] = [
        CustomerField::Email,
        CustomerField::FirstName,
        CustomerField::LastName,
        CustomerField::Phone,
        CustomerField::Address,
        CustomerField::City,
        CustomerField::State,
        CustomerField::Pincode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerField::Email => "email",
            CustomerField::FirstName => "first_name",
            CustomerField::LastName => "last_name",
            CustomerField::Phone => "phone",
            CustomerField::Address => "address",
            CustomerField::City => "city",
            CustomerField::State => "state",
            CustomerField::Pincode => "pincode",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CustomerField::Email => "Email",
            CustomerField::FirstName => "First name",
            CustomerField::LastName => "Last name",
            CustomerField::Phone => "Phone",
            CustomerField::Address => "Address",
            CustomerField::City => "City",
            CustomerField::State => "State",
            CustomerField::Pincode => "Pincode",
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-specific validation messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<CustomerField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CustomerField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: CustomerField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: CustomerField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CustomerField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl CustomerInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Format the shipping address as one line.
    pub fn one_line_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address.trim(),
            self.city.trim(),
            self.state.trim(),
            self.pincode.trim()
        )
    }

    fn value(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Email => &self.email,
            CustomerField::FirstName => &self.first_name,
            CustomerField::LastName => &self.last_name,
            CustomerField::Phone => &self.phone,
            CustomerField::Address => &self.address,
            CustomerField::City => &self.city,
            CustomerField::State => &self.state,
            CustomerField::Pincode => &self.pincode,
        }
    }

    /// Check every field; an empty result means the details are usable.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in CustomerField::ALL {
            if self.value(field).trim().is_empty() {
                errors.insert(field, format!("{} is required", field.display_name()));
            }
        }
        if !errors.contains(CustomerField::Email) && !is_plausible_email(&self.email) {
            errors.insert(CustomerField::Email, "Enter a valid email address");
        }
        errors
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

fn is_plausible_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email.trim()))
}
