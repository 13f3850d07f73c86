//! Authentication module for Verdant.
//!
//! Issues admin sessions after an Argon2 password check and hands the
//! commerce core an [`AdminCapability`](verdant_commerce::orders::AdminCapability)
//! instead of credentials.

mod error;
mod password;
mod session;
mod token;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use session::{AdminAuthority, AdminCredentials, AuthSession};
pub use token::SessionToken;
