//! Credential and token helpers.
//!
//! `core` only uses the password hasher, when storing a new account. Tokens are verified
//! by the API layer, which passes the resulting account id into core operations.

/// Password hashing and verification (Argon2id)
pub mod password;
/// Bearer token issuance and verification (HS256 JWT)
pub mod token;

pub use password::{hash_password, hash_password_blocking, verify_password};
pub use token::{Claims, TokenIssuer};
