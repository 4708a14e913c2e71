//! The user identity authorizer: should a server accept the key or certificate a connecting
//! user presented?
//!
//! This is stricter than host trust. Certificates must name the user, must not be self-signed
//! and must validate against a trust anchor; there is no ledger fallback for them. Plain keys
//! are looked up in the user's authorized-identity lists.

mod config;
mod decision;

pub use self::config::*;
pub use self::decision::*;
