//! The host trust engine: should a client accept the key or certificate a server presented?
//!
//! X.509 host keys are first checked against the configured trust anchors. A certificate that
//! validates and names the host is accepted outright. Self-signed certificates and those whose
//! issuer is not a configured anchor fall back to the `known_hosts` ledgers, exactly like
//! plain keys.

mod certificate;
mod config;
mod decision;
mod known_hosts;
mod prompter;
mod report;

pub use self::config::*;
pub use self::decision::*;
pub use self::prompter::*;
pub use self::report::*;
