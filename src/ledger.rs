//! Fingerprint ledgers: `known_hosts` style host key files and `authorized_keys` style
//! identity lists.
//!
//! Both are consulted as async capabilities so that decision procedures can be tested against
//! in-memory fakes.

mod authorized_keys;
mod error;
mod known_hosts;
mod pattern;

pub use self::authorized_keys::*;
pub use self::error::*;
pub use self::known_hosts::*;
pub use self::pattern::*;

use crate::credential::{KeyType, PublicKey};
use crate::util::BoxFuture;
use std::path::Path;

/// Result of looking up a host key in one ledger file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostStatus {
    /// The name is known and one of its entries matches the key.
    Ok { line: usize },
    /// No entry of the key's type exists for the name.
    New,
    /// Entries of the key's type exist for the name but none matches.
    Changed { existing: PublicKey, line: usize },
}

/// A host key ledger backed by files (or anything addressed like one).
pub trait HostKeyLedger: Send + Sync {
    fn lookup(
        &self,
        file: &Path,
        name: &str,
        key: &PublicKey,
    ) -> BoxFuture<Result<HostStatus, LedgerError>>;

    /// The first key of the given type recorded for `name`, with its line number.
    fn lookup_by_type(
        &self,
        file: &Path,
        name: &str,
        key_type: KeyType,
    ) -> BoxFuture<Result<Option<(PublicKey, usize)>, LedgerError>>;

    /// Append an entry. With `hash` every name gets its own hashed line, otherwise all names
    /// share one comma separated line.
    fn insert(
        &self,
        file: &Path,
        names: &[&str],
        key: &PublicKey,
        hash: bool,
    ) -> BoxFuture<Result<(), LedgerError>>;

    fn exists(&self, file: &Path) -> BoxFuture<bool>;
}
