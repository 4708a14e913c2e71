//! Trust decisions for SSH peers presenting X.509 certificates or plain public keys, and
//! management of local credentials held in files or PKCS#11-style tokens.
//!
//! The two top-level questions are answered by [host_trust_decision] (should a client accept
//! the server it connected to) and [user_identity_decision] (should a server accept a
//! connecting user). Both combine certificate validation with a fingerprint ledger.

pub mod credential;
pub mod host;
pub mod ledger;
pub mod signature;
pub mod token;
pub mod user;
pub mod util;
pub mod x509;

pub use self::credential::{Credential, CredentialError, KeyHandle, KeyType, PublicKey};
pub use self::host::{accept_host_key, host_trust_decision, HostTrust, HostTrustConfig};
pub use self::host::{HostTrustReport, Restrictions};
pub use self::host::{Prompter, RejectReason, StrictHostKeyChecking, TrustDecision, TrustError};
pub use self::ledger::{AuthorizedKeys, AuthorizedKeysFiles, HostKeyLedger, HostStatus};
pub use self::ledger::{KnownHostsFiles, LedgerError};
pub use self::signature::{sign, verify, SoftSignatureProvider, SignatureAlgorithm};
pub use self::signature::{SignatureBlob, SignatureError, SignatureProvider};
pub use self::token::{free_credential, load_certificate, load_private_key, load_public_key};
pub use self::token::{resolve_reference, CredentialReference, CredentialSession, TokenStore};
pub use self::user::{user_identity_decision, UserAuth, UserAuthConfig, UserDecision};
pub use self::x509::{CertificateParser, ValidationContext, ValidationOutcome, X509Parser};
