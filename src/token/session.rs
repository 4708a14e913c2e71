use super::*;
use crate::credential::KeyHandle;
use crate::util::Secret;
use crate::x509::{ValidationContext, ValidationPolicy};
use std::path::PathBuf;
use std::sync::Arc;

/// Validation policy selection shared by all sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// File with named policy definitions (`<name> <option>...` per line).
    pub policy_db: Option<PathBuf>,
    /// Name of the policy to use; `default` if absent.
    pub policy_name: Option<String>,
    /// Directory of trusted anchor certificates. Falls back to
    /// [ValidationContext::DEFAULT_ANCHOR_DIR].
    pub anchor_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    UnknownPolicy(String),
    PolicyDb(String),
    TokenNotPresent(String),
}

impl std::error::Error for InitError {}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPolicy(x) => write!(f, "unknown validation policy {:?}", x),
            Self::PolicyDb(x) => write!(f, "policy database: {}", x),
            Self::TokenNotPresent(x) => write!(f, "token {:?} not present", x),
        }
    }
}

/// Either the process-wide validation session or a session scoped to one credential.
#[derive(Debug)]
pub enum SessionHandle {
    Validation(Arc<ValidationContext>),
    Credential(CredentialSession),
}

/// Initialise a session.
///
/// Without a token target this sets up the validation context used for peers' certificates.
/// Callers construct it once and share it. With a target the session is bound to the token
/// named in the reference.
pub async fn init_session(
    policy: &SessionPolicy,
    target: Option<(Arc<dyn TokenStore>, CredentialReference)>,
) -> Result<SessionHandle, InitError> {
    match target {
        None => Ok(SessionHandle::Validation(Arc::new(
            ValidationContext::init(policy).await?,
        ))),
        Some((store, reference)) => Ok(SessionHandle::Credential(
            CredentialSession::init(policy, store, reference).await?,
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFetchError {
    NoPin,
    IncorrectPin,
    ObjectAmbiguous,
    NotFound,
    PinFileUnreadable(std::io::ErrorKind),
}

impl std::error::Error for KeyFetchError {}

impl std::fmt::Display for KeyFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPin => write!(f, "no PIN available for the token"),
            Self::IncorrectPin => write!(f, "incorrect PIN"),
            Self::ObjectAmbiguous => write!(f, "object label matches more than one key"),
            Self::NotFound => write!(f, "private key not found"),
            Self::PinFileUnreadable(e) => write!(f, "cannot read PIN file: {:?}", e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertFetchError {
    AuthRequired,
    IncorrectPin,
    ObjectAmbiguous,
    NotFound,
    EmptyCertificate,
    /// No PIN could be obtained for a certificate that is only visible after login.
    Pin(PinError),
}

impl std::error::Error for CertFetchError {}

impl std::fmt::Display for CertFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "token requires a PIN to read the certificate"),
            Self::IncorrectPin => write!(f, "incorrect PIN"),
            Self::ObjectAmbiguous => write!(f, "object label matches more than one certificate"),
            Self::NotFound => write!(f, "certificate not found"),
            Self::EmptyCertificate => write!(f, "certificate object is empty"),
            Self::Pin(e) => write!(f, "{}", e),
        }
    }
}

/// Per-credential token state.
///
/// A PIN obtained while reading the certificate is cached until the private key has been
/// resolved and then dropped (which zeroes it). A PIN passed explicitly to
/// [CredentialSession::fetch_private_key] takes precedence over the cached one. Not for
/// concurrent use.
pub struct CredentialSession {
    store: Arc<dyn TokenStore>,
    reference: CredentialReference,
    policy: ValidationPolicy,
    pin: Option<Secret>,
}

impl CredentialSession {
    pub async fn init(
        policy: &SessionPolicy,
        store: Arc<dyn TokenStore>,
        reference: CredentialReference,
    ) -> Result<Self, InitError> {
        let policy = ValidationPolicy::load(policy).await?;
        if !store.has_token(&reference) {
            return Err(InitError::TokenNotPresent(reference.token));
        }
        Ok(Self {
            store,
            reference,
            policy,
            pin: None,
        })
    }

    pub fn reference(&self) -> &CredentialReference {
        &self.reference
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn has_cached_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub async fn fetch_private_key(
        &mut self,
        prompter: &dyn PinPrompter,
        ask_for_pin: bool,
        explicit_pin: Option<&Secret>,
    ) -> Result<KeyHandle, KeyFetchError> {
        // A PIN cached by the certificate fetch is used at most once.
        let cached = self.pin.take();
        let pin = match (explicit_pin, cached) {
            (Some(pin), _) => pin.clone(),
            (None, Some(pin)) => pin,
            (None, None) => get_pin(None, &self.reference, ask_for_pin, prompter)
                .await
                .map_err(|e| match e {
                    PinError::NoPin => KeyFetchError::NoPin,
                    PinError::PinFileUnreadable(e) => KeyFetchError::PinFileUnreadable(e),
                })?,
        };
        let r = self.store.find_key(&self.reference, &pin);
        drop(pin);
        r.map_err(|e| {
            log::debug!("token {:?}: {}", self.reference.token, e);
            match e {
                TokenStoreError::AuthFailed => KeyFetchError::IncorrectPin,
                TokenStoreError::AmbiguousMatch => KeyFetchError::ObjectAmbiguous,
                TokenStoreError::AuthRequired => KeyFetchError::NoPin,
                TokenStoreError::NotFound => KeyFetchError::NotFound,
            }
        })
    }

    pub async fn fetch_certificate(
        &mut self,
        prompter: &dyn PinPrompter,
        may_prompt: bool,
        explicit_pin: Option<&Secret>,
    ) -> Result<Vec<u8>, CertFetchError> {
        let map = |e: TokenStoreError| match e {
            TokenStoreError::AuthFailed => CertFetchError::IncorrectPin,
            TokenStoreError::AuthRequired => CertFetchError::AuthRequired,
            TokenStoreError::AmbiguousMatch => CertFetchError::ObjectAmbiguous,
            TokenStoreError::NotFound => CertFetchError::NotFound,
        };
        let pin = if self.store.cert_requires_auth(&self.reference).map_err(map)? {
            let pin = get_pin(explicit_pin, &self.reference, may_prompt, prompter)
                .await
                .map_err(CertFetchError::Pin)?;
            Some(pin)
        } else {
            None
        };
        let der = self
            .store
            .find_certificate(&self.reference, pin.as_ref())
            .map_err(map)?;
        if der.is_empty() {
            return Err(CertFetchError::EmptyCertificate);
        }
        // Cached only once the certificate is in hand.
        self.pin = pin;
        Ok(der)
    }

    /// Drop the cached PIN.
    pub fn close(&mut self) {
        self.pin = None;
    }
}

impl std::fmt::Debug for CredentialSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSession")
            .field("reference", &self.reference)
            .field("policy", &self.policy)
            .field("pin", &self.pin)
            .finish()
    }
}
