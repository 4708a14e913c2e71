use super::CredentialReference;
use crate::credential::KeyHandle;
use crate::util::Secret;

/// Object search inside PIN-protected tokens.
///
/// Tokens are selected by label and, when the reference names them, manufacturer, model and
/// serial number. Objects are selected by label. A label matching more than one object of
/// the requested kind is reported as [TokenStoreError::AmbiguousMatch], never resolved by
/// picking one.
pub trait TokenStore: Send + Sync {
    /// Whether a token matching the reference is present.
    fn has_token(&self, reference: &CredentialReference) -> bool;

    fn find_key(
        &self,
        reference: &CredentialReference,
        pin: &Secret,
    ) -> Result<KeyHandle, TokenStoreError>;

    /// Whether the certificate object is only visible after login.
    fn cert_requires_auth(&self, reference: &CredentialReference)
        -> Result<bool, TokenStoreError>;

    fn find_certificate(
        &self,
        reference: &CredentialReference,
        pin: Option<&Secret>,
    ) -> Result<Vec<u8>, TokenStoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStoreError {
    NotFound,
    AmbiguousMatch,
    AuthFailed,
    AuthRequired,
}

impl std::error::Error for TokenStoreError {}

impl std::fmt::Display for TokenStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
