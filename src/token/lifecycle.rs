use super::*;
use crate::credential::*;
use crate::util::Secret;
use crate::x509::{CertificateParser, PublicKeyAlgorithm};
use std::path::Path;
use std::sync::Arc;

/// Everything needed to turn a locator into a loaded credential.
pub struct LoadOptions<'a> {
    /// Token store for `pkcs11:` locators. File locators do not need one.
    pub store: Option<Arc<dyn TokenStore>>,
    pub policy: SessionPolicy,
    pub parser: &'a dyn CertificateParser,
    pub prompter: &'a dyn PinPrompter,
    /// Must be `false` in unattended server contexts.
    pub may_prompt: bool,
    /// A PIN relayed from another process (e.g. an agent).
    pub explicit_pin: Option<Secret>,
}

impl<'a> LoadOptions<'a> {
    pub fn new(parser: &'a dyn CertificateParser, prompter: &'a dyn PinPrompter) -> Self {
        Self {
            store: None,
            policy: SessionPolicy::default(),
            parser,
            prompter,
            may_prompt: false,
            explicit_pin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Reference(ReferenceError),
    Init(InitError),
    Certificate(CertFetchError),
    Key(KeyFetchError),
    Credential(CredentialError),
    NoTokenStore,
    /// The private key does not belong to the certificate.
    KeyMismatch,
}

impl std::error::Error for LoadError {}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference(e) => write!(f, "{}", e),
            Self::Init(e) => write!(f, "{}", e),
            Self::Certificate(e) => write!(f, "{}", e),
            Self::Key(e) => write!(f, "{}", e),
            Self::Credential(e) => write!(f, "{}", e),
            Self::NoTokenStore => write!(f, "token reference given but no token store configured"),
            Self::KeyMismatch => write!(f, "private key does not match the certificate"),
        }
    }
}

impl From<ReferenceError> for LoadError {
    fn from(e: ReferenceError) -> Self {
        Self::Reference(e)
    }
}

impl From<InitError> for LoadError {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<CertFetchError> for LoadError {
    fn from(e: CertFetchError) -> Self {
        Self::Certificate(e)
    }
}

impl From<KeyFetchError> for LoadError {
    fn from(e: KeyFetchError) -> Self {
        Self::Key(e)
    }
}

impl From<CredentialError> for LoadError {
    fn from(e: CredentialError) -> Self {
        Self::Credential(e)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Credential(e.into())
    }
}

/// Load a certificate from a token reference or a PEM/DER file.
///
/// Certificates from tokens keep their session (and possibly a cached PIN) for a subsequent
/// private key fetch.
pub async fn load_certificate(
    locator: &str,
    opts: &LoadOptions<'_>,
) -> Result<Credential, LoadError> {
    match resolve_reference(locator) {
        Ok(reference) => {
            let store = opts.store.clone().ok_or(LoadError::NoTokenStore)?;
            let mut session = CredentialSession::init(&opts.policy, store, reference).await?;
            let der = session
                .fetch_certificate(opts.prompter, opts.may_prompt, opts.explicit_pin.as_ref())
                .await?;
            x509_credential(der, Some(session), opts.parser)
        }
        Err(ReferenceError::NotATokenReference) => {
            let bytes = tokio::fs::read(locator).await?;
            let der = opts
                .parser
                .to_der(&bytes)
                .ok_or(CredentialError::InvalidCertificate)?;
            x509_credential(der, None, opts.parser)
        }
        Err(e) => Err(e.into()),
    }
}

/// Load a private key from a token reference or a PEM file.
///
/// A token object with a certificate under the same label yields an X.509 credential,
/// otherwise a plain RSA or DSA credential.
pub async fn load_private_key(
    locator: &str,
    opts: &LoadOptions<'_>,
) -> Result<Credential, LoadError> {
    match resolve_reference(locator) {
        Ok(reference) => {
            let store = opts.store.clone().ok_or(LoadError::NoTokenStore)?;
            let mut session = CredentialSession::init(&opts.policy, store, reference).await?;
            let pin = opts.explicit_pin.as_ref();
            let der = match session
                .fetch_certificate(opts.prompter, opts.may_prompt, pin)
                .await
            {
                Ok(der) => Some(der),
                Err(CertFetchError::NotFound) => None,
                Err(e) => return Err(e.into()),
            };
            let key = session
                .fetch_private_key(opts.prompter, opts.may_prompt, pin)
                .await?;
            match der {
                Some(der) => {
                    let mut credential = x509_credential(der, Some(session), opts.parser)?;
                    attach_private_key(&mut credential, key, opts.parser)?;
                    Ok(credential)
                }
                None => Ok(Credential::from_private_key(key)),
            }
        }
        Err(ReferenceError::NotATokenReference) => {
            let text = tokio::fs::read_to_string(locator).await?;
            let key = KeyHandle::from_pem(&text)?;
            Ok(Credential::from_private_key(key))
        }
        Err(e) => Err(e.into()),
    }
}

/// Load a public key or certificate file: PEM/DER certificates, OpenSSH public key lines or
/// protocol 1 `bits e n` lines.
pub async fn load_public_key(
    path: &Path,
    parser: &dyn CertificateParser,
) -> Result<Credential, LoadError> {
    let bytes = tokio::fs::read(path).await?;
    if let Some(der) = parser.to_der(&bytes) {
        return x509_credential(der, None, parser);
    }
    let text = std::str::from_utf8(&bytes).map_err(|_| CredentialError::InvalidKey)?;
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .ok_or(CredentialError::InvalidKey)?;
    let key = PublicKey::parse_fields(&mut line.split_whitespace())
        .ok_or(CredentialError::InvalidKey)?;
    Ok(Credential::from_public_key(key))
}

/// Attach a private key to a certificate credential after checking that they belong together.
pub fn attach_private_key(
    credential: &mut Credential,
    key: KeyHandle,
    parser: &dyn CertificateParser,
) -> Result<(), LoadError> {
    let x = credential
        .x509_mut()
        .ok_or_else(|| CredentialError::UnsupportedKeyType(key.key_type().name().into()))?;
    if parser.public_key(x.certificate().as_ref()) != Some(key.public_key()) {
        return Err(LoadError::KeyMismatch);
    }
    x.set_key(key);
    Ok(())
}

/// Release a credential together with its session, cached PIN and key material.
pub fn free_credential(mut credential: Credential) {
    if let Some(x) = credential.x509_mut() {
        x.release();
    }
    log::debug!("released {} credential", credential.key_type());
}

fn x509_credential(
    der: Vec<u8>,
    session: Option<CredentialSession>,
    parser: &dyn CertificateParser,
) -> Result<Credential, LoadError> {
    if !parser.is_certificate(&der) {
        return Err(CredentialError::InvalidCertificate.into());
    }
    let algorithm = parser.public_key_algorithm(&der);
    let data = X509Data::local(der, session)?;
    match algorithm {
        PublicKeyAlgorithm::Rsa => Ok(Credential::X509Rsa(data)),
        PublicKeyAlgorithm::Dsa => Ok(Credential::X509Dss(data)),
        PublicKeyAlgorithm::Other => {
            Err(CredentialError::UnsupportedKeyType("x509v3-sign-other".into()).into())
        }
    }
}
