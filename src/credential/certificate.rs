use super::*;
use crate::token::CredentialSession;
use std::sync::Arc;

/// DER certificate bytes.
///
/// `Owned` bytes belong to a local credential and go away with it. `Borrowed` bytes were
/// supplied by a peer and may be shared freely; they are never released individually.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertificateBytes {
    Owned(Vec<u8>),
    Borrowed(Arc<[u8]>),
}

impl CertificateBytes {
    pub fn owned(bytes: Vec<u8>) -> Result<Self, CredentialError> {
        if bytes.is_empty() {
            return Err(CredentialError::EmptyCertificate);
        }
        Ok(Self::Owned(bytes))
    }

    pub fn borrowed(bytes: Arc<[u8]>) -> Result<Self, CredentialError> {
        if bytes.is_empty() {
            return Err(CredentialError::EmptyCertificate);
        }
        Ok(Self::Borrowed(bytes))
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl AsRef<[u8]> for CertificateBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Owned(x) => x,
            Self::Borrowed(x) => x,
        }
    }
}

/// Payload of the X.509 credential variants.
#[derive(Debug)]
pub struct X509Data {
    certificate: CertificateBytes,
    session: Option<CredentialSession>,
    key: Option<KeyHandle>,
}

impl X509Data {
    /// A certificate received from a peer. It has no session and no private key.
    pub fn peer(bytes: Arc<[u8]>) -> Result<Self, CredentialError> {
        Ok(Self {
            certificate: CertificateBytes::borrowed(bytes)?,
            session: None,
            key: None,
        })
    }

    /// A certificate belonging to a local credential, optionally backed by a token session.
    pub fn local(
        bytes: Vec<u8>,
        session: Option<CredentialSession>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            certificate: CertificateBytes::owned(bytes)?,
            session,
            key: None,
        })
    }

    pub fn certificate(&self) -> &CertificateBytes {
        &self.certificate
    }

    pub fn session(&self) -> Option<&CredentialSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut CredentialSession> {
        self.session.as_mut()
    }

    pub fn key(&self) -> Option<&KeyHandle> {
        self.key.as_ref()
    }

    pub fn set_key(&mut self, key: KeyHandle) {
        self.key = Some(key)
    }

    /// Release the session (and with it any cached PIN) and the private key.
    pub fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_empty() {
        assert_eq!(
            CertificateBytes::owned(vec![]),
            Err(CredentialError::EmptyCertificate)
        );
    }

    #[test]
    fn test_borrowed_shared() {
        let blob: Arc<[u8]> = Arc::from(&[1u8, 2, 3][..]);
        let a = X509Data::peer(blob.clone()).unwrap();
        assert_eq!(a.certificate().as_ref(), &[1, 2, 3]);
        assert!(!a.certificate().is_owned());
        drop(a);
        assert_eq!(Arc::strong_count(&blob), 1);
    }

    #[test]
    fn test_local_release() {
        let pem = std::fs::read_to_string("tests/data/user.key").unwrap();
        let mut x = X509Data::local(vec![0x30, 0x00], None).unwrap();
        x.set_key(KeyHandle::from_pem(&pem).unwrap());
        assert!(x.key().is_some());
        x.release();
        assert!(x.key().is_none());
        assert!(x.session().is_none());
    }
}
