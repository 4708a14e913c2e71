mod certificate;
mod error;
mod key_type;
mod private_key;
mod public_key;

pub use self::certificate::*;
pub use self::error::*;
pub use self::key_type::*;
pub use self::private_key::*;
pub use self::public_key::*;

use crate::token::CredentialSession;

/// A key or identity, either a local one (possibly with private key material) or one
/// presented by a peer.
///
/// Every decision procedure matches exhaustively on this type.
#[derive(Debug)]
pub enum Credential {
    /// Deprecated protocol 1 RSA key; only the public half is ever loaded.
    Legacy1(RsaPublicKey),
    Rsa {
        public: RsaPublicKey,
        private: Option<KeyHandle>,
    },
    Dsa {
        public: DsaPublicKey,
        private: Option<KeyHandle>,
    },
    X509Rsa(X509Data),
    X509Dss(X509Data),
}

impl Credential {
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Legacy1(_) => KeyType::Rsa1,
            Self::Rsa { .. } => KeyType::Rsa,
            Self::Dsa { .. } => KeyType::Dsa,
            Self::X509Rsa(_) => KeyType::X509Rsa,
            Self::X509Dss(_) => KeyType::X509Dss,
        }
    }

    /// Wrap a plain public key (no private half).
    pub fn from_public_key(key: PublicKey) -> Self {
        match key {
            PublicKey::Rsa1(public) => Self::Legacy1(public),
            PublicKey::Rsa(public) => Self::Rsa {
                public,
                private: None,
            },
            PublicKey::Dsa(public) => Self::Dsa {
                public,
                private: None,
            },
        }
    }

    /// Wrap a private key as a plain credential carrying its public half.
    pub fn from_private_key(key: KeyHandle) -> Self {
        match key.public_key() {
            PublicKey::Dsa(public) => Self::Dsa {
                public,
                private: Some(key),
            },
            PublicKey::Rsa(public) | PublicKey::Rsa1(public) => Self::Rsa {
                public,
                private: Some(key),
            },
        }
    }

    /// Build a credential from a key blob received over the wire.
    ///
    /// Plain keys arrive in SSH encoding, X.509 keys as a DER certificate. The certificate is
    /// kept as a shared borrowed blob and has no session.
    pub fn from_peer(key_type: KeyType, blob: &[u8]) -> Result<Self, CredentialError> {
        match key_type {
            KeyType::Rsa | KeyType::Dsa => {
                let key = PublicKey::from_blob(blob).ok_or(CredentialError::InvalidKey)?;
                if key.key_type() != key_type {
                    return Err(CredentialError::InvalidKey);
                }
                Ok(Self::from_public_key(key))
            }
            KeyType::X509Rsa => Ok(Self::X509Rsa(X509Data::peer(blob.into())?)),
            KeyType::X509Dss => Ok(Self::X509Dss(X509Data::peer(blob.into())?)),
            KeyType::Rsa1 => Err(CredentialError::UnsupportedKeyType(key_type.name().into())),
        }
    }

    /// The public key for plain credentials. X.509 credentials need a certificate parser to
    /// extract theirs.
    pub fn plain_public_key(&self) -> Option<PublicKey> {
        match self {
            Self::Legacy1(k) => Some(PublicKey::Rsa1(k.clone())),
            Self::Rsa { public, .. } => Some(PublicKey::Rsa(public.clone())),
            Self::Dsa { public, .. } => Some(PublicKey::Dsa(public.clone())),
            Self::X509Rsa(_) | Self::X509Dss(_) => None,
        }
    }

    pub fn x509(&self) -> Option<&X509Data> {
        match self {
            Self::X509Rsa(x) | Self::X509Dss(x) => Some(x),
            _ => None,
        }
    }

    pub fn x509_mut(&mut self) -> Option<&mut X509Data> {
        match self {
            Self::X509Rsa(x) | Self::X509Dss(x) => Some(x),
            _ => None,
        }
    }

    pub fn certificate(&self) -> Option<&CertificateBytes> {
        self.x509().map(|x| x.certificate())
    }

    pub fn private_key(&self) -> Option<&KeyHandle> {
        match self {
            Self::Rsa { private, .. } | Self::Dsa { private, .. } => private.as_ref(),
            Self::X509Rsa(x) | Self::X509Dss(x) => x.key(),
            Self::Legacy1(_) => None,
        }
    }

    pub fn session(&self) -> Option<&CredentialSession> {
        self.x509().and_then(|x| x.session())
    }
}
