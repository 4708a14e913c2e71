use crate::credential::KeyType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The envelope carries a tag this protocol does not know.
    UnknownAlgorithm(String),
    MalformedEnvelope,
    NoPrivateKey,
    NoPublicKey,
    UnsupportedKeyType(KeyType),
    Internal(String),
}

impl std::error::Error for SignatureError {}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAlgorithm(x) => write!(f, "unknown signature algorithm {:?}", x),
            Self::MalformedEnvelope => write!(f, "malformed signature"),
            Self::NoPrivateKey => write!(f, "credential has no private key"),
            Self::NoPublicKey => write!(f, "cannot extract public key from credential"),
            Self::UnsupportedKeyType(x) => write!(f, "cannot sign with {} keys", x),
            Self::Internal(x) => write!(f, "signature provider: {}", x),
        }
    }
}
