#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    EmptyCertificate,
    InvalidCertificate,
    InvalidKey,
    /// The deprecated protocol 1 private key file format.
    LegacyPrivateKeyFormat,
    UnsupportedKeyType(String),
    Io(std::io::ErrorKind),
}

impl std::error::Error for CredentialError {}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCertificate => write!(f, "certificate object is empty"),
            Self::InvalidCertificate => write!(f, "not a valid X.509 certificate"),
            Self::InvalidKey => write!(f, "invalid key format"),
            Self::LegacyPrivateKeyFormat => {
                write!(f, "protocol 1 private key files are no longer supported")
            }
            Self::UnsupportedKeyType(x) => write!(f, "unsupported key type: {}", x),
            Self::Io(e) => write!(f, "i/o error: {:?}", e),
        }
    }
}

impl From<std::io::Error> for CredentialError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.kind())
    }
}
