use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelfSignedVerdict {
    SelfSigned { subject: String, issuer: String },
    NotSelfSigned { subject: String, issuer: String },
    Corrupted,
}

impl SelfSignedVerdict {
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::SelfSigned { subject, .. } | Self::NotSelfSigned { subject, .. } => Some(subject),
            Self::Corrupted => None,
        }
    }

    pub fn issuer(&self) -> Option<&str> {
        match self {
            Self::SelfSigned { issuer, .. } | Self::NotSelfSigned { issuer, .. } => Some(issuer),
            Self::Corrupted => None,
        }
    }
}

/// Decide whether a certificate is self-signed by comparing its normalized subject and issuer
/// names.
pub fn inspect(cert: &[u8], parser: &dyn CertificateParser) -> SelfSignedVerdict {
    let subject = match parser.subject(cert) {
        Some(x) => x,
        None => return SelfSignedVerdict::Corrupted,
    };
    let issuer = match parser.issuer(cert) {
        Some(x) => x,
        None => return SelfSignedVerdict::Corrupted,
    };
    if subject == issuer {
        SelfSignedVerdict::SelfSigned {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
        }
    } else {
        SelfSignedVerdict::NotSelfSigned {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
        }
    }
}
