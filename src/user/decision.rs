use super::*;
use crate::credential::{Credential, PublicKey};
use crate::ledger::{AuthorizedKeys, LedgerError};
use crate::x509::{inspect, CertificateParser, NameMatch, SelfSignedVerdict};
use crate::x509::{ValidationContext, ValidationOutcome};

/// The collaborators a user identity decision needs.
#[derive(Clone, Copy)]
pub struct UserAuth<'a> {
    pub config: &'a UserAuthConfig,
    pub validation: &'a ValidationContext,
    pub parser: &'a dyn CertificateParser,
    pub authorized: &'a dyn AuthorizedKeys,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserDecision {
    Accept,
    /// The reason is for local logs only and must not be sent to the peer.
    Reject(UserRejectReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserRejectReason {
    NameMismatch { user: String, mapped: Option<String> },
    CorruptedCertificate,
    SelfSigned { subject: String },
    MissingTrustAnchor { issuer: String },
    CertificateInvalid,
    NotAuthorized,
}

impl std::fmt::Display for UserRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameMismatch { user, mapped } => write!(
                f,
                "certificate maps to {} instead of user {}",
                mapped.as_deref().unwrap_or("<no name>"),
                user
            ),
            Self::CorruptedCertificate => write!(f, "corrupted user certificate"),
            Self::SelfSigned { subject } => {
                write!(f, "self-signed user certificate ({}) not accepted", subject)
            }
            Self::MissingTrustAnchor { issuer } => {
                write!(f, "no trust anchor for issuer {}", issuer)
            }
            Self::CertificateInvalid => write!(f, "user certificate failed validation"),
            Self::NotAuthorized => write!(f, "key not found in authorized keys"),
        }
    }
}

/// Decide whether `user` may authenticate with `key`.
///
/// Errors are reserved for unreadable authorized-identity lists.
pub async fn user_identity_decision(
    auth: &UserAuth<'_>,
    user: &str,
    key: &Credential,
) -> Result<UserDecision, LedgerError> {
    let decision = match key {
        Credential::X509Rsa(x) | Credential::X509Dss(x) => {
            check_certificate(auth, user, x.certificate().as_ref()).await
        }
        Credential::Legacy1(k) => check_authorized(auth, &PublicKey::Rsa1(k.clone())).await?,
        Credential::Rsa { public, .. } => {
            check_authorized(auth, &PublicKey::Rsa(public.clone())).await?
        }
        Credential::Dsa { public, .. } => {
            check_authorized(auth, &PublicKey::Dsa(public.clone())).await?
        }
    };
    match &decision {
        UserDecision::Accept => log::debug!("user {}: {} key accepted", user, key.key_type()),
        UserDecision::Reject(reason) => log::info!("user {}: {}", user, reason),
    }
    Ok(decision)
}

/// An unparseable certificate is reported as corrupted before the name binding is checked.
/// The name binding is checked before any validation runs.
async fn check_certificate(auth: &UserAuth<'_>, user: &str, cert: &[u8]) -> UserDecision {
    let verdict = inspect(cert, auth.parser);
    if verdict == SelfSignedVerdict::Corrupted {
        return UserDecision::Reject(UserRejectReason::CorruptedCertificate);
    }
    if let NameMatch::NotMatched(mapped) = auth.parser.match_name(cert, user) {
        return UserDecision::Reject(UserRejectReason::NameMismatch {
            user: user.into(),
            mapped,
        });
    }
    match verdict {
        SelfSignedVerdict::Corrupted => {
            UserDecision::Reject(UserRejectReason::CorruptedCertificate)
        }
        SelfSignedVerdict::SelfSigned { subject, .. } => {
            UserDecision::Reject(UserRejectReason::SelfSigned { subject })
        }
        SelfSignedVerdict::NotSelfSigned { issuer, .. } => {
            match auth.validation.validate(cert, auth.parser).await {
                ValidationOutcome::Validated => UserDecision::Accept,
                ValidationOutcome::MissingTrustAnchor => {
                    UserDecision::Reject(UserRejectReason::MissingTrustAnchor { issuer })
                }
                ValidationOutcome::ValidationError => {
                    UserDecision::Reject(UserRejectReason::CertificateInvalid)
                }
            }
        }
    }
}

async fn check_authorized(
    auth: &UserAuth<'_>,
    key: &PublicKey,
) -> Result<UserDecision, LedgerError> {
    for file in [&auth.config.authorized_keys, &auth.config.authorized_keys2] {
        if auth.authorized.is_authorized(file, key).await? {
            return Ok(UserDecision::Accept);
        }
    }
    Ok(UserDecision::Reject(UserRejectReason::NotAuthorized))
}
