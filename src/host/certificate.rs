use super::*;
use crate::credential::PublicKey;
use crate::x509::{inspect, NameMatch, SelfSignedVerdict, ValidationOutcome};

pub(super) enum CertificateVerdict {
    Accept,
    Reject(RejectReason),
    /// Continue with the ledgers using the certificate's key. Carries a warning for the user.
    UseLedger(PublicKey, String),
}

/// Decide what a server certificate alone says about the host.
pub(super) async fn check_certificate(
    trust: &HostTrust<'_>,
    host: &str,
    cert: &[u8],
    report: &mut HostTrustReport,
) -> CertificateVerdict {
    // Self-signed certificates validate against themselves, so the verdict is needed to
    // interpret the validator's answer.
    let verdict = inspect(cert, trust.parser);
    if verdict == SelfSignedVerdict::Corrupted {
        report.error("Corrupted host certificate.".into());
        return CertificateVerdict::Reject(RejectReason::CorruptedCertificate);
    }
    let outcome = trust.validation.validate(cert, trust.parser).await;
    match (verdict, outcome) {
        (SelfSignedVerdict::NotSelfSigned { .. }, ValidationOutcome::Validated) => {
            log::debug!("host certificate validated");
            match trust.parser.match_name(cert, host) {
                NameMatch::Matched => CertificateVerdict::Accept,
                NameMatch::NotMatched(mapped) => {
                    report.error(format!(
                        "Hostnames from the certificate and the command line do not match: {} != {}",
                        mapped.as_deref().unwrap_or("<none>"),
                        host
                    ));
                    CertificateVerdict::Reject(RejectReason::NameMismatch {
                        host: host.into(),
                        mapped,
                    })
                }
            }
        }
        (SelfSignedVerdict::SelfSigned { subject, .. }, ValidationOutcome::Validated) => {
            log::debug!("validated self-signed certificate");
            let warning = format!(
                "Warning: self-signed host certificate used with the subject:\n\n  {}\n\n\
                 Will use known_hosts file as a fall-back measure. Add the certificate to the\n\
                 directory of trusted anchors ({}) to avoid this message.",
                subject,
                trust.validation.anchor_dir().display()
            );
            fallback(trust, cert, warning, report)
        }
        (
            SelfSignedVerdict::NotSelfSigned { subject, issuer },
            ValidationOutcome::MissingTrustAnchor,
        ) => {
            log::debug!("certificate with missing trust anchor");
            let warning = format!(
                "Warning: could not validate the host certificate with the subject:\n\n  {}\n\n\
                 Will use known_hosts file as a fall-back measure. You should consider\n\
                 adding the trusted anchor certificate with the subject:\n\n  {}\n\n\
                 into the directory of trusted anchors ({}).",
                subject,
                issuer,
                trust.validation.anchor_dir().display()
            );
            fallback(trust, cert, warning, report)
        }
        (SelfSignedVerdict::SelfSigned { subject, .. }, ValidationOutcome::MissingTrustAnchor) => {
            report.error(format!(
                "Self-signed host certificate {} reported as lacking a trust anchor.",
                subject
            ));
            CertificateVerdict::Reject(RejectReason::InconsistentValidation)
        }
        (_, ValidationOutcome::ValidationError) | (SelfSignedVerdict::Corrupted, _) => {
            report.error("Host certificate validation failed.".into());
            CertificateVerdict::Reject(RejectReason::CertificateInvalid)
        }
    }
}

fn fallback(
    trust: &HostTrust<'_>,
    cert: &[u8],
    warning: String,
    report: &mut HostTrustReport,
) -> CertificateVerdict {
    match trust.parser.public_key(cert) {
        Some(key) => CertificateVerdict::UseLedger(key, warning),
        None => {
            report.error("Could not convert the certificate into a plain public key.".into());
            CertificateVerdict::Reject(RejectReason::KeyConversion)
        }
    }
}
