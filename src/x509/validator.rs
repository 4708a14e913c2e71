use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Validated,
    ValidationError,
    MissingTrustAnchor,
}

impl ValidationContext {
    /// Validate a certificate against the trust anchors and policy of this context.
    ///
    /// Only a failure caused solely by the absence of a matching anchor yields
    /// [ValidationOutcome::MissingTrustAnchor]. Signature and validity failures are logged
    /// individually and reported as [ValidationOutcome::ValidationError].
    pub async fn validate(
        &self,
        cert: &[u8],
        parser: &dyn CertificateParser,
    ) -> ValidationOutcome {
        let anchors = self.anchors(parser).await;
        let r = parser.check_chain(cert, anchors, self.policy());
        if r.malformed {
            log::error!("certificate validation: malformed certificate");
        }
        if r.bad_signature {
            log::error!("certificate validation: signature invalid");
        }
        if r.bad_time {
            log::error!("certificate validation: validity time window invalid");
        }
        if r.malformed || r.bad_signature || r.bad_time {
            ValidationOutcome::ValidationError
        } else if r.missing_anchor {
            log::debug!(
                "certificate validation: no trust anchor in {:?}",
                self.anchor_dir()
            );
            ValidationOutcome::MissingTrustAnchor
        } else {
            ValidationOutcome::Validated
        }
    }
}
