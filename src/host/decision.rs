use super::certificate::*;
use super::known_hosts::*;
use super::*;
use crate::credential::{Credential, PublicKey};
use crate::ledger::HostKeyLedger;
use crate::x509::{CertificateParser, ValidationContext};
use std::net::IpAddr;

/// The collaborators a host trust decision needs.
#[derive(Clone, Copy)]
pub struct HostTrust<'a> {
    pub config: &'a HostTrustConfig,
    pub validation: &'a ValidationContext,
    pub parser: &'a dyn CertificateParser,
    pub ledger: &'a dyn HostKeyLedger,
    pub prompter: &'a dyn Prompter,
}

/// Decide whether to trust the key a server presented during connection setup.
///
/// `host` is the name the user connected to and `addr` the address the connection went to.
/// Trust failures are reported as [TrustDecision::Reject]; errors are reserved for ledger
/// infrastructure failures.
pub async fn host_trust_decision(
    trust: &HostTrust<'_>,
    host: &str,
    addr: IpAddr,
    key: &Credential,
) -> Result<HostTrustReport, TrustError> {
    let host = host.to_ascii_lowercase();
    let mut report = HostTrustReport::new();
    let key = match key {
        Credential::X509Rsa(x) | Credential::X509Dss(x) => {
            let cert = x.certificate().as_ref();
            match check_certificate(trust, &host, cert, &mut report).await {
                CertificateVerdict::Accept => {
                    report.decision = TrustDecision::Accept;
                    return Ok(report);
                }
                CertificateVerdict::Reject(reason) => {
                    report.decision = TrustDecision::Reject(reason);
                    return Ok(report);
                }
                CertificateVerdict::UseLedger(key, warning) => {
                    report.warn(warning);
                    key
                }
            }
        }
        Credential::Legacy1(k) => PublicKey::Rsa1(k.clone()),
        Credential::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
        Credential::Dsa { public, .. } => PublicKey::Dsa(public.clone()),
    };
    check_ledgers(trust, &host, addr, &key, false, &mut report).await?;
    Ok(report)
}

/// Record a key the caller already trusts through some other channel.
///
/// Unknown keys are added without asking and changed keys only produce a notice.
pub async fn accept_host_key(
    trust: &HostTrust<'_>,
    host: &str,
    addr: IpAddr,
    key: &Credential,
) -> Result<HostTrustReport, TrustError> {
    let host = host.to_ascii_lowercase();
    let mut report = HostTrustReport::new();
    let key = match key {
        Credential::X509Rsa(x) | Credential::X509Dss(x) => {
            match trust.parser.public_key(x.certificate().as_ref()) {
                Some(key) => key,
                None => {
                    report.decision = TrustDecision::Reject(RejectReason::KeyConversion);
                    return Ok(report);
                }
            }
        }
        Credential::Legacy1(k) => PublicKey::Rsa1(k.clone()),
        Credential::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
        Credential::Dsa { public, .. } => PublicKey::Dsa(public.clone()),
    };
    check_ledgers(trust, &host, addr, &key, true, &mut report).await?;
    Ok(report)
}

/// Consult the legacy ledgers (read-only, only if present) and then the current ones.
async fn check_ledgers(
    trust: &HostTrust<'_>,
    host: &str,
    addr: IpAddr,
    key: &PublicKey,
    validated: bool,
    report: &mut HostTrustReport,
) -> Result<(), TrustError> {
    let c = trust.config;
    let mut check = HostKeyCheck {
        trust,
        host,
        addr,
        key,
        validated,
        readonly: true,
        user_file: &c.user_hostfile2,
        system_file: &c.system_hostfile2,
    };
    let legacy = trust.ledger.exists(&c.system_hostfile2).await
        || trust.ledger.exists(&c.user_hostfile2).await;
    if legacy {
        match check.run(report).await? {
            Checked::Unknown | Checked::Failed(_) => (),
            checked => {
                report.decision = checked.into_decision(key);
                return Ok(());
            }
        }
    }
    check.readonly = false;
    check.user_file = c.user_hostfile.as_path();
    check.system_file = c.system_hostfile.as_path();
    report.decision = check.run(report).await?.into_decision(key);
    Ok(())
}
