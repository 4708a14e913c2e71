use crate::credential::PublicKey;
use crate::ledger::LedgerError;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrustDecision {
    /// Accepted on certificate grounds (or by the loopback rule) without consulting a ledger.
    Accept,
    /// Accepted because the ledger knows or now records this key.
    AcceptViaLedger(PublicKey),
    Reject(RejectReason),
}

impl TrustDecision {
    pub fn is_accept(&self) -> bool {
        !matches!(self, Self::Reject(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    CorruptedCertificate,
    CertificateInvalid,
    /// The certificate validated but names another host.
    NameMismatch {
        host: String,
        mapped: Option<String>,
    },
    /// The certificate's public key has no plain key representation.
    KeyConversion,
    /// The validator reported a missing anchor for a self-signed certificate.
    InconsistentValidation,
    UnknownHostStrict,
    NotConfirmed,
    KeyChanged {
        file: PathBuf,
        line: usize,
    },
    /// The host entry is fine but the key recorded for the IP address differs.
    IpKeyChanged {
        file: PathBuf,
        line: usize,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptedCertificate => write!(f, "corrupted host certificate"),
            Self::CertificateInvalid => write!(f, "host certificate failed validation"),
            Self::NameMismatch { host, mapped } => write!(
                f,
                "certificate is for {} instead of {}",
                mapped.as_deref().unwrap_or("<no name>"),
                host
            ),
            Self::KeyConversion => write!(f, "certificate key cannot be used with known_hosts"),
            Self::InconsistentValidation => {
                write!(f, "self-signed certificate reported without trust anchor")
            }
            Self::UnknownHostStrict => write!(f, "no known host key and strict checking requested"),
            Self::NotConfirmed => write!(f, "host key not confirmed"),
            Self::KeyChanged { file, line } => {
                write!(f, "host key changed (offending key in {}:{})", file.display(), line)
            }
            Self::IpKeyChanged { file, line } => write!(
                f,
                "host key for the IP address changed (offending key in {}:{})",
                file.display(),
                line
            ),
        }
    }
}

/// Features a connection must not use after its host key was found to have changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Restrictions {
    pub disable_password_auth: bool,
    pub disable_agent_forwarding: bool,
    pub disable_x11_forwarding: bool,
    pub disable_port_forwarding: bool,
}

impl Restrictions {
    pub fn all() -> Self {
        Self {
            disable_password_auth: true,
            disable_agent_forwarding: true,
            disable_x11_forwarding: true,
            disable_port_forwarding: true,
        }
    }

    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

/// The outcome of a host trust decision together with everything the caller must show the
/// user or enforce on the connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostTrustReport {
    pub decision: TrustDecision,
    /// Messages for the user, in the order they arose.
    pub warnings: Vec<String>,
    pub restrictions: Restrictions,
    /// Host name and IP address entries disagree.
    pub dns_spoofing_suspected: bool,
}

impl HostTrustReport {
    pub(crate) fn new() -> Self {
        Self {
            decision: TrustDecision::Reject(RejectReason::NotConfirmed),
            warnings: vec![],
            restrictions: Restrictions::default(),
            dns_spoofing_suspected: false,
        }
    }

    pub(crate) fn warn(&mut self, msg: String) {
        log::warn!("{}", msg);
        self.warnings.push(msg);
    }

    pub(crate) fn error(&mut self, msg: String) {
        log::error!("{}", msg);
        self.warnings.push(msg);
    }
}

/// Infrastructure failures, as opposed to trust failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    Ledger(LedgerError),
}

impl From<LedgerError> for TrustError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl std::error::Error for TrustError {}

impl std::fmt::Display for TrustError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger(e) => write!(f, "host key ledger: {}", e),
        }
    }
}
