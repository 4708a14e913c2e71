use sshtrust::credential::*;
use sshtrust::host::*;
use sshtrust::ledger::*;
use sshtrust::util::BoxFuture;
use sshtrust::x509::*;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Mutex;

const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));
const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[derive(Debug)]
struct PrompterForTesting {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl PrompterForTesting {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(vec![]),
        }
    }

    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for PrompterForTesting {
    fn confirm(&self, message: &str) -> BoxFuture<bool> {
        self.asked.lock().unwrap().push(message.into());
        let answer = self.answer;
        Box::pin(async move { answer })
    }
}

/// Delegates to [X509Parser] but never finds a trust anchor.
struct AnchorlessParserForTesting;

impl CertificateParser for AnchorlessParserForTesting {
    fn is_certificate(&self, bytes: &[u8]) -> bool {
        X509Parser.is_certificate(bytes)
    }

    fn certificates(&self, bytes: &[u8]) -> Vec<Vec<u8>> {
        X509Parser.certificates(bytes)
    }

    fn subject(&self, cert: &[u8]) -> Option<DistinguishedName> {
        X509Parser.subject(cert)
    }

    fn issuer(&self, cert: &[u8]) -> Option<DistinguishedName> {
        X509Parser.issuer(cert)
    }

    fn public_key_algorithm(&self, cert: &[u8]) -> PublicKeyAlgorithm {
        X509Parser.public_key_algorithm(cert)
    }

    fn public_key(&self, cert: &[u8]) -> Option<PublicKey> {
        X509Parser.public_key(cert)
    }

    fn match_name(&self, cert: &[u8], candidate: &str) -> NameMatch {
        X509Parser.match_name(cert, candidate)
    }

    fn check_chain(&self, _: &[u8], _: &[Vec<u8>], _: &ValidationPolicy) -> ChainCheck {
        ChainCheck {
            missing_anchor: true,
            ..Default::default()
        }
    }
}

/// Counts every access and knows no hosts.
#[derive(Default)]
struct LedgerForTesting {
    calls: Mutex<usize>,
}

impl LedgerForTesting {
    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn count(&self) {
        *self.calls.lock().unwrap() += 1;
    }
}

impl HostKeyLedger for LedgerForTesting {
    fn lookup(
        &self,
        _: &Path,
        _: &str,
        _: &PublicKey,
    ) -> BoxFuture<Result<HostStatus, LedgerError>> {
        self.count();
        Box::pin(async { Ok(HostStatus::New) })
    }

    fn lookup_by_type(
        &self,
        _: &Path,
        _: &str,
        _: KeyType,
    ) -> BoxFuture<Result<Option<(PublicKey, usize)>, LedgerError>> {
        self.count();
        Box::pin(async { Ok(None) })
    }

    fn insert(
        &self,
        _: &Path,
        _: &[&str],
        _: &PublicKey,
        _: bool,
    ) -> BoxFuture<Result<(), LedgerError>> {
        self.count();
        Box::pin(async { Ok(()) })
    }

    fn exists(&self, _: &Path) -> BoxFuture<bool> {
        self.count();
        Box::pin(async { false })
    }
}

struct Env {
    dir: tempfile::TempDir,
    config: HostTrustConfig,
    validation: ValidationContext,
}

impl Env {
    fn new(strict: StrictHostKeyChecking) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = HostTrustConfig {
            strict_host_key_checking: strict,
            user_hostfile: dir.path().join("known_hosts"),
            system_hostfile: dir.path().join("ssh_known_hosts"),
            user_hostfile2: dir.path().join("known_hosts2"),
            system_hostfile2: dir.path().join("ssh_known_hosts2"),
            trusted_anchor_dir: "tests/data/anchors".into(),
            ..Default::default()
        };
        let validation =
            ValidationContext::new(ValidationPolicy::default(), "tests/data/anchors".into());
        Self {
            dir,
            config,
            validation,
        }
    }

    fn trust<'a>(&'a self, prompter: &'a dyn Prompter) -> HostTrust<'a> {
        HostTrust {
            config: &self.config,
            validation: &self.validation,
            parser: &X509Parser,
            ledger: &KnownHostsFiles,
            prompter,
        }
    }

    fn known_hosts(&self) -> Option<String> {
        std::fs::read_to_string(&self.config.user_hostfile).ok()
    }
}

fn pubkey(name: &str) -> PublicKey {
    let line = std::fs::read_to_string(format!("tests/data/{}.pub", name)).unwrap();
    PublicKey::parse_fields(&mut line.split_whitespace()).unwrap()
}

fn plain(name: &str) -> Credential {
    Credential::from_public_key(pubkey(name))
}

fn cert(name: &str) -> Credential {
    let der = std::fs::read(format!("tests/data/{}.der", name)).unwrap();
    Credential::from_peer(KeyType::X509Rsa, &der).unwrap()
}

fn write(path: &Path, entries: &[(&str, &PublicKey)]) {
    let text: String = entries
        .iter()
        .map(|(names, key)| format!("{} {}\n", names, key.to_line()))
        .collect();
    std::fs::write(path, text).unwrap();
}

#[tokio::test]
async fn test_certificate_validated_01() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    for host in ["host.example.com", "Alias.Example.com"] {
        let r = host_trust_decision(&trust, host, ADDR, &cert("host")).await;
        let r = r.unwrap();
        assert_eq!(r.decision, TrustDecision::Accept);
        assert!(!r.restrictions.any());
    }
    assert!(prompter.asked().is_empty());
    assert_eq!(env.known_hosts(), None);
}

#[tokio::test]
async fn test_certificate_name_mismatch() {
    let env = Env::new(StrictHostKeyChecking::Disabled);
    // A ledger entry for the other name must not rescue the mismatch.
    write(&env.config.user_hostfile, &[("other.example.com", &pubkey("host"))]);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "other.example.com", ADDR, &cert("host")).await;
    assert_eq!(
        r.unwrap().decision,
        TrustDecision::Reject(RejectReason::NameMismatch {
            host: "other.example.com".into(),
            mapped: Some("host.example.com".into()),
        })
    );
}

#[tokio::test]
async fn test_certificate_invalid() {
    let env = Env::new(StrictHostKeyChecking::Disabled);
    write(&env.config.user_hostfile, &[("host.example.com", &pubkey("host"))]);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    for name in ["host-expired", "host-badsig"] {
        let r = host_trust_decision(&trust, "host.example.com", ADDR, &cert(name)).await;
        assert_eq!(
            r.unwrap().decision,
            TrustDecision::Reject(RejectReason::CertificateInvalid),
            "{}",
            name
        );
    }
}

#[tokio::test]
async fn test_certificate_corrupted() {
    let env = Env::new(StrictHostKeyChecking::Disabled);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &cert("garbage")).await;
    let r = r.unwrap();
    assert_eq!(
        r.decision,
        TrustDecision::Reject(RejectReason::CorruptedCertificate)
    );
    assert!(r.warnings.iter().any(|w| w.contains("Corrupted")));
    assert_eq!(env.known_hosts(), None);
}

/// Self-signed certificate, unknown host, confirmed interactively.
#[tokio::test]
async fn test_self_signed_confirmed() {
    let env = Env::new(StrictHostKeyChecking::InteractiveConfirm);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let key = X509Parser
        .public_key(&std::fs::read("tests/data/host-selfsigned.der").unwrap())
        .unwrap();
    let r = host_trust_decision(&trust, "self.example.com", ADDR, &cert("host-selfsigned")).await;
    let r = r.unwrap();
    assert_eq!(r.decision, TrustDecision::AcceptViaLedger(key.clone()));
    assert!(r.warnings[0].contains("self-signed"));
    assert!(r
        .warnings
        .iter()
        .any(|w| w.contains("Permanently added 'self.example.com,192.0.2.10'")));
    let asked = prompter.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("can't be established."));
    assert!(asked[0].contains(&key.fingerprint()));
    let text = env.known_hosts().unwrap();
    assert!(text.starts_with("self.example.com,192.0.2.10 ssh-rsa "));

    // Known now: no further questions.
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "self.example.com", ADDR, &cert("host-selfsigned")).await;
    assert_eq!(r.unwrap().decision, TrustDecision::AcceptViaLedger(key));
    assert!(prompter.asked().is_empty());
    assert_eq!(env.known_hosts().unwrap(), text);
}

/// Certificate from an issuer without a configured anchor, key already in the ledger.
/// A self-signed certificate validates against itself, so a missing anchor is contradictory.
#[tokio::test]
async fn test_self_signed_missing_anchor() {
    let env = Env::new(StrictHostKeyChecking::Disabled);
    let prompter = PrompterForTesting::new(true);
    let ledger = LedgerForTesting::default();
    let trust = HostTrust {
        config: &env.config,
        validation: &env.validation,
        parser: &AnchorlessParserForTesting,
        ledger: &ledger,
        prompter: &prompter,
    };
    let r = host_trust_decision(&trust, "self.example.com", ADDR, &cert("host-selfsigned")).await;
    let r = r.unwrap();
    assert_eq!(
        r.decision,
        TrustDecision::Reject(RejectReason::InconsistentValidation)
    );
    assert_eq!(ledger.calls(), 0);
    assert!(prompter.asked().is_empty());

    // The same parser sends a CA-issued certificate to the ledgers.
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &cert("host")).await;
    assert!(r.unwrap().decision.is_accept());
    assert!(ledger.calls() > 0);
}

#[tokio::test]
async fn test_missing_anchor_known_host() {
    let env = Env::new(StrictHostKeyChecking::InteractiveConfirm);
    write(
        &env.config.user_hostfile,
        &[("host.example.com,192.0.2.10", &pubkey("host"))],
    );
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &cert("host-untrusted")).await;
    let r = r.unwrap();
    assert_eq!(r.decision, TrustDecision::AcceptViaLedger(pubkey("host")));
    assert!(r.warnings[0].contains("could not validate"));
    assert!(r.warnings[0].contains("trusted anchor"));
    assert!(r.warnings[0].contains("Other Root CA"));
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn test_missing_anchor_strict_unknown() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &cert("host-untrusted")).await;
    assert_eq!(
        r.unwrap().decision,
        TrustDecision::Reject(RejectReason::UnknownHostStrict)
    );
}

/// Plain key that differs from the recorded one, no strict checking.
#[tokio::test]
async fn test_changed_key_disabled() {
    let mut env = Env::new(StrictHostKeyChecking::Disabled);
    env.config.check_host_ip = false;
    write(&env.config.user_hostfile, &[("host.example.com", &pubkey("user"))]);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert_eq!(r.decision, TrustDecision::AcceptViaLedger(pubkey("host")));
    assert_eq!(r.restrictions, Restrictions::all());
    assert!(r
        .warnings
        .iter()
        .any(|w| w.contains("REMOTE HOST IDENTIFICATION HAS CHANGED")));
    assert!(!r.dns_spoofing_suspected);
    // The ledger is left alone.
    assert_eq!(env.known_hosts().unwrap().lines().count(), 1);
}

#[tokio::test]
async fn test_changed_key_strict() {
    let mut env = Env::new(StrictHostKeyChecking::StrictReject);
    env.config.check_host_ip = false;
    write(&env.config.user_hostfile, &[("host.example.com", &pubkey("user"))]);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert_eq!(
        r.decision,
        TrustDecision::Reject(RejectReason::KeyChanged {
            file: env.config.user_hostfile.clone(),
            line: 1
        })
    );
    assert!(!r.restrictions.any());
}

#[tokio::test]
async fn test_changed_key_interactive() {
    let mut env = Env::new(StrictHostKeyChecking::InteractiveConfirm);
    env.config.check_host_ip = false;
    write(&env.config.user_hostfile, &[("host.example.com", &pubkey("user"))]);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert_eq!(
        r.decision,
        TrustDecision::Reject(RejectReason::KeyChanged {
            file: env.config.user_hostfile.clone(),
            line: 1
        })
    );
    assert!(r
        .warnings
        .iter()
        .any(|w| w.contains("you have requested strict checking")));
    // A changed key is never offered for confirmation.
    assert!(prompter.asked().is_empty());
    assert_eq!(env.known_hosts().unwrap().lines().count(), 1);
}

#[tokio::test]
async fn test_changed_key_dns_spoofing() {
    let env = Env::new(StrictHostKeyChecking::Disabled);
    write(&env.config.user_hostfile, &[("host.example.com", &pubkey("user"))]);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert!(r.decision.is_accept());
    assert!(r.dns_spoofing_suspected);
    assert!(r.warnings.iter().any(|w| w.contains("POSSIBLE DNS SPOOFING")));
}

#[tokio::test]
async fn test_strict_unknown_does_not_write() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    for _ in 0..2 {
        let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
        assert_eq!(
            r.unwrap().decision,
            TrustDecision::Reject(RejectReason::UnknownHostStrict)
        );
    }
    assert!(prompter.asked().is_empty());
    assert_eq!(env.known_hosts(), None);
}

#[tokio::test]
async fn test_interactive_declined() {
    let env = Env::new(StrictHostKeyChecking::InteractiveConfirm);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    assert_eq!(
        r.unwrap().decision,
        TrustDecision::Reject(RejectReason::NotConfirmed)
    );
    assert_eq!(prompter.asked().len(), 1);
    assert_eq!(env.known_hosts(), None);
}

#[tokio::test]
async fn test_interactive_other_key_types() {
    let env = Env::new(StrictHostKeyChecking::InteractiveConfirm);
    let dss = X509Parser
        .public_key(&std::fs::read("tests/data/host-dss.der").unwrap())
        .unwrap();
    assert_eq!(dss.key_type(), KeyType::Dsa);
    write(&env.config.system_hostfile, &[("host.example.com", &dss)]);
    let prompter = PrompterForTesting::new(true);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert!(r.decision.is_accept());
    assert!(r.warnings.iter().any(|w| w.contains("WARNING: ssh-dss key found")));
    assert!(prompter.asked()[0].contains("keys of different type"));
}

#[tokio::test]
async fn test_ip_key_differs() {
    let env = Env::new(StrictHostKeyChecking::InteractiveConfirm);
    write(
        &env.config.user_hostfile,
        &[
            ("host.example.com", &pubkey("host")),
            ("192.0.2.10", &pubkey("user")),
        ],
    );
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert_eq!(
        r.decision,
        TrustDecision::Reject(RejectReason::IpKeyChanged {
            file: env.config.user_hostfile.clone(),
            line: 2
        })
    );
    assert!(r.dns_spoofing_suspected);
    let asked = prompter.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("differs from the key for the IP address"));
    assert!(asked[0].contains("Matching host key in"));
}

#[tokio::test]
async fn test_hashed_entries() {
    let mut env = Env::new(StrictHostKeyChecking::Disabled);
    env.config.hash_known_hosts = true;
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    assert!(r.unwrap().decision.is_accept());
    let text = env.known_hosts().unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|l| l.starts_with("|1|")));
    assert!(!text.contains("host.example.com"));

    let mut env2 = Env::new(StrictHostKeyChecking::StrictReject);
    env2.config.user_hostfile = env.config.user_hostfile.clone();
    let trust = env2.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    assert_eq!(r.unwrap().decision, TrustDecision::AcceptViaLedger(pubkey("host")));
}

#[tokio::test]
async fn test_system_file_fallback() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    write(
        &env.config.system_hostfile,
        &[("*.example.com,192.0.2.*", &pubkey("host"))],
    );
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    assert_eq!(r.unwrap().decision, TrustDecision::AcceptViaLedger(pubkey("host")));
    assert_eq!(env.known_hosts(), None);
}

#[tokio::test]
async fn test_legacy_ledger() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    write(&env.config.user_hostfile2, &[("host.example.com", &pubkey("host"))]);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "HOST.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert_eq!(r.decision, TrustDecision::AcceptViaLedger(pubkey("host")));
    // Missing IP entry is not recorded from the read-only pass.
    assert!(r.warnings.iter().any(|w| w.contains("not in list of known hosts")));
    assert_eq!(env.known_hosts(), None);
}

#[tokio::test]
async fn test_loopback_01() {
    let mut env = Env::new(StrictHostKeyChecking::StrictReject);
    env.config.no_host_authentication_for_localhost = true;
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "localhost", LOOPBACK, &plain("host")).await;
    assert_eq!(r.unwrap().decision, TrustDecision::Accept);

    env.config.host_key_alias = Some("alias".into());
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "localhost", LOOPBACK, &plain("host")).await;
    assert_eq!(
        r.unwrap().decision,
        TrustDecision::Reject(RejectReason::UnknownHostStrict)
    );
}

#[tokio::test]
async fn test_host_key_alias() {
    let mut env = Env::new(StrictHostKeyChecking::StrictReject);
    env.config.host_key_alias = Some("tunnel".into());
    env.config.check_host_ip = false;
    write(&env.config.user_hostfile, &[("tunnel", &pubkey("host"))]);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "localhost", LOOPBACK, &plain("host")).await;
    assert_eq!(r.unwrap().decision, TrustDecision::AcceptViaLedger(pubkey("host")));
}

#[tokio::test]
async fn test_ledger_unreadable() {
    let mut env = Env::new(StrictHostKeyChecking::Disabled);
    env.config.user_hostfile = env.dir.path().to_path_buf();
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = host_trust_decision(&trust, "host.example.com", ADDR, &plain("host")).await;
    match r {
        Err(TrustError::Ledger(LedgerError::Io(..))) => (),
        r => panic!("{:?}", r),
    }
}

#[tokio::test]
async fn test_accept_host_key_01() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = accept_host_key(&trust, "host.example.com", ADDR, &cert("host-untrusted")).await;
    let r = r.unwrap();
    assert_eq!(r.decision, TrustDecision::AcceptViaLedger(pubkey("host")));
    assert!(prompter.asked().is_empty());
    let text = env.known_hosts().unwrap();
    assert!(text.starts_with("host.example.com,192.0.2.10 ssh-rsa "));
}

#[tokio::test]
async fn test_accept_host_key_changed() {
    let env = Env::new(StrictHostKeyChecking::StrictReject);
    write(&env.config.user_hostfile, &[("host.example.com", &pubkey("user"))]);
    let prompter = PrompterForTesting::new(false);
    let trust = env.trust(&prompter);
    let r = accept_host_key(&trust, "host.example.com", ADDR, &plain("host")).await;
    let r = r.unwrap();
    assert_eq!(r.decision, TrustDecision::AcceptViaLedger(pubkey("host")));
    assert!(!r.restrictions.any());
    assert!(r.warnings.iter().any(|w| w.contains("please update")));
    assert!(prompter.asked().is_empty());
}
