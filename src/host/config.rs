use crate::token::SessionPolicy;
use std::path::PathBuf;

/// How to treat host keys that are unknown or differ from the recorded ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrictHostKeyChecking {
    /// Record unknown keys without asking.
    Disabled,
    /// Ask before recording an unknown key.
    InteractiveConfirm,
    /// Never record keys automatically.
    StrictReject,
}

impl Default for StrictHostKeyChecking {
    fn default() -> Self {
        Self::InteractiveConfirm
    }
}

/// Host trust configuration.
///
/// The default instance uses the traditional ledger locations under `/etc/ssh` and `~/.ssh`.
#[derive(Clone, Debug)]
pub struct HostTrustConfig {
    pub strict_host_key_checking: StrictHostKeyChecking,
    /// Additionally track the server's IP address in the ledger.
    pub check_host_ip: bool,
    /// Store newly added names hashed.
    pub hash_known_hosts: bool,
    /// Accept any key for loopback addresses unless `host_key_alias` is set.
    pub no_host_authentication_for_localhost: bool,
    /// Record and look up keys under this name instead of the host name.
    pub host_key_alias: Option<String>,
    /// The connection runs through a proxy command; the peer address is meaningless.
    pub proxy_command: bool,
    pub user_hostfile: PathBuf,
    pub system_hostfile: PathBuf,
    /// Legacy ledgers; only read, never written.
    pub user_hostfile2: PathBuf,
    pub system_hostfile2: PathBuf,
    /// Anchors for validating host certificates.
    pub trusted_anchor_dir: PathBuf,
}

impl HostTrustConfig {
    /// Policy for initialising the validation context host certificates are checked against.
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            anchor_dir: Some(self.trusted_anchor_dir.clone()),
            ..Default::default()
        }
    }
}

impl Default for HostTrustConfig {
    #[allow(deprecated)]
    fn default() -> Self {
        let home = std::env::home_dir().unwrap_or_default().join(".ssh");
        Self {
            strict_host_key_checking: StrictHostKeyChecking::default(),
            check_host_ip: true,
            hash_known_hosts: false,
            no_host_authentication_for_localhost: false,
            host_key_alias: None,
            proxy_command: false,
            user_hostfile: home.join("known_hosts"),
            system_hostfile: PathBuf::from("/etc/ssh/ssh_known_hosts"),
            user_hostfile2: home.join("known_hosts2"),
            system_hostfile2: PathBuf::from("/etc/ssh/ssh_known_hosts2"),
            trusted_anchor_dir: PathBuf::from(crate::x509::ValidationContext::DEFAULT_ANCHOR_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_01() {
        let c = HostTrustConfig::default();
        assert_eq!(c.strict_host_key_checking, StrictHostKeyChecking::InteractiveConfirm);
        assert!(c.check_host_ip);
        assert!(c.user_hostfile.ends_with(".ssh/known_hosts"));
        assert!(c.user_hostfile2.ends_with(".ssh/known_hosts2"));
        assert_eq!(c.system_hostfile, PathBuf::from("/etc/ssh/ssh_known_hosts"));
        assert_eq!(c.trusted_anchor_dir, PathBuf::from("/etc/ssh/trusted_anchors"));
        assert_eq!(c.session_policy().anchor_dir, Some(c.trusted_anchor_dir));
    }

    #[tokio::test]
    async fn test_session_policy_01() {
        let c = HostTrustConfig {
            trusted_anchor_dir: "tests/data/anchors".into(),
            ..Default::default()
        };
        let v = crate::x509::ValidationContext::init(&c.session_policy()).await.unwrap();
        assert_eq!(v.anchor_dir(), std::path::Path::new("tests/data/anchors"));
    }
}
