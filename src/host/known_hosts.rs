use super::*;
use crate::credential::{KeyType, PublicKey};
use crate::ledger::HostStatus;
use std::net::IpAddr;
use std::path::Path;

pub(super) enum Checked {
    /// Loopback address with host authentication disabled for localhost.
    Loopback,
    Accepted,
    /// Read-only pass found no entry.
    Unknown,
    Failed(RejectReason),
}

impl Checked {
    pub fn into_decision(self, key: &PublicKey) -> TrustDecision {
        match self {
            Self::Loopback => TrustDecision::Accept,
            Self::Accepted => TrustDecision::AcceptViaLedger(key.clone()),
            Self::Unknown => TrustDecision::Reject(RejectReason::UnknownHostStrict),
            Self::Failed(reason) => TrustDecision::Reject(reason),
        }
    }
}

/// One pass over a pair of user and system ledger files.
pub(super) struct HostKeyCheck<'a> {
    pub trust: &'a HostTrust<'a>,
    pub host: &'a str,
    pub addr: IpAddr,
    pub key: &'a PublicKey,
    /// The caller already trusts the key: never prompt, never restrict.
    pub validated: bool,
    /// Never write to the ledger.
    pub readonly: bool,
    pub user_file: &'a Path,
    pub system_file: &'a Path,
}

impl<'a> HostKeyCheck<'a> {
    pub async fn run(&self, report: &mut HostTrustReport) -> Result<Checked, TrustError> {
        let c = self.trust.config;
        let local = self.addr.is_loopback();
        if c.no_host_authentication_for_localhost && local && c.host_key_alias.is_none() {
            log::debug!("Forcing accepting of host key for loopback/localhost.");
            return Ok(Checked::Loopback);
        }
        let ip = if c.proxy_command {
            String::from("<no hostip for proxy command>")
        } else {
            self.addr.to_string()
        };
        let ip = ip.as_str();
        let check_ip = c.check_host_ip && !local && self.host != ip && !c.proxy_command;
        let host = match &c.host_key_alias {
            Some(alias) => {
                log::debug!("using host key alias: {}", alias);
                alias.as_str()
            }
            None => self.host,
        };
        let key_type = self.key.key_type();
        let fp = self.key.fingerprint();

        let (host_file, host_status) = self.lookup(host).await?;
        let (ip_file, ip_status) = if check_ip {
            self.lookup(ip).await?
        } else {
            (host_file, host_status.clone())
        };
        let host_ip_differ = check_ip
            && match (&host_status, &ip_status) {
                (HostStatus::Changed { existing: a, .. }, HostStatus::Changed { existing: b, .. }) => {
                    a != b
                }
                (HostStatus::Changed { .. }, _) => true,
                _ => false,
            };

        match &host_status {
            HostStatus::Ok { line } => {
                log::debug!("Host '{}' is known and matches the {} host key.", host, key_type);
                log::debug!("Found key in {}:{}", host_file.display(), line);
                if check_ip && ip_status == HostStatus::New {
                    if self.readonly {
                        report.warn(format!(
                            "{} host key for IP address '{}' not in list of known hosts.",
                            key_type, ip
                        ));
                    } else if self.add(&[ip]).await {
                        report.warn(format!(
                            "Warning: Permanently added the {} host key for IP address '{}' \
                             to the list of known hosts.",
                            key_type, ip
                        ));
                    } else {
                        report.warn(format!(
                            "Failed to add the {} host key for IP address '{}' to the list of \
                             known hosts ({}).",
                            key_type,
                            ip,
                            self.user_file.display()
                        ));
                    }
                }
            }
            HostStatus::New => {
                if self.readonly {
                    return Ok(Checked::Unknown);
                }
                let strict = c.strict_host_key_checking;
                if !self.validated && strict == StrictHostKeyChecking::StrictReject {
                    report.error(format!(
                        "No {} host key is known for {} and you have requested strict checking.",
                        key_type, host
                    ));
                    return Ok(Checked::Failed(RejectReason::UnknownHostStrict));
                }
                if !self.validated && strict == StrictHostKeyChecking::InteractiveConfirm {
                    let has_keys = self.show_other_keys(host, report).await?;
                    let msg = format!(
                        "The authenticity of host '{} ({})' can't be established{}\n\
                         {} key fingerprint is {}.\n\
                         Are you sure you want to continue connecting (yes/no)? ",
                        host,
                        ip,
                        if has_keys {
                            ",\nbut keys of different type are already known for this host."
                        } else {
                            "."
                        },
                        key_type,
                        fp
                    );
                    if !self.trust.prompter.confirm(&msg).await {
                        return Ok(Checked::Failed(RejectReason::NotConfirmed));
                    }
                }
                let (added, hostp) = if check_ip && ip_status == HostStatus::New {
                    let added = if c.hash_known_hosts {
                        self.add(&[host]).await && self.add(&[ip]).await
                    } else {
                        self.add(&[host, ip]).await
                    };
                    (added, format!("{},{}", host, ip))
                } else {
                    (self.add(&[host]).await, host.to_string())
                };
                if added {
                    report.warn(format!(
                        "Warning: Permanently added '{}' ({}) to the list of known hosts.",
                        hostp, key_type
                    ));
                } else {
                    report.warn(format!(
                        "Failed to add the host to the list of known hosts ({}).",
                        self.user_file.display()
                    ));
                }
            }
            HostStatus::Changed { line, .. } => {
                if self.validated {
                    report.warn(format!(
                        "Warning: The host key for host {} has changed; please update your \
                         known hosts file(s) ({}:{})",
                        host,
                        host_file.display(),
                        line
                    ));
                    if host_ip_differ {
                        report.warn(format!(
                            "Warning: The host key for host {} has changed; please update \
                             your known hosts file(s) ({}:{})",
                            ip,
                            host_file.display(),
                            line
                        ));
                    }
                    return Ok(Checked::Accepted);
                }
                if host_ip_differ {
                    let what = match ip_status {
                        HostStatus::New => "is unknown",
                        HostStatus::Ok { .. } => "is unchanged",
                        HostStatus::Changed { .. } => "has a different value",
                    };
                    report.dns_spoofing_suspected = true;
                    report.error(format!(
                        "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
                         @       WARNING: POSSIBLE DNS SPOOFING DETECTED!          @\n\
                         @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
                         The {} host key for {} has changed,\n\
                         and the key for the according IP address {}\n\
                         {}. This could either mean that\n\
                         DNS SPOOFING is happening or the IP address for the host\n\
                         and its host key have changed at the same time.",
                        key_type, host, ip, what
                    ));
                    if let Some(ip_line) = line_of(&ip_status) {
                        report.error(format!(
                            "Offending key for IP in {}:{}",
                            ip_file.display(),
                            ip_line
                        ));
                    }
                }
                report.error(format!(
                    "@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
                     @    WARNING: REMOTE HOST IDENTIFICATION HAS CHANGED!     @\n\
                     @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
                     IT IS POSSIBLE THAT SOMEONE IS DOING SOMETHING NASTY!\n\
                     Someone could be eavesdropping on you right now (man-in-the-middle attack)!\n\
                     It is also possible that the {} host key has just been changed.\n\
                     The fingerprint for the {} key sent by the remote host is\n{}.\n\
                     Please contact your system administrator.\n\
                     Add correct host key in {} to get rid of this message.\n\
                     Offending key in {}:{}",
                    key_type,
                    key_type,
                    fp,
                    self.user_file.display(),
                    host_file.display(),
                    line
                ));
                if c.strict_host_key_checking != StrictHostKeyChecking::Disabled {
                    report.error(format!(
                        "{} host key for {} has changed and you have requested strict checking.",
                        key_type, host
                    ));
                    return Ok(Checked::Failed(RejectReason::KeyChanged {
                        file: host_file.into(),
                        line: *line,
                    }));
                }
                report.restrictions = Restrictions::all();
                for feature in [
                    "Password authentication",
                    "Agent forwarding",
                    "X11 forwarding",
                    "Port forwarding",
                ] {
                    report.error(format!(
                        "{} is disabled to avoid man-in-the-middle attacks.",
                        feature
                    ));
                }
                return Ok(Checked::Accepted);
            }
        }

        if let (true, HostStatus::Changed { line: ip_line, .. }) = (check_ip, &ip_status) {
            let mut msg = format!(
                "Warning: the {} host key for '{}' differs from the key for the IP address '{}'\n\
                 Offending key for IP in {}:{}",
                key_type,
                host,
                ip,
                ip_file.display(),
                ip_line
            );
            if let HostStatus::Ok { line } = host_status {
                msg.push_str(&format!("\nMatching host key in {}:{}", host_file.display(), line));
            }
            report.dns_spoofing_suspected = true;
            let failed = RejectReason::IpKeyChanged {
                file: ip_file.into(),
                line: *ip_line,
            };
            match c.strict_host_key_checking {
                _ if self.validated => report.warn(msg),
                StrictHostKeyChecking::StrictReject => {
                    report.warn(msg);
                    report.error("Exiting, you have requested strict checking.".into());
                    return Ok(Checked::Failed(failed));
                }
                StrictHostKeyChecking::InteractiveConfirm => {
                    report.warn(msg.clone());
                    msg.push_str("\nAre you sure you want to continue connecting (yes/no)? ");
                    if !self.trust.prompter.confirm(&msg).await {
                        return Ok(Checked::Failed(failed));
                    }
                }
                StrictHostKeyChecking::Disabled => report.warn(msg),
            }
        }
        Ok(Checked::Accepted)
    }

    /// Look `name` up in the user file and, if unknown there, in the system file.
    async fn lookup(&self, name: &str) -> Result<(&'a Path, HostStatus), TrustError> {
        let status = self.trust.ledger.lookup(self.user_file, name, self.key).await?;
        if status != HostStatus::New {
            return Ok((self.user_file, status));
        }
        let status = self.trust.ledger.lookup(self.system_file, name, self.key).await?;
        Ok((self.system_file, status))
    }

    /// Best effort: failures are reported by the caller and never abort the decision.
    async fn add(&self, names: &[&str]) -> bool {
        let c = self.trust.config;
        match self
            .trust
            .ledger
            .insert(self.user_file, names, self.key, c.hash_known_hosts)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("adding host key: {}", e);
                false
            }
        }
    }

    /// Warn about keys of other types recorded for `host` in any ledger file.
    async fn show_other_keys(
        &self,
        host: &str,
        report: &mut HostTrustReport,
    ) -> Result<bool, TrustError> {
        let c = self.trust.config;
        let mut found = false;
        for key_type in [KeyType::Rsa1, KeyType::Rsa, KeyType::Dsa] {
            if key_type == self.key.key_type() {
                continue;
            }
            let mut files = vec![];
            if key_type != KeyType::Rsa1 {
                files.push(&c.user_hostfile2);
                files.push(&c.system_hostfile2);
            }
            files.push(&c.user_hostfile);
            files.push(&c.system_hostfile);
            let mut any = false;
            for file in files {
                let found_key = self.trust.ledger.lookup_by_type(file, host, key_type).await?;
                if let Some((key, line)) = found_key {
                    report.warn(format!(
                        "WARNING: {} key found for host {}\nin {}:{}\n{} key fingerprint {}.",
                        key_type,
                        host,
                        file.display(),
                        line,
                        key_type,
                        key.fingerprint()
                    ));
                    any = true;
                    break;
                }
            }
            if !any {
                log::debug!("no {} key for host {}", key_type, host);
            }
            found |= any;
        }
        Ok(found)
    }
}

fn line_of(status: &HostStatus) -> Option<usize> {
    match status {
        HostStatus::Ok { line } | HostStatus::Changed { line, .. } => Some(*line),
        HostStatus::New => None,
    }
}
