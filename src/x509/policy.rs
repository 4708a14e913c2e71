use crate::token::{InitError, SessionPolicy};

/// Options governing certificate validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub name: String,
    /// Skip the validity window check of the certificate.
    pub ignore_date: bool,
    /// Also require the trust anchor itself to be within its validity window.
    pub check_anchor_date: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT.into(),
            ignore_date: false,
            check_anchor_date: false,
        }
    }
}

impl ValidationPolicy {
    pub const DEFAULT: &'static str = "default";
    pub const IGNORE_DATE: &'static str = "ignore-date";

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            Self::DEFAULT => Some(Self::default()),
            Self::IGNORE_DATE => Some(Self {
                name: name.into(),
                ignore_date: true,
                check_anchor_date: false,
            }),
            _ => None,
        }
    }

    /// Parse a policy database: one `<name> <option>...` definition per line.
    pub fn parse_db(text: &str) -> Result<Vec<Self>, InitError> {
        let mut policies = vec![];
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let mut policy = Self::default();
            policy.name = fields.next().unwrap_or_default().into();
            for option in fields {
                match option {
                    "ignore-date" => policy.ignore_date = true,
                    "check-anchor-date" => policy.check_anchor_date = true,
                    _ => {
                        return Err(InitError::PolicyDb(format!(
                            "line {}: unknown option {:?}",
                            n + 1,
                            option
                        )))
                    }
                }
            }
            policies.push(policy);
        }
        Ok(policies)
    }

    /// Resolve the policy selected by the session configuration. Definitions in the policy
    /// database take precedence over the built-in ones.
    pub async fn load(policy: &SessionPolicy) -> Result<Self, InitError> {
        let name = policy.policy_name.as_deref().unwrap_or(Self::DEFAULT);
        if let Some(path) = &policy.policy_db {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| InitError::PolicyDb(format!("{:?}: {}", path, e)))?;
            if let Some(p) = Self::parse_db(&text)?.into_iter().find(|p| p.name == name) {
                return Ok(p);
            }
        }
        Self::builtin(name).ok_or_else(|| InitError::UnknownPolicy(name.into()))
    }
}
