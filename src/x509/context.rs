use super::*;
use crate::token::{InitError, SessionPolicy};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// Process-wide state for validating other parties' certificates: the policy and the trust
/// anchors.
///
/// Constructed once by the caller and shared (e.g. behind an `Arc`). The anchor directory is
/// read on first use; concurrent first uses wait for a single load.
#[derive(Debug)]
pub struct ValidationContext {
    policy: ValidationPolicy,
    anchor_dir: PathBuf,
    anchors: OnceCell<Vec<Vec<u8>>>,
}

impl ValidationContext {
    pub const DEFAULT_ANCHOR_DIR: &'static str = "/etc/ssh/trusted_anchors";

    pub fn new(policy: ValidationPolicy, anchor_dir: PathBuf) -> Self {
        Self {
            policy,
            anchor_dir,
            anchors: OnceCell::new(),
        }
    }

    pub async fn init(policy: &SessionPolicy) -> Result<Self, InitError> {
        let anchor_dir = policy
            .anchor_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_ANCHOR_DIR));
        Ok(Self::new(ValidationPolicy::load(policy).await?, anchor_dir))
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn anchor_dir(&self) -> &Path {
        &self.anchor_dir
    }

    /// DER encoded trust anchors from every certificate file in the anchor directory.
    pub async fn anchors(&self, parser: &dyn CertificateParser) -> &[Vec<u8>] {
        self.anchors
            .get_or_init(|| Self::load_anchors(&self.anchor_dir, parser))
            .await
    }

    async fn load_anchors(dir: &Path, parser: &dyn CertificateParser) -> Vec<Vec<u8>> {
        let mut anchors = vec![];
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(x) => x,
            Err(e) => {
                log::debug!("trusted anchors {:?}: {}", dir, e);
                return anchors;
            }
        };
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(x)) => x,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("trusted anchors {:?}: {}", dir, e);
                    break;
                }
            };
            match tokio::fs::read(entry.path()).await {
                Ok(bytes) => {
                    let certs = parser.certificates(&bytes);
                    if certs.is_empty() {
                        log::debug!("{:?}: no certificates", entry.path());
                    }
                    anchors.extend(certs)
                }
                Err(e) => log::debug!("{:?}: {}", entry.path(), e),
            }
        }
        log::debug!("loaded {} trusted anchors from {:?}", anchors.len(), dir);
        anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anchors_01() {
        let ctx = ValidationContext::new(Default::default(), "tests/data/anchors".into());
        assert_eq!(ctx.anchors(&X509Parser).await.len(), 1);
    }

    #[tokio::test]
    async fn test_anchors_missing_dir() {
        let ctx = ValidationContext::new(Default::default(), "/nonexistent/anchors".into());
        assert!(ctx.anchors(&X509Parser).await.is_empty());
    }

    #[tokio::test]
    async fn test_init_default_dir() {
        let ctx = ValidationContext::init(&SessionPolicy::default()).await.unwrap();
        assert_eq!(
            ctx.anchor_dir(),
            Path::new(ValidationContext::DEFAULT_ANCHOR_DIR)
        );
    }
}
