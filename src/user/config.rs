use std::path::{Path, PathBuf};

/// Where to find a user's authorized-identity lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAuthConfig {
    pub authorized_keys: PathBuf,
    /// Legacy list, consulted when the primary one has no match.
    pub authorized_keys2: PathBuf,
}

impl UserAuthConfig {
    /// The lists below `<home>/.ssh`.
    pub fn for_home(home: &Path) -> Self {
        let ssh = home.join(".ssh");
        Self {
            authorized_keys: ssh.join("authorized_keys"),
            authorized_keys2: ssh.join("authorized_keys2"),
        }
    }
}

impl Default for UserAuthConfig {
    #[allow(deprecated)]
    fn default() -> Self {
        Self::for_home(&std::env::home_dir().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_home_01() {
        let c = UserAuthConfig::for_home(Path::new("/home/alice"));
        assert_eq!(c.authorized_keys, PathBuf::from("/home/alice/.ssh/authorized_keys"));
        assert_eq!(c.authorized_keys2, PathBuf::from("/home/alice/.ssh/authorized_keys2"));
    }
}
