use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    Io(PathBuf, ErrorKind),
    InvalidKey,
}

impl LedgerError {
    pub(crate) fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::Io(path.into(), e.kind())
    }
}

impl std::error::Error for LedgerError {}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, kind) => write!(f, "{}: {:?}", path.display(), kind),
            Self::InvalidKey => write!(f, "key cannot be written to a ledger"),
        }
    }
}
