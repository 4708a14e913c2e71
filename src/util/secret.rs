use std::sync::Arc;
use zeroize::*;

/// Sensitive bytes (token PINs, passphrases).
///
/// The memory is overwritten with zeros when the last clone is dropped. The `Debug` output only
/// reveals the length so a `Secret` may end up in log statements without leaking its contents.
#[derive(Clone)]
pub struct Secret(Arc<Vec<u8>>);

impl Secret {
    pub fn new(x: &[u8]) -> Self {
        Self(Arc::new(x.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume a `String` (e.g. typed at a prompt) without leaving a copy behind.
    pub fn from_string(mut s: String) -> Self {
        let x = Self::new(s.as_bytes());
        s.zeroize();
        x
    }
}

impl AsRef<[u8]> for Secret {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        if let Some(x) = Arc::get_mut(&mut self.0) {
            x.zeroize()
        }
    }
}
