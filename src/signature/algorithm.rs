use crate::credential::KeyType;

/// Hash and signature algorithm combination. This protocol generation uses SHA-1 only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaSha1,
    DsaSha1,
}

impl SignatureAlgorithm {
    /// The algorithm a credential of the given type signs with.
    pub fn for_key_type(key_type: KeyType) -> Option<Self> {
        match key_type {
            KeyType::Rsa | KeyType::X509Rsa => Some(Self::RsaSha1),
            KeyType::Dsa | KeyType::X509Dss => Some(Self::DsaSha1),
            KeyType::Rsa1 => None,
        }
    }

    /// The algorithm implied by a signature envelope's tag.
    pub fn for_tag(tag: &str) -> Option<Self> {
        match KeyType::from_name(tag)? {
            KeyType::Rsa1 => None,
            t => Self::for_key_type(t),
        }
    }
}
