/// Key type tag of a [Credential](super::Credential).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa1,
    Rsa,
    Dsa,
    X509Rsa,
    X509Dss,
}

impl KeyType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Rsa1 => "rsa1",
            Self::Rsa => "ssh-rsa",
            Self::Dsa => "ssh-dss",
            Self::X509Rsa => "x509v3-sign-rsa",
            Self::X509Dss => "x509v3-sign-dss",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rsa1" => Some(Self::Rsa1),
            "ssh-rsa" => Some(Self::Rsa),
            "ssh-dss" => Some(Self::Dsa),
            "x509v3-sign-rsa" => Some(Self::X509Rsa),
            "x509v3-sign-dss" => Some(Self::X509Dss),
            _ => None,
        }
    }

    pub fn is_x509(self) -> bool {
        matches!(self, Self::X509Rsa | Self::X509Dss)
    }

    /// The plain key type a certificate of this type converts to.
    pub fn plain(self) -> Self {
        match self {
            Self::X509Rsa => Self::Rsa,
            Self::X509Dss => Self::Dsa,
            x => x,
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
