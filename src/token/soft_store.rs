use super::*;
use crate::credential::KeyHandle;
use crate::util::Secret;
use sha2::{Digest, Sha256};
use std::path::Path;

/// A software token store.
///
/// Tokens can be assembled in memory or loaded from a directory with one subdirectory per
/// token:
///
/// ```text
/// <dir>/<token>/PIN                     hex SHA-256 of the PIN
/// <dir>/<token>/private/<label>.key     PEM private key (login required)
/// <dir>/<token>/private/<label>.crt     certificate (login required)
/// <dir>/<token>/public/<label>.crt      certificate (no login required)
/// ```
#[derive(Debug, Default)]
pub struct SoftTokenStore {
    tokens: Vec<SoftToken>,
}

#[derive(Debug)]
struct SoftToken {
    label: String,
    manufacturer: String,
    model: String,
    serial: String,
    pin_hash: Vec<u8>,
    objects: Vec<SoftObject>,
}

#[derive(Debug)]
struct SoftObject {
    label: String,
    value: SoftObjectValue,
}

#[derive(Debug)]
enum SoftObjectValue {
    PrivateKey(KeyHandle),
    Certificate { der: Vec<u8>, private: bool },
}

impl SoftTokenStore {
    pub const MANUFACTURER: &'static str = "sshtrust";
    pub const MODEL: &'static str = "soft";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, label: &str, serial: &str, pin: &[u8]) {
        self.tokens.push(SoftToken {
            label: label.into(),
            manufacturer: Self::MANUFACTURER.into(),
            model: Self::MODEL.into(),
            serial: serial.into(),
            pin_hash: Sha256::digest(pin).to_vec(),
            objects: vec![],
        })
    }

    /// Returns `false` if no token with that label exists.
    pub fn add_private_key(&mut self, token: &str, label: &str, key: KeyHandle) -> bool {
        self.add_object(token, label, SoftObjectValue::PrivateKey(key))
    }

    /// Returns `false` if no token with that label exists.
    pub fn add_certificate(&mut self, token: &str, label: &str, der: Vec<u8>, private: bool) -> bool {
        self.add_object(token, label, SoftObjectValue::Certificate { der, private })
    }

    fn add_object(&mut self, token: &str, label: &str, value: SoftObjectValue) -> bool {
        match self.tokens.iter_mut().find(|t| t.label == token) {
            Some(t) => {
                t.objects.push(SoftObject {
                    label: label.into(),
                    value,
                });
                true
            }
            None => false,
        }
    }

    /// Load all tokens below `dir`.
    pub async fn open(dir: &Path) -> Result<Self, std::io::Error> {
        let mut store = Self::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let label = entry.file_name().to_string_lossy().into_owned();
            let hex = tokio::fs::read_to_string(entry.path().join("PIN")).await?;
            let pin_hash = decode_hex(hex.trim()).ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "bad PIN hash")
            })?;
            let mut token = SoftToken {
                label: label.clone(),
                manufacturer: Self::MANUFACTURER.into(),
                model: Self::MODEL.into(),
                serial: String::new(),
                pin_hash,
                objects: vec![],
            };
            Self::open_objects(&entry.path().join("private"), true, &mut token).await?;
            Self::open_objects(&entry.path().join("public"), false, &mut token).await?;
            log::debug!("soft token {:?}: {} objects", label, token.objects.len());
            store.tokens.push(token);
        }
        Ok(store)
    }

    async fn open_objects(
        dir: &Path,
        private: bool,
        token: &mut SoftToken,
    ) -> Result<(), std::io::Error> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(x) => x,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let label = match path.file_stem() {
                Some(x) => x.to_string_lossy().into_owned(),
                None => continue,
            };
            let value = match path.extension().and_then(|x| x.to_str()) {
                Some("key") if private => {
                    let pem = tokio::fs::read_to_string(&path).await?;
                    match KeyHandle::from_pem(&pem) {
                        Ok(key) => SoftObjectValue::PrivateKey(key),
                        Err(e) => {
                            log::warn!("{:?}: {}", path, e);
                            continue;
                        }
                    }
                }
                Some("crt") => {
                    let der = tokio::fs::read(&path).await?;
                    SoftObjectValue::Certificate { der, private }
                }
                _ => continue,
            };
            token.objects.push(SoftObject { label, value });
        }
        Ok(())
    }

    fn token(&self, r: &CredentialReference) -> Option<&SoftToken> {
        let eq = |want: &Option<String>, have: &str| want.as_deref().map_or(true, |x| x == have);
        self.tokens.iter().find(|t| {
            t.label == r.token
                && eq(&r.manufacturer, &t.manufacturer)
                && eq(&r.model, &t.model)
                && eq(&r.serial, &t.serial)
        })
    }
}

impl SoftToken {
    fn login(&self, pin: &Secret) -> Result<(), TokenStoreError> {
        if Sha256::digest(pin.as_ref()).as_slice() == self.pin_hash.as_slice() {
            Ok(())
        } else {
            Err(TokenStoreError::AuthFailed)
        }
    }

    fn certificates<'a>(&'a self, label: &'a str) -> impl Iterator<Item = (&'a [u8], bool)> + 'a {
        self.objects.iter().filter_map(move |o| match &o.value {
            SoftObjectValue::Certificate { der, private } if o.label == label => {
                Some((der.as_slice(), *private))
            }
            _ => None,
        })
    }
}

fn single<T>(mut xs: impl Iterator<Item = T>) -> Result<T, TokenStoreError> {
    let x = xs.next().ok_or(TokenStoreError::NotFound)?;
    match xs.next() {
        Some(_) => Err(TokenStoreError::AmbiguousMatch),
        None => Ok(x),
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    crate::util::check(s.len() % 2 == 0)?;
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

impl TokenStore for SoftTokenStore {
    fn has_token(&self, reference: &CredentialReference) -> bool {
        self.token(reference).is_some()
    }

    fn find_key(
        &self,
        reference: &CredentialReference,
        pin: &Secret,
    ) -> Result<KeyHandle, TokenStoreError> {
        let token = self.token(reference).ok_or(TokenStoreError::NotFound)?;
        token.login(pin)?;
        single(token.objects.iter().filter_map(|o| match &o.value {
            SoftObjectValue::PrivateKey(k) if o.label == reference.object => Some(k.clone()),
            _ => None,
        }))
    }

    fn cert_requires_auth(
        &self,
        reference: &CredentialReference,
    ) -> Result<bool, TokenStoreError> {
        let token = self.token(reference).ok_or(TokenStoreError::NotFound)?;
        let mut found = false;
        for (_, private) in token.certificates(&reference.object) {
            if !private {
                return Ok(false);
            }
            found = true;
        }
        if found {
            Ok(true)
        } else {
            Err(TokenStoreError::NotFound)
        }
    }

    fn find_certificate(
        &self,
        reference: &CredentialReference,
        pin: Option<&Secret>,
    ) -> Result<Vec<u8>, TokenStoreError> {
        let token = self.token(reference).ok_or(TokenStoreError::NotFound)?;
        let logged_in = match pin {
            Some(pin) => token.login(pin).map(|_| true)?,
            None => false,
        };
        let visible = token
            .certificates(&reference.object)
            .filter(|(_, private)| logged_in || !private);
        match single(visible) {
            Err(TokenStoreError::NotFound) if !logged_in => {
                if token.certificates(&reference.object).next().is_some() {
                    Err(TokenStoreError::AuthRequired)
                } else {
                    Err(TokenStoreError::NotFound)
                }
            }
            x => x.map(|(der, _)| der.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> KeyHandle {
        let pem = std::fs::read_to_string("tests/data/user.key").unwrap();
        KeyHandle::from_pem(&pem).unwrap()
    }

    fn reference(object: &str) -> CredentialReference {
        CredentialReference {
            token: "soft".into(),
            object: object.into(),
            ..Default::default()
        }
    }

    fn store() -> SoftTokenStore {
        let mut s = SoftTokenStore::new();
        s.add_token("soft", "0001", b"1234");
        assert!(s.add_private_key("soft", "alice", key()));
        assert!(s.add_certificate("soft", "alice", vec![1, 2, 3], false));
        assert!(s.add_private_key("soft", "twice", key()));
        assert!(s.add_private_key("soft", "twice", key()));
        assert!(s.add_certificate("soft", "hidden", vec![4, 5], true));
        assert!(!s.add_certificate("other", "x", vec![], false));
        s
    }

    #[test]
    fn test_find_key_01() {
        let s = store();
        let pin = Secret::new(b"1234");
        assert!(s.find_key(&reference("alice"), &pin).is_ok());
        assert_eq!(
            s.find_key(&reference("twice"), &pin).unwrap_err(),
            TokenStoreError::AmbiguousMatch
        );
        assert_eq!(
            s.find_key(&reference("bob"), &pin).unwrap_err(),
            TokenStoreError::NotFound
        );
    }

    #[test]
    fn test_find_key_wrong_pin() {
        let s = store();
        let pin = Secret::new(b"0000");
        assert_eq!(
            s.find_key(&reference("alice"), &pin).unwrap_err(),
            TokenStoreError::AuthFailed
        );
    }

    #[test]
    fn test_token_selection() {
        let s = store();
        let mut r = reference("alice");
        r.serial = Some("0002".into());
        assert!(!s.has_token(&r));
        r.serial = Some("0001".into());
        r.manufacturer = Some(SoftTokenStore::MANUFACTURER.into());
        assert!(s.has_token(&r));
    }

    #[test]
    fn test_find_certificate_01() {
        let s = store();
        assert_eq!(s.cert_requires_auth(&reference("alice")), Ok(false));
        assert_eq!(s.find_certificate(&reference("alice"), None), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn test_find_certificate_private() {
        let s = store();
        let r = reference("hidden");
        assert_eq!(s.cert_requires_auth(&r), Ok(true));
        assert_eq!(s.find_certificate(&r, None), Err(TokenStoreError::AuthRequired));
        let pin = Secret::new(b"1234");
        assert_eq!(s.find_certificate(&r, Some(&pin)), Ok(vec![4, 5]));
        let pin = Secret::new(b"4321");
        assert_eq!(s.find_certificate(&r, Some(&pin)), Err(TokenStoreError::AuthFailed));
    }

    #[test]
    fn test_find_certificate_missing() {
        let s = store();
        assert_eq!(
            s.cert_requires_auth(&reference("bob")),
            Err(TokenStoreError::NotFound)
        );
        assert_eq!(
            s.find_certificate(&reference("bob"), None),
            Err(TokenStoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_open_01() {
        let dir = tempfile::tempdir().unwrap();
        let token = dir.path().join("soft");
        std::fs::create_dir_all(token.join("private")).unwrap();
        std::fs::create_dir_all(token.join("public")).unwrap();
        let hash: String = Sha256::digest(b"1234")
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        std::fs::write(token.join("PIN"), hash + "\n").unwrap();
        std::fs::copy("tests/data/user.key", token.join("private/alice.key")).unwrap();
        std::fs::copy("tests/data/user.der", token.join("public/alice.crt")).unwrap();
        let s = SoftTokenStore::open(dir.path()).await.unwrap();
        let pin = Secret::new(b"1234");
        assert!(s.find_key(&reference("alice"), &pin).is_ok());
        let der = s.find_certificate(&reference("alice"), None).unwrap();
        assert_eq!(der, std::fs::read("tests/data/user.der").unwrap());
    }
}
