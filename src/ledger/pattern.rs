use crate::util::{check, Glob};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha1::Sha1;

const HASH_MAGIC: &str = "|1|";
const SALT_LEN: usize = 20;

/// The host name field of a `known_hosts` line.
///
/// Either a comma separated list of (possibly negated) wildcard patterns or a single hashed
/// name of the form `|1|<salt>|<hmac-sha1>`.
#[derive(Clone, Copy, Debug)]
pub struct HostPattern<'a>(pub &'a str);

impl<'a> HostPattern<'a> {
    pub fn matches(&self, name: &str) -> bool {
        if self.0.starts_with('|') {
            self.matches_hash(name).is_some()
        } else {
            self.matches_list(name)
        }
    }

    /// Produce a fresh hashed name field with a random salt.
    pub fn hash(name: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::hash_with_salt(name, &salt)
    }

    pub fn hash_with_salt(name: &str, salt: &[u8]) -> String {
        let mac = match Hmac::<Sha1>::new_from_slice(salt) {
            Ok(mut mac) => {
                mac.update(name.as_bytes());
                mac.finalize().into_bytes().to_vec()
            }
            // HMAC accepts keys of any length.
            Err(_) => vec![],
        };
        format!(
            "{}{}|{}",
            HASH_MAGIC,
            base64::encode(salt),
            base64::encode(mac)
        )
    }

    fn matches_hash(&self, name: &str) -> Option<()> {
        let rest = self.0.strip_prefix(HASH_MAGIC)?;
        let (salt, mac) = rest.split_once('|')?;
        check(salt.len() == 28 && mac.len() == 28)?;
        let salt = base64::decode(salt).ok()?;
        let mac = base64::decode(mac).ok()?;
        let mut hmac = Hmac::<Sha1>::new_from_slice(&salt).ok()?;
        hmac.update(name.as_bytes());
        hmac.verify_slice(&mac).ok()
    }

    fn matches_list(&self, name: &str) -> bool {
        let mut result = false;
        for pattern in self.0.split(',') {
            if let Some(pattern) = pattern.strip_prefix('!') {
                if Self::matches_one(pattern, name) {
                    return false;
                }
            } else if Self::matches_one(pattern, name) {
                // A later negation may still exclude the name.
                result = true
            }
        }
        result
    }

    fn matches_one(pattern: &str, name: &str) -> bool {
        let valid = |c: char| c.is_ascii_alphanumeric() || ":.-_*?[]".contains(c);
        !pattern.is_empty()
            && pattern.chars().all(valid)
            && Glob(&pattern.to_ascii_lowercase()).matches(&name.to_ascii_lowercase())
    }
}
