use super::*;
use tokio::io::AsyncBufReadExt;

/// The authorized-identity list consulted for plain client keys.
pub trait AuthorizedKeys: Send + Sync {
    fn is_authorized(&self, file: &Path, key: &PublicKey) -> BoxFuture<Result<bool, LedgerError>>;
}

/// [AuthorizedKeys] over OpenSSH `authorized_keys` files.
///
/// Each line holds an optional options field followed by a key and an optional comment.
/// Options are accepted but not interpreted.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizedKeysFiles;

impl AuthorizedKeysFiles {
    pub async fn contains(file: &Path, key: &PublicKey) -> Result<bool, LedgerError> {
        let f = match tokio::fs::File::open(file).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(LedgerError::io(file, e)),
        };
        let mut lines = tokio::io::BufReader::new(f).lines();
        let mut n = 0;
        while let Some(line) = lines.next_line().await.map_err(|e| LedgerError::io(file, e))? {
            n += 1;
            if Self::parse_line(&line).as_ref() == Some(key) {
                log::debug!("{}:{}: key authorized", file.display(), n);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn parse_line(line: &str) -> Option<PublicKey> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let key = if Self::starts_with_key(line) {
            line
        } else {
            Self::skip_options(line)?
        };
        PublicKey::parse_fields(&mut key.split_whitespace())
    }

    fn starts_with_key(line: &str) -> bool {
        let first = line.split_whitespace().next().unwrap_or_default();
        KeyType::from_name(first).is_some() || first.bytes().all(|c| c.is_ascii_digit())
    }

    /// Return the remainder after the options field. Whitespace inside double quotes does not
    /// end the field.
    fn skip_options(line: &str) -> Option<&str> {
        let mut quoted = false;
        let mut escaped = false;
        for (i, c) in line.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' if quoted => escaped = true,
                '"' => quoted = !quoted,
                ' ' | '\t' if !quoted => return Some(line[i..].trim_start()),
                _ => (),
            }
        }
        None
    }
}

impl AuthorizedKeys for AuthorizedKeysFiles {
    fn is_authorized(&self, file: &Path, key: &PublicKey) -> BoxFuture<Result<bool, LedgerError>> {
        let file = file.to_path_buf();
        let key = key.clone();
        Box::pin(async move { Self::contains(&file, &key).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str) -> String {
        std::fs::read_to_string(format!("tests/data/{}.pub", name))
            .unwrap()
            .trim()
            .to_string()
    }

    fn key(name: &str) -> PublicKey {
        AuthorizedKeysFiles::parse_line(&line(name)).unwrap()
    }

    #[test]
    fn test_parse_line_01() {
        assert!(AuthorizedKeysFiles::parse_line("").is_none());
        assert!(AuthorizedKeysFiles::parse_line("  # ssh-rsa AAAA").is_none());
        assert_eq!(key("user").key_type(), KeyType::Rsa);
    }

    #[test]
    fn test_parse_line_options() {
        let l = format!(
            "from=\"10.0.0.?,*.example.com\",command=\"echo a b\",no-pty {}",
            line("user")
        );
        assert_eq!(AuthorizedKeysFiles::parse_line(&l), Some(key("user")));
        let l = format!("no-agent-forwarding {}", line("user"));
        assert_eq!(AuthorizedKeysFiles::parse_line(&l), Some(key("user")));
    }

    #[test]
    fn test_parse_line_unterminated_quote() {
        let l = format!("command=\"echo {}", line("user"));
        assert_eq!(AuthorizedKeysFiles::parse_line(&l), None);
    }

    #[tokio::test]
    async fn test_is_authorized_01() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authorized_keys");
        std::fs::write(&path, format!("# keys\n{}\n", line("user"))).unwrap();
        let list = AuthorizedKeysFiles;
        assert_eq!(list.is_authorized(&path, &key("user")).await, Ok(true));
        assert_eq!(list.is_authorized(&path, &key("host")).await, Ok(false));
        let missing = dir.path().join("authorized_keys2");
        assert_eq!(list.is_authorized(&missing, &key("user")).await, Ok(false));
    }
}
