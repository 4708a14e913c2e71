use super::*;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

/// [HostKeyLedger] over OpenSSH `known_hosts` files.
///
/// Lines are `<names> <key>` where `<key>` is either `<type> <base64>` or a protocol 1
/// `<bits> <e> <n>` triple. Comments, blank lines and marker lines (`@revoked`,
/// `@cert-authority`) are skipped. A missing file reads as empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct KnownHostsFiles;

/// One usable line of a `known_hosts` file.
#[derive(Debug)]
struct Entry {
    line: usize,
    key: PublicKey,
}

impl KnownHostsFiles {
    async fn entries(file: &Path, name: &str) -> Result<Vec<Entry>, LedgerError> {
        let f = match tokio::fs::File::open(file).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(LedgerError::io(file, e)),
        };
        let mut lines = tokio::io::BufReader::new(f).lines();
        let mut entries = vec![];
        let mut n = 0;
        while let Some(line) = lines.next_line().await.map_err(|e| LedgerError::io(file, e))? {
            n += 1;
            if let Some(key) = Self::parse_line(&line, name) {
                entries.push(Entry { line: n, key });
            }
        }
        Ok(entries)
    }

    fn parse_line(line: &str, name: &str) -> Option<PublicKey> {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            return None;
        }
        let mut fields = line.split_whitespace();
        let names = fields.next()?;
        if !HostPattern(names).matches(name) {
            return None;
        }
        let key = PublicKey::parse_fields(&mut fields);
        if key.is_none() {
            log::debug!("skipping unparseable key for {}", names);
        }
        key
    }

    pub async fn lookup_file(
        file: &Path,
        name: &str,
        key: &PublicKey,
    ) -> Result<HostStatus, LedgerError> {
        let mut status = HostStatus::New;
        for entry in Self::entries(file, name).await? {
            if entry.key.key_type() != key.key_type() {
                continue;
            }
            if &entry.key == key {
                log::debug!("{}:{}: host key for {} matches", file.display(), entry.line, name);
                return Ok(HostStatus::Ok { line: entry.line });
            }
            if status == HostStatus::New {
                status = HostStatus::Changed {
                    existing: entry.key,
                    line: entry.line,
                };
            }
        }
        Ok(status)
    }

    pub async fn lookup_type_in_file(
        file: &Path,
        name: &str,
        key_type: KeyType,
    ) -> Result<Option<(PublicKey, usize)>, LedgerError> {
        Ok(Self::entries(file, name)
            .await?
            .into_iter()
            .find(|e| e.key.key_type() == key_type)
            .map(|e| (e.key, e.line)))
    }

    pub async fn append(
        file: &Path,
        names: &[String],
        key: &PublicKey,
        hash: bool,
    ) -> Result<(), LedgerError> {
        if names.is_empty() {
            return Ok(());
        }
        let key = key.to_line();
        let mut text = String::new();
        if hash {
            for name in names {
                text.push_str(&format!("{} {}\n", HostPattern::hash(name), key));
            }
        } else {
            text.push_str(&format!("{} {}\n", names.join(","), key));
        }
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .await
            .map_err(|e| LedgerError::io(file, e))?;
        f.write_all(text.as_bytes())
            .await
            .map_err(|e| LedgerError::io(file, e))?;
        f.flush().await.map_err(|e| LedgerError::io(file, e))
    }
}

impl HostKeyLedger for KnownHostsFiles {
    fn lookup(
        &self,
        file: &Path,
        name: &str,
        key: &PublicKey,
    ) -> BoxFuture<Result<HostStatus, LedgerError>> {
        let file = file.to_path_buf();
        let name = name.to_string();
        let key = key.clone();
        Box::pin(async move { Self::lookup_file(&file, &name, &key).await })
    }

    fn lookup_by_type(
        &self,
        file: &Path,
        name: &str,
        key_type: KeyType,
    ) -> BoxFuture<Result<Option<(PublicKey, usize)>, LedgerError>> {
        let file = file.to_path_buf();
        let name = name.to_string();
        Box::pin(async move { Self::lookup_type_in_file(&file, &name, key_type).await })
    }

    fn insert(
        &self,
        file: &Path,
        names: &[&str],
        key: &PublicKey,
        hash: bool,
    ) -> BoxFuture<Result<(), LedgerError>> {
        let file: PathBuf = file.to_path_buf();
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let key = key.clone();
        Box::pin(async move { Self::append(&file, &names, &key, hash).await })
    }

    fn exists(&self, file: &Path) -> BoxFuture<bool> {
        let file = file.to_path_buf();
        Box::pin(async move { tokio::fs::metadata(&file).await.is_ok() })
    }
}
