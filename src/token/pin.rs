use super::CredentialReference;
use crate::util::{BoxFuture, Secret};
use zeroize::Zeroize;

/// Interactive PIN entry.
pub trait PinPrompter: Send + Sync {
    /// Show `prompt` and read a line without echo. `None` if input is unavailable.
    fn read_pin(&self, prompt: &str) -> BoxFuture<Option<Secret>>;
}

/// A prompter for unattended contexts: it never returns a PIN.
impl PinPrompter for () {
    fn read_pin(&self, _: &str) -> BoxFuture<Option<Secret>> {
        Box::pin(async { None })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    NoPin,
    PinFileUnreadable(std::io::ErrorKind),
}

impl std::error::Error for PinError {}

impl std::fmt::Display for PinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPin => write!(f, "no PIN available"),
            Self::PinFileUnreadable(e) => write!(f, "cannot read PIN file: {:?}", e),
        }
    }
}

/// Resolve the PIN for the token named by `reference`.
///
/// Tries the explicitly supplied PIN, then the reference's PIN file, then (only if
/// `may_prompt`) the prompter.
pub async fn get_pin(
    explicit: Option<&Secret>,
    reference: &CredentialReference,
    may_prompt: bool,
    prompter: &dyn PinPrompter,
) -> Result<Secret, PinError> {
    if let Some(pin) = explicit {
        return Ok(pin.clone());
    }
    if let Some(path) = &reference.pin_file {
        let mut bytes = tokio::fs::read(path).await.map_err(|e| {
            log::debug!("PIN file {:?}: {}", path, e);
            PinError::PinFileUnreadable(e.kind())
        })?;
        let mut len = bytes.len();
        if bytes[..len].ends_with(b"\n") {
            len -= 1;
        }
        if bytes[..len].ends_with(b"\r") {
            len -= 1;
        }
        let pin = Secret::new(&bytes[..len]);
        bytes.zeroize();
        if pin.is_empty() {
            log::debug!("PIN file {:?} is empty", path);
            return Err(PinError::NoPin);
        }
        return Ok(pin);
    }
    if may_prompt {
        let prompt = format!("Enter PIN for token '{}': ", reference.token);
        if let Some(pin) = prompter.read_pin(&prompt).await {
            if !pin.is_empty() {
                return Ok(pin);
            }
        }
    }
    Err(PinError::NoPin)
}
