use super::*;

/// SSH specific encoding.
pub trait SshEncode {
    #[must_use]
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()>;
}

impl SshEncode for String {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        e.push_str_framed(self)
    }
}

impl SshEncode for Vec<u8> {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        e.push_bytes_framed(self)
    }
}

impl<A: SshEncode, B: SshEncode> SshEncode for (A, B) {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        e.push(&self.0)?;
        e.push(&self.1)
    }
}
