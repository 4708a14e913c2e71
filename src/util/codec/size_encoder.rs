use super::*;

/// Counts the bytes a sequence of encoding operations would produce.
#[derive(Debug, Default)]
pub struct SizeEncoder(usize);

impl SizeEncoder {
    pub fn new() -> Self {
        Self(0)
    }
}

impl From<SizeEncoder> for usize {
    fn from(x: SizeEncoder) -> usize {
        x.0
    }
}

impl Encoder for SizeEncoder {
    #[inline]
    fn push_bytes(&mut self, bytes: &[u8]) -> Option<()> {
        self.0 = self.0.checked_add(bytes.len())?;
        Some(())
    }
}
