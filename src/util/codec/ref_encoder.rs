use super::*;

/// A cursor into a mutable buffer that implements [Encoder].
#[derive(Debug)]
pub struct RefEncoder<'a> {
    pos: usize,
    buf: &'a mut [u8],
}

impl<'a> RefEncoder<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { pos: 0, buf }
    }

    pub fn is_full(&self) -> bool {
        self.pos >= self.buf.len()
    }
}

impl<'a> Encoder for RefEncoder<'a> {
    #[inline]
    fn push_bytes(&mut self, x: &[u8]) -> Option<()> {
        let end = self.pos.checked_add(x.len())?;
        self.buf.get_mut(self.pos..end)?.copy_from_slice(x);
        self.pos = end;
        Some(())
    }
}
