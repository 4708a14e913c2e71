use super::*;
use crate::util::check;

/// A cursor into an immutable buffer that implements [Decoder].
#[derive(Debug, Clone)]
pub struct RefDecoder<'a> {
    pos: usize,
    buf: &'a [u8],
}

impl<'a> RefDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { pos: 0, buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl<'a> Decoder<'a> for RefDecoder<'a> {
    #[inline]
    fn expect_eoi(&self) -> Option<()> {
        check(self.pos >= self.buf.len())
    }

    #[inline]
    fn take_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let x = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(x)
    }

    #[inline]
    fn take_bytes_all(&mut self) -> Option<&'a [u8]> {
        let x = self.buf.get(self.pos..)?;
        self.pos = self.buf.len();
        Some(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_u8_01() {
        let a = [1, 2];
        let mut d = RefDecoder::new(&a);
        assert_eq!(d.take_u8(), Some(1));
        assert_eq!(d.take_u8(), Some(2));
        assert_eq!(d.take_u8(), None);
        assert_eq!(d.expect_eoi(), Some(()));
    }

    #[test]
    fn test_take_u32be_01() {
        let a = [1, 2, 3, 4, 5];
        let mut d = RefDecoder::new(&a);
        assert_eq!(d.take_u32be(), Some(0x01020304));
        assert_eq!(d.take_u32be(), None);
        assert_eq!(d.remaining(), 1);
    }

    #[test]
    fn test_take_bytes_overflow() {
        let a = [1, 2, 3];
        let mut d = RefDecoder::new(&a);
        assert_eq!(d.take_u8(), Some(1));
        assert_eq!(d.take_bytes(usize::MAX), None);
        assert_eq!(d.take_bytes_all(), Some(&[2, 3][..]));
    }

    #[test]
    fn test_expect_bytes_01() {
        let a = *b"ssh-rsa";
        let mut d = RefDecoder::new(&a);
        assert_eq!(d.clone().expect_bytes(b"ssh-dss"), None);
        assert_eq!(d.expect_bytes(b"ssh-rsa"), Some(()));
    }
}
