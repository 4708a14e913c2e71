use super::*;

/// SSH specific encoder operations.
pub trait SshEncoder: Encoder {
    #[must_use]
    #[inline]
    fn push<T: SshEncode>(&mut self, x: &T) -> Option<()> {
        x.encode(self)
    }
    #[must_use]
    #[inline]
    fn push_usize(&mut self, x: usize) -> Option<()> {
        crate::util::check(x <= u32::MAX as usize)?;
        self.push_u32be(x as u32)
    }
    #[must_use]
    #[inline]
    fn push_str_framed(&mut self, x: &str) -> Option<()> {
        self.push_bytes_framed(x.as_bytes())
    }
    #[must_use]
    #[inline]
    fn push_bytes_framed(&mut self, x: &[u8]) -> Option<()> {
        self.push_usize(x.len())?;
        self.push_bytes(x)
    }
    /// RFC 4251:
    /// "If the most significant bit would be set for a positive number,
    /// the number MUST be preceded by a zero byte. Unnecessary leading
    /// bytes with the value 0 or 255 MUST NOT be included. The value zero
    /// MUST be stored as a string with zero bytes of data."
    ///
    /// The input is interpreted as unsigned big-endian magnitude.
    #[must_use]
    fn push_mpint(&mut self, x: &[u8]) -> Option<()> {
        let mut x = x;
        while let Some(0) = x.first() {
            x = &x[1..];
        }
        match x.first() {
            Some(n) if *n > 127 => {
                self.push_usize(x.len() + 1)?;
                self.push_u8(0)?;
                self.push_bytes(x)
            }
            Some(_) => self.push_bytes_framed(x),
            None => self.push_usize(0),
        }
    }
}

impl SshEncoder for SizeEncoder {}

impl<'a> SshEncoder for RefEncoder<'a> {}

impl<D: sha2::Digest> SshEncoder for D {}

#[cfg(test)]
mod tests {
    use super::*;

    fn mpint(x: &[u8]) -> Vec<u8> {
        let mut size = SizeEncoder::new();
        size.push_mpint(x).unwrap();
        let mut buf = vec![0; size.into()];
        let mut e = RefEncoder::new(&mut buf);
        e.push_mpint(x).unwrap();
        buf
    }

    #[test]
    fn test_push_mpint_01() {
        assert_eq!(mpint(&[]), [0, 0, 0, 0]);
        assert_eq!(mpint(&[0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_push_mpint_02() {
        assert_eq!(mpint(&[0x00, 0x01, 0x00, 0x01]), [0, 0, 0, 3, 1, 0, 1]);
    }

    #[test]
    fn test_push_mpint_03() {
        assert_eq!(mpint(&[0x80]), [0, 0, 0, 2, 0, 0x80]);
    }
}
