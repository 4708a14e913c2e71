use super::*;

/// SSH specific decoder operations.
pub trait SshDecoder<'a>: Decoder<'a> {
    #[must_use]
    fn take<T: SshDecodeRef<'a>>(&mut self) -> Option<T> {
        T::decode(self)
    }
    #[must_use]
    fn take_usize(&mut self) -> Option<usize> {
        Some(self.take_u32be()? as usize)
    }
    #[must_use]
    fn take_bytes_framed(&mut self) -> Option<&'a [u8]> {
        let len = self.take_usize()?;
        self.take_bytes(len)
    }
    #[must_use]
    fn take_str(&mut self, len: usize) -> Option<&'a str> {
        let bytes = self.take_bytes(len)?;
        std::str::from_utf8(bytes).ok()
    }
    #[must_use]
    fn take_str_framed(&mut self) -> Option<&'a str> {
        let len = self.take_usize()?;
        self.take_str(len)
    }
    /// The magnitude of a non-negative mpint (leading zero octets removed).
    #[must_use]
    fn take_mpint(&mut self) -> Option<&'a [u8]> {
        let mut x = self.take_bytes_framed()?;
        if let Some(n) = x.first() {
            crate::util::check(*n < 128)?;
        }
        while let Some(0) = x.first() {
            x = &x[1..];
        }
        Some(x)
    }
    #[must_use]
    fn expect_str_framed(&mut self, x: &str) -> Option<()> {
        self.take_str_framed().filter(|y| *y == x).map(drop)
    }
}

impl<'a> SshDecoder<'a> for RefDecoder<'a> {}
