/// Consumption from an underlying byte input.
///
/// All operations return `None` instead of panicking when the input is exhausted or does not
/// meet the expectation. Implementors only provide raw byte access; the fixed-width readers
/// are derived from it. Decoders are `Clone` so that callers can backtrack.
pub trait Decoder<'a>: Clone {
    #[must_use]
    fn expect_eoi(&self) -> Option<()>;
    #[must_use]
    fn take_bytes(&mut self, len: usize) -> Option<&'a [u8]>;
    #[must_use]
    fn take_bytes_all(&mut self) -> Option<&'a [u8]>;

    #[must_use]
    fn expect_bytes(&mut self, bytes: &[u8]) -> Option<()> {
        self.take_bytes(bytes.len())
            .filter(|y| *y == bytes)
            .map(drop)
    }

    #[must_use]
    fn take_u8(&mut self) -> Option<u8> {
        Some(self.take_bytes(1)?[0])
    }

    #[must_use]
    fn take_u32be(&mut self) -> Option<u32> {
        let x = self.take_bytes(std::mem::size_of::<u32>())?;
        let mut y = [0; 4];
        y.copy_from_slice(x);
        Some(u32::from_be_bytes(y))
    }
}
