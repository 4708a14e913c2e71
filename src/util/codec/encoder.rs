use sha2::Digest;

/// Sink for a sequence of basic encoding operations: a byte buffer, a size counter or a hash
/// function computing a key fingerprint.
///
/// Only [Encoder::push_bytes] must be provided. All operations return `None` when the sink
/// runs out of capacity.
pub trait Encoder: Sized {
    #[must_use]
    fn push_bytes(&mut self, x: &[u8]) -> Option<()>;

    #[must_use]
    fn push_u8(&mut self, x: u8) -> Option<()> {
        self.push_bytes(&[x])
    }

    /// Push a `u32` in big-endian representation.
    #[must_use]
    fn push_u32be(&mut self, x: u32) -> Option<()> {
        self.push_bytes(&x.to_be_bytes())
    }
}

impl<D: Digest> Encoder for D {
    fn push_bytes(&mut self, x: &[u8]) -> Option<()> {
        self.update(x);
        Some(())
    }
}
