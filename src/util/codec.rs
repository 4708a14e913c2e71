mod decoder;
mod encoder;
mod ref_decoder;
mod ref_encoder;
mod size_encoder;
mod ssh_decode;
mod ssh_decoder;
mod ssh_encode;
mod ssh_encoder;

pub use self::decoder::*;
pub use self::encoder::*;
pub use self::ref_decoder::*;
pub use self::ref_encoder::*;
pub use self::size_encoder::*;
pub use self::ssh_decode::*;
pub use self::ssh_decoder::*;
pub use self::ssh_encode::*;
pub use self::ssh_encoder::*;

use crate::util::check;

/// Entry point for encoding to and decoding from the SSH wire format.
pub struct SshCodec;

impl SshCodec {
    /// Calculate the encoded size without allocating.
    pub fn size<T: SshEncode>(x: &T) -> Option<usize> {
        let mut e = SizeEncoder::new();
        e.push(x)?;
        Some(e.into())
    }

    /// Encode into a freshly allocated vector of exactly the required size.
    pub fn encode<T: SshEncode>(x: &T) -> Option<Vec<u8>> {
        let mut vec = vec![0; Self::size(x)?];
        let mut e = RefEncoder::new(&mut vec);
        e.push(x)?;
        check(e.is_full())?;
        Some(vec)
    }

    /// Decode a value that must consume the whole input.
    pub fn decode<'a, T: SshDecodeRef<'a>>(x: &'a [u8]) -> Option<T> {
        let mut d = RefDecoder::new(x);
        let t = d.take()?;
        d.expect_eoi()?;
        Some(t)
    }
}
