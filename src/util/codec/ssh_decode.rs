use super::*;

/// SSH specific decoding (inverse of [SshEncode]).
pub trait SshDecode: Sized {
    #[must_use]
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self>;
}

/// SSH specific decode that allows the result to contain references into the input.
pub trait SshDecodeRef<'a>: Sized {
    #[must_use]
    fn decode<D: SshDecoder<'a>>(d: &mut D) -> Option<Self>;
}

impl<'a, T: SshDecode> SshDecodeRef<'a> for T {
    fn decode<D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        SshDecode::decode(d)
    }
}

impl SshDecode for String {
    #[inline]
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        d.take_str_framed().map(String::from)
    }
}

impl SshDecode for Vec<u8> {
    #[inline]
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        d.take_bytes_framed().map(Vec::from)
    }
}

impl<'a> SshDecodeRef<'a> for &'a str {
    #[inline]
    fn decode<D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        d.take_str_framed()
    }
}

impl<'a> SshDecodeRef<'a> for &'a [u8] {
    #[inline]
    fn decode<D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        d.take_bytes_framed()
    }
}

impl<T: SshDecode, Q: SshDecode> SshDecode for (T, Q) {
    #[inline]
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        let t = SshDecode::decode(d)?;
        let q = SshDecode::decode(d)?;
        Some((t, q))
    }
}
