use crate::util::codec::*;

/// A signature together with its algorithm tag, as sent on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureBlob {
    tag: String,
    signature: Vec<u8>,
}

impl SignatureBlob {
    pub fn new(tag: &str, signature: Vec<u8>) -> Self {
        Self {
            tag: tag.into(),
            signature,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The wire envelope: tag string followed by the length-prefixed signature.
    pub fn to_bytes(&self) -> Vec<u8> {
        SshCodec::encode(self).unwrap_or_default()
    }

    pub fn from_bytes(envelope: &[u8]) -> Option<Self> {
        SshCodec::decode(envelope)
    }
}

impl SshEncode for SignatureBlob {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        e.push_str_framed(&self.tag)?;
        e.push_bytes_framed(&self.signature)
    }
}

impl SshDecode for SignatureBlob {
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        let tag = d.take_str_framed()?;
        let signature = d.take_bytes_framed()?;
        Some(Self::new(tag, signature.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes_01() {
        let blob = SignatureBlob::new("ssh-rsa", vec![1, 2, 3]);
        let expected = [
            0, 0, 0, 7, b's', b's', b'h', b'-', b'r', b's', b'a', 0, 0, 0, 3, 1, 2, 3,
        ];
        assert_eq!(blob.to_bytes(), &expected[..]);
        assert_eq!(SignatureBlob::from_bytes(&expected), Some(blob));
    }

    #[test]
    fn test_from_bytes_truncated() {
        let x = [0, 0, 0, 7, b's', b's', b'h', b'-', b'r', b's', b'a', 0, 0, 0, 3, 1, 2];
        assert_eq!(SignatureBlob::from_bytes(&x), None);
    }
}
