use super::KeyType;
use crate::util::codec::*;
use rsa::BigUint;
use sha2::{Digest, Sha256};

fn strip_zeros(mut x: &[u8]) -> &[u8] {
    while let Some(0) = x.first() {
        x = &x[1..];
    }
    x
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RsaPublicKey {
    e: Vec<u8>,
    n: Vec<u8>,
}

impl RsaPublicKey {
    pub const NAME: &'static str = "ssh-rsa";

    /// Create from unsigned big-endian exponent and modulus.
    pub fn new(e: &[u8], n: &[u8]) -> Self {
        Self {
            e: strip_zeros(e).into(),
            n: strip_zeros(n).into(),
        }
    }

    pub fn e(&self) -> &[u8] {
        &self.e
    }

    pub fn n(&self) -> &[u8] {
        &self.n
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        match self.n.first() {
            Some(x) => self.n.len() * 8 - x.leading_zeros() as usize,
            None => 0,
        }
    }
}

impl SshEncode for RsaPublicKey {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        e.push_str_framed(Self::NAME)?;
        e.push_mpint(&self.e)?;
        e.push_mpint(&self.n)
    }
}

impl SshDecode for RsaPublicKey {
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        d.expect_str_framed(Self::NAME)?;
        let e = d.take_mpint()?;
        let n = d.take_mpint()?;
        Some(Self::new(e, n))
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct DsaPublicKey {
    p: Vec<u8>,
    q: Vec<u8>,
    g: Vec<u8>,
    y: Vec<u8>,
}

impl DsaPublicKey {
    pub const NAME: &'static str = "ssh-dss";

    pub fn new(p: &[u8], q: &[u8], g: &[u8], y: &[u8]) -> Self {
        Self {
            p: strip_zeros(p).into(),
            q: strip_zeros(q).into(),
            g: strip_zeros(g).into(),
            y: strip_zeros(y).into(),
        }
    }

    pub fn p(&self) -> &[u8] {
        &self.p
    }

    pub fn q(&self) -> &[u8] {
        &self.q
    }

    pub fn g(&self) -> &[u8] {
        &self.g
    }

    pub fn y(&self) -> &[u8] {
        &self.y
    }

    /// Byte length of each of the two signature halves `r` and `s` (20 for the usual 160 bit
    /// subgroup).
    pub fn signature_half_len(&self) -> usize {
        self.q.len()
    }

    /// `None` if the parameters do not form a usable DSA key.
    pub fn to_verifying_key(&self) -> Option<dsa::VerifyingKey> {
        let int = |x: &[u8]| dsa::BigUint::from_bytes_be(x);
        let components =
            dsa::Components::from_components(int(&self.p), int(&self.q), int(&self.g)).ok()?;
        dsa::VerifyingKey::from_components(components, int(&self.y)).ok()
    }
}

impl From<&dsa::VerifyingKey> for DsaPublicKey {
    fn from(key: &dsa::VerifyingKey) -> Self {
        let c = key.components();
        Self::new(
            &c.p().to_bytes_be(),
            &c.q().to_bytes_be(),
            &c.g().to_bytes_be(),
            &key.y().to_bytes_be(),
        )
    }
}

impl SshEncode for DsaPublicKey {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        e.push_str_framed(Self::NAME)?;
        e.push_mpint(&self.p)?;
        e.push_mpint(&self.q)?;
        e.push_mpint(&self.g)?;
        e.push_mpint(&self.y)
    }
}

impl SshDecode for DsaPublicKey {
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        d.expect_str_framed(Self::NAME)?;
        let p = d.take_mpint()?;
        let q = d.take_mpint()?;
        let g = d.take_mpint()?;
        let y = d.take_mpint()?;
        Some(Self::new(p, q, g, y))
    }
}

/// A plain public key as stored in ledgers and compared during trust decisions.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum PublicKey {
    Rsa1(RsaPublicKey),
    Rsa(RsaPublicKey),
    Dsa(DsaPublicKey),
}

impl PublicKey {
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa1(_) => KeyType::Rsa1,
            Self::Rsa(_) => KeyType::Rsa,
            Self::Dsa(_) => KeyType::Dsa,
        }
    }

    /// SSH wire encoding. Protocol 1 keys are encoded like `ssh-rsa` keys.
    pub fn blob(&self) -> Vec<u8> {
        SshCodec::encode(self).unwrap_or_default()
    }

    /// Decode an `ssh-rsa` or `ssh-dss` key blob.
    pub fn from_blob(blob: &[u8]) -> Option<Self> {
        SshCodec::decode(blob)
    }

    /// `SHA256:` followed by the unpadded base64 SHA-256 digest of the key blob.
    pub fn fingerprint(&self) -> String {
        let mut sha = Sha256::new();
        // Digests never run out of capacity.
        let _ = sha.push(self);
        format!(
            "SHA256:{}",
            base64::encode_config(sha.finalize(), base64::STANDARD_NO_PAD)
        )
    }

    /// Parse the key portion of a `known_hosts` or `authorized_keys` line.
    ///
    /// Consumes `<type> <base64>` for SSH keys or `<bits> <e> <n>` for protocol 1 keys from
    /// the given whitespace separated fields.
    pub fn parse_fields<'a, I: Iterator<Item = &'a str>>(fields: &mut I) -> Option<Self> {
        let first = fields.next()?;
        if first.bytes().all(|c| c.is_ascii_digit()) {
            let e = BigUint::parse_bytes(fields.next()?.as_bytes(), 10)?;
            let n = BigUint::parse_bytes(fields.next()?.as_bytes(), 10)?;
            let key = RsaPublicKey::new(&e.to_bytes_be(), &n.to_bytes_be());
            if first.parse::<usize>().ok() != Some(key.bits()) {
                log::debug!("RSA1 key size field does not match modulus: {}", first);
            }
            return Some(Self::Rsa1(key));
        }
        let blob = base64::decode(fields.next()?).ok()?;
        let key = Self::from_blob(&blob)?;
        crate::util::check(key.key_type().name() == first)?;
        Some(key)
    }

    /// The inverse of [Self::parse_fields].
    pub fn to_line(&self) -> String {
        match self {
            Self::Rsa1(k) => format!(
                "{} {} {}",
                k.bits(),
                BigUint::from_bytes_be(k.e()).to_str_radix(10),
                BigUint::from_bytes_be(k.n()).to_str_radix(10)
            ),
            _ => format!("{} {}", self.key_type(), base64::encode(self.blob())),
        }
    }
}

impl SshEncode for PublicKey {
    fn encode<E: SshEncoder>(&self, e: &mut E) -> Option<()> {
        match self {
            Self::Rsa1(k) | Self::Rsa(k) => k.encode(e),
            Self::Dsa(k) => k.encode(e),
        }
    }
}

impl SshDecode for PublicKey {
    fn decode<'a, D: SshDecoder<'a>>(d: &mut D) -> Option<Self> {
        let tag = d.clone().take_str_framed()?;
        match tag {
            RsaPublicKey::NAME => Some(Self::Rsa(SshDecode::decode(d)?)),
            DsaPublicKey::NAME => Some(Self::Dsa(SshDecode::decode(d)?)),
            _ => None,
        }
    }
}
