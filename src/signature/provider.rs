use super::*;
use crate::credential::{DsaPublicKey, KeyHandle, PublicKey, RsaPublicKey};
use dsa::signature::{DigestSigner, DigestVerifier};
use rsa::{BigUint, Pkcs1v15Sign};
use sha1::{Digest, Sha1};

/// DER `DigestInfo` prefix for SHA-1 (RFC 8017, section 9.2).
const SHA1_DIGEST_INFO: [u8; 15] = [
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyResult {
    Verified,
    NotVerified,
    InternalError,
}

/// Raw signing and verification primitives.
pub trait SignatureProvider: Send + Sync {
    fn sign(
        &self,
        key: &KeyHandle,
        algorithm: SignatureAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, SignatureError>;

    fn verify(
        &self,
        key: &PublicKey,
        algorithm: SignatureAlgorithm,
        signature: &[u8],
        data: &[u8],
    ) -> VerifyResult;
}

/// Software signatures over SHA-1 digests.
///
/// RSA signatures use PKCS#1 v1.5 padding. DSA signatures are the concatenation `r || s`,
/// each half left-padded to the byte length of the subgroup order `q` (20 bytes for the
/// 1024/160 keys SSH uses). DSA nonces are derived deterministically (RFC 6979).
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftSignatureProvider;

impl SoftSignatureProvider {
    fn scheme() -> Pkcs1v15Sign {
        Pkcs1v15Sign {
            hash_len: Some(20),
            prefix: Box::new(SHA1_DIGEST_INFO),
        }
    }

    fn sign_rsa(key: &rsa::RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let hashed = Sha1::digest(data);
        key.sign(Self::scheme(), &hashed)
            .map_err(|e| SignatureError::Internal(e.to_string()))
    }

    fn sign_dsa(key: &dsa::SigningKey, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let signature: dsa::Signature = key
            .try_sign_digest(Sha1::new_with_prefix(data))
            .map_err(|e| SignatureError::Internal(e.to_string()))?;
        let half = (key.verifying_key().components().q().bits() + 7) / 8;
        let mut out = vec![0; 2 * half];
        let (r, s) = out.split_at_mut(half);
        put_uint(r, signature.r())
            .and_then(|_| put_uint(s, signature.s()))
            .ok_or_else(|| SignatureError::Internal("DSA signature exceeds q".into()))?;
        Ok(out)
    }

    fn verify_rsa(key: &RsaPublicKey, signature: &[u8], data: &[u8]) -> VerifyResult {
        let key = match rsa::RsaPublicKey::new(
            BigUint::from_bytes_be(key.n()),
            BigUint::from_bytes_be(key.e()),
        ) {
            Ok(k) => k,
            Err(e) => {
                log::debug!("unusable RSA key: {}", e);
                return VerifyResult::InternalError;
            }
        };
        let hashed = Sha1::digest(data);
        match key.verify(Self::scheme(), &hashed, signature) {
            Ok(()) => VerifyResult::Verified,
            Err(_) => VerifyResult::NotVerified,
        }
    }

    fn verify_dsa(key: &DsaPublicKey, signature: &[u8], data: &[u8]) -> VerifyResult {
        let half = key.signature_half_len();
        if half == 0 || signature.len() != 2 * half {
            log::debug!("DSA signature of {} bytes, expected {}", signature.len(), 2 * half);
            return VerifyResult::NotVerified;
        }
        let vk = match key.to_verifying_key() {
            Some(k) => k,
            None => {
                log::debug!("unusable DSA key");
                return VerifyResult::InternalError;
            }
        };
        let (r, s) = signature.split_at(half);
        let signature = match dsa::Signature::from_components(
            dsa::BigUint::from_bytes_be(r),
            dsa::BigUint::from_bytes_be(s),
        ) {
            Ok(x) => x,
            Err(_) => return VerifyResult::NotVerified,
        };
        match vk.verify_digest(Sha1::new_with_prefix(data), &signature) {
            Ok(()) => VerifyResult::Verified,
            Err(_) => VerifyResult::NotVerified,
        }
    }
}

/// Write `x` big-endian into `out`, left-padded with zeros.
fn put_uint(out: &mut [u8], x: &dsa::BigUint) -> Option<()> {
    let bytes = x.to_bytes_be();
    let offset = out.len().checked_sub(bytes.len())?;
    out[..offset].fill(0);
    out[offset..].copy_from_slice(&bytes);
    Some(())
}

impl SignatureProvider for SoftSignatureProvider {
    fn sign(
        &self,
        key: &KeyHandle,
        algorithm: SignatureAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, SignatureError> {
        match (algorithm, key.rsa(), key.dsa()) {
            (SignatureAlgorithm::RsaSha1, Some(k), _) => Self::sign_rsa(k, data),
            (SignatureAlgorithm::DsaSha1, _, Some(k)) => Self::sign_dsa(k, data),
            _ => Err(SignatureError::UnsupportedKeyType(key.key_type())),
        }
    }

    fn verify(
        &self,
        key: &PublicKey,
        algorithm: SignatureAlgorithm,
        signature: &[u8],
        data: &[u8],
    ) -> VerifyResult {
        match (algorithm, key) {
            (SignatureAlgorithm::RsaSha1, PublicKey::Rsa(k) | PublicKey::Rsa1(k)) => {
                Self::verify_rsa(k, signature, data)
            }
            (SignatureAlgorithm::DsaSha1, PublicKey::Dsa(k)) => {
                Self::verify_dsa(k, signature, data)
            }
            _ => VerifyResult::NotVerified,
        }
    }
}
