use super::*;
use crate::credential::{Credential, KeyType, PublicKey};
use crate::x509::CertificateParser;

/// Sign `data` with the credential's private key.
///
/// The returned blob carries the credential's key type as algorithm tag, so an X.509
/// credential signs as `x509v3-sign-rsa` while producing the same raw signature as the
/// plain key would.
pub fn sign(
    credential: &Credential,
    data: &[u8],
    provider: &dyn SignatureProvider,
) -> Result<SignatureBlob, SignatureError> {
    let key_type = credential.key_type();
    let algorithm = SignatureAlgorithm::for_key_type(key_type)
        .ok_or(SignatureError::UnsupportedKeyType(key_type))?;
    let key = credential
        .private_key()
        .ok_or(SignatureError::NoPrivateKey)?;
    let signature = provider.sign(key, algorithm, data)?;
    Ok(SignatureBlob::new(key_type.name(), signature))
}

/// Verify a wire envelope against the credential's public key.
///
/// The algorithm is derived from the envelope's tag. `Ok(false)` means the signature does
/// not match; errors are reserved for unknown tags, malformed input and provider failures.
pub fn verify(
    credential: &Credential,
    envelope: &[u8],
    data: &[u8],
    provider: &dyn SignatureProvider,
    parser: &dyn CertificateParser,
) -> Result<bool, SignatureError> {
    let blob = SignatureBlob::from_bytes(envelope).ok_or(SignatureError::MalformedEnvelope)?;
    let algorithm = SignatureAlgorithm::for_tag(blob.tag())
        .ok_or_else(|| SignatureError::UnknownAlgorithm(blob.tag().into()))?;
    let key = public_key(credential, parser)?;
    match provider.verify(&key, algorithm, blob.signature(), data) {
        VerifyResult::Verified => Ok(true),
        VerifyResult::NotVerified => {
            log::debug!("{} signature did not verify", blob.tag());
            Ok(false)
        }
        VerifyResult::InternalError => Err(SignatureError::Internal(format!(
            "cannot verify {} signature",
            blob.tag()
        ))),
    }
}

fn public_key(
    credential: &Credential,
    parser: &dyn CertificateParser,
) -> Result<PublicKey, SignatureError> {
    match credential {
        Credential::X509Rsa(x) | Credential::X509Dss(x) => parser
            .public_key(x.certificate().as_ref())
            .ok_or(SignatureError::NoPublicKey),
        Credential::Legacy1(_) => Err(SignatureError::UnsupportedKeyType(KeyType::Rsa1)),
        Credential::Rsa { .. } | Credential::Dsa { .. } => credential
            .plain_public_key()
            .ok_or(SignatureError::NoPublicKey),
    }
}
