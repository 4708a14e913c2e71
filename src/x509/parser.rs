use super::*;
use crate::credential::{DsaPublicKey, PublicKey, RsaPublicKey};
use rsa::pkcs8::DecodePublicKey;
use crate::util::check;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::pem::Pem;
use x509_parser::public_key::PublicKey as SpkiKey;

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_DSA: &str = "1.2.840.10040.4.1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublicKeyAlgorithm {
    Rsa,
    Dsa,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameMatch {
    Matched,
    /// Carries the name the certificate maps to, if it has any.
    NotMatched(Option<String>),
}

/// Reasons a chain check failed. All flags clear means the certificate is valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainCheck {
    pub missing_anchor: bool,
    pub bad_signature: bool,
    pub bad_time: bool,
    pub malformed: bool,
}

impl ChainCheck {
    pub fn is_ok(&self) -> bool {
        *self == Self::default()
    }
}

/// DER certificate decoding and field extraction.
pub trait CertificateParser: Send + Sync {
    fn is_certificate(&self, bytes: &[u8]) -> bool;

    /// All certificates in a DER blob or a PEM bundle, as DER.
    fn certificates(&self, bytes: &[u8]) -> Vec<Vec<u8>>;

    /// The first certificate in a DER blob or PEM bundle.
    fn to_der(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        self.certificates(bytes).into_iter().next()
    }

    fn subject(&self, cert: &[u8]) -> Option<DistinguishedName>;

    fn issuer(&self, cert: &[u8]) -> Option<DistinguishedName>;

    fn public_key_algorithm(&self, cert: &[u8]) -> PublicKeyAlgorithm;

    /// The subject public key as a plain key.
    fn public_key(&self, cert: &[u8]) -> Option<PublicKey>;

    /// Match a host or user name against the certificate's DNS subject alternative names and
    /// subject common names, ignoring ASCII case.
    fn match_name(&self, cert: &[u8], candidate: &str) -> NameMatch;

    /// Check signature and validity against the given trust anchors.
    fn check_chain(&self, cert: &[u8], anchors: &[Vec<u8>], policy: &ValidationPolicy)
        -> ChainCheck;
}

/// [CertificateParser] backed by `x509-parser`.
#[derive(Clone, Copy, Debug, Default)]
pub struct X509Parser;

impl X509Parser {
    fn parse(bytes: &[u8]) -> Option<X509Certificate<'_>> {
        let (rest, cert) = x509_parser::parse_x509_certificate(bytes).ok()?;
        check(rest.is_empty())?;
        Some(cert)
    }

    fn common_names(cert: &X509Certificate<'_>) -> Vec<String> {
        cert.subject()
            .iter_common_name()
            .filter_map(|attr| attr.as_str().ok())
            .map(String::from)
            .collect()
    }

    fn dns_names(cert: &X509Certificate<'_>) -> Vec<String> {
        let mut names = vec![];
        if let Ok(Some(san)) = cert.subject_alternative_name() {
            for name in &san.value.general_names {
                if let GeneralName::DNSName(name) = name {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    fn is_self_issued(cert: &X509Certificate<'_>) -> bool {
        DistinguishedName::from_x509(cert.subject()) == DistinguishedName::from_x509(cert.issuer())
    }
}

impl CertificateParser for X509Parser {
    fn is_certificate(&self, bytes: &[u8]) -> bool {
        Self::parse(bytes).is_some()
    }

    fn certificates(&self, bytes: &[u8]) -> Vec<Vec<u8>> {
        if self.is_certificate(bytes) {
            return vec![bytes.to_vec()];
        }
        Pem::iter_from_buffer(bytes)
            .map_while(Result::ok)
            .filter(|pem| pem.label == "CERTIFICATE" || pem.label == "TRUSTED CERTIFICATE")
            .map(|pem| pem.contents)
            .filter(|der| self.is_certificate(der))
            .collect()
    }

    fn subject(&self, cert: &[u8]) -> Option<DistinguishedName> {
        Some(DistinguishedName::from_x509(Self::parse(cert)?.subject()))
    }

    fn issuer(&self, cert: &[u8]) -> Option<DistinguishedName> {
        Some(DistinguishedName::from_x509(Self::parse(cert)?.issuer()))
    }

    fn public_key_algorithm(&self, cert: &[u8]) -> PublicKeyAlgorithm {
        let cert = match Self::parse(cert) {
            Some(x) => x,
            None => return PublicKeyAlgorithm::Other,
        };
        match cert.public_key().algorithm.algorithm.to_id_string().as_str() {
            OID_RSA_ENCRYPTION => PublicKeyAlgorithm::Rsa,
            OID_DSA => PublicKeyAlgorithm::Dsa,
            _ => PublicKeyAlgorithm::Other,
        }
    }

    fn public_key(&self, cert: &[u8]) -> Option<PublicKey> {
        let cert = Self::parse(cert)?;
        let spki = cert.public_key();
        match spki.parsed().ok()? {
            SpkiKey::RSA(k) => Some(PublicKey::Rsa(RsaPublicKey::new(k.exponent, k.modulus))),
            SpkiKey::DSA(_) => {
                let key = dsa::VerifyingKey::from_public_key_der(spki.raw).ok()?;
                Some(PublicKey::Dsa(DsaPublicKey::from(&key)))
            }
            _ => None,
        }
    }

    fn match_name(&self, cert: &[u8], candidate: &str) -> NameMatch {
        let cert = match Self::parse(cert) {
            Some(x) => x,
            None => return NameMatch::NotMatched(None),
        };
        let cns = Self::common_names(&cert);
        let dns = Self::dns_names(&cert);
        if dns.iter().chain(cns.iter()).any(|n| n.eq_ignore_ascii_case(candidate)) {
            NameMatch::Matched
        } else {
            NameMatch::NotMatched(cns.into_iter().chain(dns).next())
        }
    }

    fn check_chain(
        &self,
        cert: &[u8],
        anchors: &[Vec<u8>],
        policy: &ValidationPolicy,
    ) -> ChainCheck {
        let mut r = ChainCheck::default();
        let cert = match Self::parse(cert) {
            Some(x) => x,
            None => {
                r.malformed = true;
                return r;
            }
        };
        if !policy.ignore_date && !cert.validity().is_valid() {
            r.bad_time = true;
        }
        if Self::is_self_issued(&cert) {
            r.bad_signature = cert.verify_signature(None).is_err();
            return r;
        }
        let issuer = DistinguishedName::from_x509(cert.issuer());
        let candidates: Vec<X509Certificate<'_>> = anchors
            .iter()
            .filter_map(|der| Self::parse(der))
            .filter(|a| DistinguishedName::from_x509(a.subject()) == issuer)
            .collect();
        if candidates.is_empty() {
            r.missing_anchor = true;
            return r;
        }
        match candidates
            .iter()
            .find(|a| cert.verify_signature(Some(a.public_key())).is_ok())
        {
            Some(anchor) => {
                if policy.check_anchor_date && !anchor.validity().is_valid() {
                    r.bad_time = true;
                }
            }
            None => r.bad_signature = true,
        }
        r
    }
}
