use std::path::PathBuf;

const URI_SCHEME: &str = "pkcs11:";

const MAX_TOKEN_LEN: usize = 32;
const MAX_MANUFACTURER_LEN: usize = 32;
const MAX_MODEL_LEN: usize = 16;
const MAX_SERIAL_LEN: usize = 16;
const MAX_OBJECT_LEN: usize = 256;
const MAX_PIN_FILE_LEN: usize = 4096;

/// Parsed form of a `pkcs11:` credential locator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialReference {
    /// Token label.
    pub token: String,
    /// Object label within the token.
    pub object: String,
    /// File holding the token PIN.
    pub pin_file: Option<PathBuf>,
    pub manufacturer: Option<String>,
    pub serial: Option<String>,
    pub model: Option<String>,
    pub object_type: Option<ObjectType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectType {
    Private,
    Cert,
    Public,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    /// The locator is not a token reference (most likely a file path).
    NotATokenReference,
    Malformed(String),
    MissingRequiredFields,
}

impl std::error::Error for ReferenceError {}

impl std::fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotATokenReference => write!(f, "not a token reference"),
            Self::Malformed(e) => write!(f, "malformed token reference: {}", e),
            Self::MissingRequiredFields => {
                write!(f, "token reference requires both token and object")
            }
        }
    }
}

/// Parse a credential locator of the form `pkcs11:token=...;object=...[;pinfile=...]`.
///
/// Callers treat [ReferenceError::NotATokenReference] as a hint to load the locator as a file.
pub fn resolve_reference(locator: &str) -> Result<CredentialReference, ReferenceError> {
    let path = locator
        .strip_prefix(URI_SCHEME)
        .ok_or(ReferenceError::NotATokenReference)?;
    let mut token = None;
    let mut object = None;
    let mut r = CredentialReference::default();
    if !path.is_empty() {
        for attr in path.split(';') {
            let (name, value) = attr
                .split_once('=')
                .ok_or_else(|| malformed(format!("attribute without value: {:?}", attr)))?;
            let value = percent_decode(value)?;
            if value.is_empty() {
                return Err(malformed(format!("empty value for {}", name)));
            }
            match name {
                "token" => set_once(&mut token, name, value, MAX_TOKEN_LEN)?,
                "object" => set_once(&mut object, name, value, MAX_OBJECT_LEN)?,
                "manufacturer" => {
                    set_once(&mut r.manufacturer, name, value, MAX_MANUFACTURER_LEN)?
                }
                "serial" => set_once(&mut r.serial, name, value, MAX_SERIAL_LEN)?,
                "model" => set_once(&mut r.model, name, value, MAX_MODEL_LEN)?,
                "pinfile" => {
                    let mut file = None;
                    set_once(&mut file, name, value, MAX_PIN_FILE_LEN)?;
                    if r.pin_file.is_some() {
                        return Err(malformed(format!("repeated attribute {}", name)));
                    }
                    r.pin_file = file.map(PathBuf::from);
                }
                "type" => {
                    if r.object_type.is_some() {
                        return Err(malformed(format!("repeated attribute {}", name)));
                    }
                    r.object_type = Some(match value.as_str() {
                        "private" => ObjectType::Private,
                        "cert" => ObjectType::Cert,
                        "public" => ObjectType::Public,
                        _ => return Err(malformed(format!("unknown object type {:?}", value))),
                    });
                }
                _ => return Err(malformed(format!("unknown attribute {:?}", name))),
            }
        }
    }
    match (token, object) {
        (Some(token), Some(object)) => {
            r.token = token;
            r.object = object;
            Ok(r)
        }
        _ => Err(ReferenceError::MissingRequiredFields),
    }
}

fn malformed(e: String) -> ReferenceError {
    ReferenceError::Malformed(e)
}

fn set_once(
    slot: &mut Option<String>,
    name: &str,
    value: String,
    max: usize,
) -> Result<(), ReferenceError> {
    if slot.is_some() {
        return Err(malformed(format!("repeated attribute {}", name)));
    }
    if value.len() > max {
        return Err(malformed(format!("{} exceeds {} bytes", name, max)));
    }
    *slot = Some(value);
    Ok(())
}

fn percent_decode(s: &str) -> Result<String, ReferenceError> {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next().and_then(|x| (x as char).to_digit(16));
            let lo = bytes.next().and_then(|x| (x as char).to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => out.push((hi * 16 + lo) as u8),
                _ => return Err(malformed(format!("bad percent escape in {:?}", s))),
            }
        } else {
            out.push(b)
        }
    }
    String::from_utf8(out).map_err(|_| malformed(format!("not UTF-8: {:?}", s)))
}
