use x509_parser::x509::X509Name;

/// A distinguished name: the display string plus the normalized relative distinguished names
/// used for comparison.
///
/// Two names are equal if they have the same attributes in the same order with values that
/// are equal after trimming, collapsing inner whitespace and ASCII case folding.
#[derive(Clone, Debug)]
pub struct DistinguishedName {
    display: String,
    rdns: Vec<Vec<(String, String)>>,
}

impl DistinguishedName {
    pub fn from_x509(name: &X509Name<'_>) -> Self {
        let rdns = name
            .iter()
            .map(|rdn| {
                rdn.iter()
                    .map(|attr| {
                        let value = match attr.as_str() {
                            Ok(s) => normalize(s),
                            Err(_) => hex(attr.attr_value().as_bytes()),
                        };
                        (attr.attr_type().to_id_string(), value)
                    })
                    .collect()
            })
            .collect();
        Self {
            display: name.to_string(),
            rdns,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        self.rdns == other.rdns
    }
}

impl Eq for DistinguishedName {}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn hex(x: &[u8]) -> String {
    let mut s = String::from("#");
    for b in x {
        s.push_str(&format!("{:02x}", b));
    }
    s
}
