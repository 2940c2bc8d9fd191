//! Raw record types.

use serde::Serialize;

/// Which policy a TXT record is being read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Spf,
    Dkim,
    Dmarc,
}

impl RecordType {
    /// Whether a TXT string at the queried name can be a record of this type.
    ///
    /// SPF shares its name with arbitrary TXT data, so only strings starting
    /// with the `v=spf1` version term qualify. DKIM and DMARC live at
    /// dedicated names, so every string there is a candidate and version
    /// checks happen in the parsers.
    pub fn is_candidate(&self, text: &str) -> bool {
        match self {
            RecordType::Spf => is_spf_record(text),
            RecordType::Dkim | RecordType::Dmarc => true,
        }
    }
}

/// Check if a TXT record is an SPF record (case-insensitive v=spf1 prefix).
fn is_spf_record(txt: &str) -> bool {
    let lower = txt.trim().to_ascii_lowercase();
    lower
        .strip_prefix("v=spf1")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// A TXT string as fetched from DNS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    pub domain: String,
    pub record_type: RecordType,
    pub text: String,
}

impl RawRecord {
    pub fn new(domain: impl Into<String>, record_type: RecordType, text: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_type,
            text: text.into(),
        }
    }
}
