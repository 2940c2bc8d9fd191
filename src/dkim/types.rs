//! DKIM data model.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error_handling::{Diagnostic, DiagnosticCode, DnsError, ParseError};
use crate::record::TagList;

/// Key type assumed when a record has no `k=` tag (RFC 6376 section 3.6.1).
pub const DEFAULT_KEY_TYPE: &str = "rsa";

/// Outcome of probing one selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DkimSelectorResult {
    pub selector: String,
    /// DNS name that was queried (`<selector>._domainkey.<domain>`).
    pub name: String,
    /// True when a DKIM record exists at `name` and its key is not revoked.
    pub found: bool,
    pub tags: BTreeMap<String, String>,
    /// True iff a non-empty `p=` tag is present.
    pub public_key_present: bool,
    /// True when the record publishes an empty `p=`, i.e. the key was revoked.
    pub revoked: bool,
    pub key_type: Option<String>,
    /// Rough key size: base64 payload length times six.
    pub key_bits_approx: Option<u32>,
    pub raw: Option<String>,
    /// DNS failure other than "no such record", if the probe failed.
    pub error: Option<DnsError>,
    pub parse_errors: Vec<ParseError>,
}

impl DkimSelectorResult {
    /// A probe that found nothing at `name`.
    pub fn not_found(selector: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            name: name.into(),
            found: false,
            tags: BTreeMap::new(),
            public_key_present: false,
            revoked: false,
            key_type: None,
            key_bits_approx: None,
            raw: None,
            error: None,
            parse_errors: Vec::new(),
        }
    }

    /// A probe whose query failed.
    pub fn failed(selector: impl Into<String>, name: impl Into<String>, error: DnsError) -> Self {
        Self {
            error: Some(error),
            ..Self::not_found(selector, name)
        }
    }

    /// Builds the result for a TXT record found at `name`.
    pub fn from_record(selector: impl Into<String>, name: impl Into<String>, text: &str) -> Self {
        let TagList { tags, errors, .. } = crate::record::tokenize_tags(text, ';');
        let key = tags.get("p").map(|p| strip_whitespace(p));
        let public_key_present = key.as_deref().is_some_and(|p| !p.is_empty());
        let revoked = key.as_deref().is_some_and(str::is_empty);
        let key_bits_approx = key
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(approximate_key_bits);
        let key_type = public_key_present.then(|| {
            tags.get("k")
                .cloned()
                .unwrap_or_else(|| DEFAULT_KEY_TYPE.to_string())
        });

        Self {
            found: !revoked,
            public_key_present,
            revoked,
            key_type,
            key_bits_approx,
            raw: Some(text.to_string()),
            tags,
            parse_errors: errors,
            ..Self::not_found(selector, name)
        }
    }

    /// Findings for this probe, attributed to the probed DNS name.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        if let Some(error) = &self.error {
            out.push(Diagnostic::from_dns(&self.name, error));
        }
        if self.revoked {
            out.push(Diagnostic::new(
                &self.name,
                DiagnosticCode::RevokedDkimKey,
                format!("selector {} publishes an empty p= tag", self.selector),
            ));
        }
        out.extend(
            self.parse_errors
                .iter()
                .map(|e| Diagnostic::from_parse(&self.name, e)),
        );
        out
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Base64 carries six bits per character; padding carries none.
fn approximate_key_bits(key: &str) -> u32 {
    let chars = key.trim_end_matches('=').len();
    u32::try_from(chars).unwrap_or(u32::MAX).saturating_mul(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_key() {
        let result = DkimSelectorResult::from_record(
            "s1",
            "s1._domainkey.example.com",
            "v=DKIM1; k=rsa; p=MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQ==",
        );
        assert!(result.found);
        assert!(result.public_key_present);
        assert!(!result.revoked);
        assert_eq!(result.key_type.as_deref(), Some("rsa"));
        assert_eq!(result.key_bits_approx, Some(38 * 6));
        assert_eq!(result.tags["v"], "DKIM1");
        assert!(result.diagnostics().is_empty());
    }

    #[test]
    fn test_key_split_across_strings_is_joined() {
        let result =
            DkimSelectorResult::from_record("s1", "s1._domainkey.example.com", "p=AAAA BBBB\tCC");
        assert_eq!(result.tags["p"], "AAAA BBBB\tCC");
        assert_eq!(result.key_bits_approx, Some(60));
    }

    #[test]
    fn test_key_type_defaults_to_rsa() {
        let result = DkimSelectorResult::from_record("s1", "n", "v=DKIM1; p=AAAA");
        assert_eq!(result.key_type.as_deref(), Some(DEFAULT_KEY_TYPE));

        let result = DkimSelectorResult::from_record("s1", "n", "v=DKIM1; k=ed25519; p=AAAA");
        assert_eq!(result.key_type.as_deref(), Some("ed25519"));
    }

    #[test]
    fn test_empty_p_is_revoked_not_present() {
        let result = DkimSelectorResult::from_record(
            "old",
            "old._domainkey.example.com",
            "v=DKIM1; p=",
        );
        assert!(!result.found);
        assert!(!result.public_key_present);
        assert!(result.revoked);
        assert_eq!(result.key_bits_approx, None);
        assert_eq!(result.raw.as_deref(), Some("v=DKIM1; p="));
        assert_eq!(result.tags["v"], "DKIM1");

        let diagnostics = result.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::RevokedDkimKey);
        assert_eq!(diagnostics[0].domain, "old._domainkey.example.com");
    }

    #[test]
    fn test_record_without_p_tag() {
        let result = DkimSelectorResult::from_record("s1", "n", "v=DKIM1; k=rsa");
        assert!(result.found);
        assert!(!result.public_key_present);
        assert!(!result.revoked);
        assert_eq!(result.key_type, None);
    }

    #[test]
    fn test_failed_probe_reports_dns_error() {
        let result = DkimSelectorResult::failed("s1", "s1._domainkey.example.com", DnsError::ServFail);
        assert!(!result.found);
        assert_eq!(
            result.diagnostics()[0].code,
            DiagnosticCode::DnsServFail
        );
    }

    #[test]
    fn test_malformed_tags_are_reported() {
        let result = DkimSelectorResult::from_record("s1", "n", "v=DKIM1; garbage; p=AAAA");
        assert!(result.public_key_present);
        assert_eq!(
            result.diagnostics()[0].code,
            DiagnosticCode::MalformedTag
        );
    }
}
