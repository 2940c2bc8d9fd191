//! Record tokenizer.
//!
//! Both tokenizers are pure: the same text always yields the same tokens, and
//! malformed input is reported alongside the result instead of aborting it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error_handling::ParseError;
use crate::spf::{MechanismKind, Qualifier, SpfMechanism};

/// Splits an SPF record into its terms.
///
/// The leading `v=spf1` version term is dropped. Every other whitespace
/// separated term becomes one [`SpfMechanism`], in record order; terms that
/// cannot be recognized are kept as [`MechanismKind::Unknown`] with their raw
/// text (see [`SpfMechanism::parse_error`]).
///
/// # Examples
///
/// ```
/// use email_posture::record::tokenize_spf;
/// use email_posture::spf::{MechanismKind, Qualifier};
///
/// let terms = tokenize_spf("v=spf1 include:_spf.example.com ~all");
/// assert_eq!(terms.len(), 2);
/// assert_eq!(terms[0].kind, MechanismKind::Include);
/// assert_eq!(terms[1].qualifier, Qualifier::SoftFail);
/// ```
pub fn tokenize_spf(text: &str) -> Vec<SpfMechanism> {
    let mut terms = text.split_whitespace().peekable();
    if terms
        .peek()
        .is_some_and(|first| first.eq_ignore_ascii_case("v=spf1"))
    {
        terms.next();
    }
    terms.map(tokenize_spf_term).collect()
}

fn tokenize_spf_term(token: &str) -> SpfMechanism {
    let unknown = || {
        SpfMechanism::new(
            Qualifier::Pass,
            MechanismKind::Unknown(token.to_string()),
            None,
        )
    };

    let (qualifier, term) = match token.chars().next().and_then(Qualifier::from_char) {
        Some(q) => (Some(q), &token[1..]),
        None => (None, token),
    };

    let name_end = term.find([':', '/', '=']).unwrap_or(term.len());
    let (name, rest) = term.split_at(name_end);

    // Modifier: name=value, never qualified
    if let Some(value) = rest.strip_prefix('=') {
        return match MechanismKind::from_modifier_name(name) {
            Some(kind) if qualifier.is_none() && !value.is_empty() => {
                SpfMechanism::new(Qualifier::Pass, kind, Some(value.to_string()))
            }
            _ => unknown(),
        };
    }

    let Some(kind) = MechanismKind::from_mechanism_name(name) else {
        return unknown();
    };
    let value = match rest.strip_prefix(':') {
        Some(value) => Some(value.to_string()),
        None if rest.starts_with('/') => Some(rest.to_string()),
        None => None,
    };
    let value_ok = match &value {
        Some(v) => !v.is_empty() && kind != MechanismKind::All,
        None => !kind.requires_value(),
    };
    if !value_ok {
        return unknown();
    }

    SpfMechanism::new(qualifier.unwrap_or(Qualifier::Pass), kind, value)
}

/// Result of splitting a `tag=value` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagList {
    /// Tag names in the order they first appeared.
    pub order: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub errors: Vec<ParseError>,
}

impl TagList {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// The first tag of the record, which DKIM and DMARC reserve for `v`.
    pub fn first(&self) -> Option<(&str, &str)> {
        let name = self.order.first()?;
        self.tags
            .get(name)
            .map(|value| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Splits `text` on `separator`, then each segment on its first `=`.
///
/// Names and values are trimmed. Empty segments (such as a trailing `;`) are
/// ignored. A segment without `=` or with an empty name is reported and
/// skipped. When a tag repeats, the first value is kept and the repeat is
/// reported.
///
/// # Examples
///
/// ```
/// use email_posture::record::tokenize_tags;
///
/// let list = tokenize_tags("v=DMARC1; p=reject; junk", ';');
/// assert_eq!(list.get("p"), Some("reject"));
/// assert_eq!(list.errors.len(), 1);
/// ```
pub fn tokenize_tags(text: &str, separator: char) -> TagList {
    let mut list = TagList::default();
    for segment in text.split(separator) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let Some((name, value)) = segment.split_once('=') else {
            list.errors
                .push(ParseError::MissingSeparator(segment.to_string()));
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            list.errors.push(ParseError::EmptyTagName(segment.to_string()));
            continue;
        }
        if list.tags.contains_key(name) {
            list.errors.push(ParseError::DuplicateTag(name.to_string()));
            continue;
        }
        list.order.push(name.to_string());
        list.tags.insert(name.to_string(), value.trim().to_string());
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_include_and_softfail_all() {
        let terms = tokenize_spf("v=spf1 include:_spf.example.com ~all");
        assert_eq!(
            terms,
            vec![
                SpfMechanism::new(
                    Qualifier::Pass,
                    MechanismKind::Include,
                    Some("_spf.example.com".to_string())
                ),
                SpfMechanism::new(Qualifier::SoftFail, MechanismKind::All, None),
            ]
        );
        assert_eq!(terms[0].domain_lookups_cost, 1);
        assert_eq!(terms[1].domain_lookups_cost, 0);
    }

    #[test]
    fn test_tokenize_every_qualifier() {
        let terms = tokenize_spf("v=spf1 +a -mx ~ptr ?exists:%{i}.example.com");
        let qualifiers: Vec<Qualifier> = terms.iter().map(|t| t.qualifier).collect();
        assert_eq!(
            qualifiers,
            vec![
                Qualifier::Pass,
                Qualifier::Fail,
                Qualifier::SoftFail,
                Qualifier::Neutral
            ]
        );
        assert!(terms.iter().all(|t| t.domain_lookups_cost == 1));
    }

    #[test]
    fn test_tokenize_ip_mechanisms_cost_nothing() {
        let terms = tokenize_spf("v=spf1 ip4:192.0.2.0/24 ip6:2001:db8::/32 -all");
        assert_eq!(terms[0].kind, MechanismKind::Ip4);
        assert_eq!(terms[0].value.as_deref(), Some("192.0.2.0/24"));
        assert_eq!(terms[1].kind, MechanismKind::Ip6);
        assert_eq!(terms[1].value.as_deref(), Some("2001:db8::/32"));
        assert_eq!(terms.iter().map(|t| t.domain_lookups_cost).sum::<u32>(), 0);
    }

    #[test]
    fn test_tokenize_cidr_only_suffix() {
        let terms = tokenize_spf("v=spf1 a/24 mx:mail.example.com/28");
        assert_eq!(terms[0].kind, MechanismKind::A);
        assert_eq!(terms[0].value.as_deref(), Some("/24"));
        assert_eq!(terms[1].value.as_deref(), Some("mail.example.com/28"));
    }

    #[test]
    fn test_tokenize_modifiers() {
        let terms = tokenize_spf("v=spf1 redirect=_spf.example.com exp=explain.example.com");
        assert_eq!(terms[0].kind, MechanismKind::Redirect);
        assert_eq!(terms[0].value.as_deref(), Some("_spf.example.com"));
        assert_eq!(terms[0].domain_lookups_cost, 1);
        assert_eq!(terms[1].kind, MechanismKind::Explanation);
        assert_eq!(terms[1].domain_lookups_cost, 0);
    }

    #[test]
    fn test_tokenize_is_case_insensitive() {
        let terms = tokenize_spf("V=SPF1 INCLUDE:Example.com -ALL");
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].kind, MechanismKind::Include);
        assert_eq!(terms[1].kind, MechanismKind::All);
    }

    #[test]
    fn test_unknown_mechanism_is_preserved() {
        let terms = tokenize_spf("v=spf1 foo:bar.com -all");
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].kind, MechanismKind::Unknown("foo:bar.com".to_string()));
        assert_eq!(terms[0].domain_lookups_cost, 0);
        assert_eq!(
            terms[0].parse_error(),
            Some(ParseError::UnknownMechanism("foo:bar.com".to_string()))
        );
        assert_eq!(terms[1].parse_error(), None);
    }

    #[test]
    fn test_unknown_modifier_is_preserved_without_error() {
        let terms = tokenize_spf("v=spf1 moo=cow -all");
        assert_eq!(terms[0].kind, MechanismKind::Unknown("moo=cow".to_string()));
        assert_eq!(terms[0].parse_error(), None);
    }

    #[test]
    fn test_mechanism_missing_value_is_reported() {
        let terms = tokenize_spf("v=spf1 include -all");
        assert_eq!(terms[0].kind, MechanismKind::Unknown("include".to_string()));
        assert_eq!(
            terms[0].parse_error(),
            Some(ParseError::MissingValue("include".to_string()))
        );

        let terms = tokenize_spf("v=spf1 redirect=");
        assert_eq!(
            terms[0].parse_error(),
            Some(ParseError::MissingValue("redirect".to_string()))
        );
    }

    #[test]
    fn test_qualified_modifier_is_unknown() {
        let terms = tokenize_spf("v=spf1 -redirect=example.com");
        assert!(matches!(terms[0].kind, MechanismKind::Unknown(_)));
        assert_eq!(
            terms[0].parse_error(),
            Some(ParseError::UnknownMechanism("-redirect=example.com".to_string()))
        );
    }

    #[test]
    fn test_all_with_value_is_unknown() {
        let terms = tokenize_spf("v=spf1 all:example.com");
        assert_eq!(
            terms[0].parse_error(),
            Some(ParseError::UnknownMechanism("all:example.com".to_string()))
        );
    }

    #[test]
    fn test_tokenize_without_version_term() {
        let terms = tokenize_spf("include:example.com -all");
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "v=spf1 a mx include:x.example ip4:192.0.2.1 ~all";
        assert_eq!(tokenize_spf(text), tokenize_spf(text));
        assert_eq!(tokenize_tags(text, ' '), tokenize_tags(text, ' '));
    }

    #[test]
    fn test_to_term_renders_record_syntax() {
        let rendered: Vec<String> = tokenize_spf("v=spf1 a/24 -include:x.example ~all redirect=y.example")
            .iter()
            .map(SpfMechanism::to_term)
            .collect();
        assert_eq!(
            rendered,
            vec!["a/24", "-include:x.example", "~all", "redirect=y.example"]
        );
    }

    #[test]
    fn test_tokenize_tags_trims_both_sides() {
        let list = tokenize_tags(" v = DMARC1 ;p=reject;  rua = mailto:a@x.com ; ", ';');
        assert_eq!(list.get("v"), Some("DMARC1"));
        assert_eq!(list.get("p"), Some("reject"));
        assert_eq!(list.get("rua"), Some("mailto:a@x.com"));
        assert!(list.errors.is_empty());
        assert_eq!(list.first(), Some(("v", "DMARC1")));
    }

    #[test]
    fn test_tokenize_tags_splits_on_first_equals() {
        let list = tokenize_tags("p=MIIBIjAN==; h=sha256", ';');
        assert_eq!(list.get("p"), Some("MIIBIjAN=="));
    }

    #[test]
    fn test_tokenize_tags_skips_malformed_segments() {
        let list = tokenize_tags("v=DMARC1; garbage; =x; p=none", ';');
        assert_eq!(list.tags.len(), 2);
        assert_eq!(
            list.errors,
            vec![
                ParseError::MissingSeparator("garbage".to_string()),
                ParseError::EmptyTagName("=x".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_tags_keeps_first_duplicate() {
        let list = tokenize_tags("p=reject; p=none", ';');
        assert_eq!(list.get("p"), Some("reject"));
        assert_eq!(list.errors, vec![ParseError::DuplicateTag("p".to_string())]);
        assert_eq!(list.order, vec!["p"]);
    }

    #[test]
    fn test_tokenize_tags_empty_value_allowed() {
        let list = tokenize_tags("v=DKIM1; p=", ';');
        assert_eq!(list.get("p"), Some(""));
    }

    #[test]
    fn test_tokenize_tags_custom_separator() {
        let list = tokenize_tags("a=1,b=2", ',');
        assert_eq!(list.get("a"), Some("1"));
        assert_eq!(list.get("b"), Some("2"));
    }
}
