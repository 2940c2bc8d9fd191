//! Diagnostic merging.

use std::collections::HashSet;

use super::types::{Diagnostic, DiagnosticCode};

/// Merges diagnostic lists into one, keeping the first occurrence of each
/// `(domain, code)` pair in encounter order.
pub fn merge_diagnostics<I>(sources: I) -> Vec<Diagnostic>
where
    I: IntoIterator<Item = Diagnostic>,
{
    let mut seen: HashSet<(String, DiagnosticCode)> = HashSet::new();
    sources
        .into_iter()
        .filter(|diag| seen.insert((diag.domain.to_ascii_lowercase(), diag.code)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_first_per_domain_and_code() {
        let merged = merge_diagnostics(vec![
            Diagnostic::new("a.com", DiagnosticCode::DnsTimeout, "first"),
            Diagnostic::new("b.com", DiagnosticCode::DnsTimeout, "other domain"),
            Diagnostic::new("a.com", DiagnosticCode::DnsTimeout, "second"),
            Diagnostic::new("a.com", DiagnosticCode::NoSpfRecord, "other code"),
        ]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].message, "first");
        assert_eq!(merged[1].domain, "b.com");
        assert_eq!(merged[2].code, DiagnosticCode::NoSpfRecord);
    }

    #[test]
    fn test_merge_is_case_insensitive_on_domain() {
        let merged = merge_diagnostics(vec![
            Diagnostic::new("Example.COM", DiagnosticCode::DnsServFail, "x"),
            Diagnostic::new("example.com", DiagnosticCode::DnsServFail, "y"),
        ]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_diagnostics(Vec::new()).is_empty());
    }
}
