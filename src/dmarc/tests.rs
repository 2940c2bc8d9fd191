//! DMARC parser tests.

use super::*;
use crate::dns::MockGateway;
use crate::error_handling::{DiagnosticCode, DnsError};

const NAME: &str = "_dmarc.example.com";

fn codes(lookup: &DmarcLookup) -> Vec<DiagnosticCode> {
    lookup.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_parse_reject_with_pct_and_rua() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=reject; pct=50; rua=mailto:a@x.com");
    let record = lookup.record.as_ref().unwrap();

    assert_eq!(record.version, "DMARC1");
    assert_eq!(record.policy, Some(DmarcPolicy::Reject));
    assert_eq!(record.subdomain_policy, Some(DmarcPolicy::Reject));
    assert_eq!(record.percentage, 50);
    assert_eq!(record.aggregate_report_uris, vec!["mailto:a@x.com"]);
    assert!(record.forensic_report_uris.is_empty());
    assert_eq!(record.dkim_alignment, Alignment::Relaxed);
    assert_eq!(record.spf_alignment, Alignment::Relaxed);
    assert!(lookup.diagnostics.is_empty());
}

#[test]
fn test_defaults() {
    let record = parse_dmarc_text(NAME, "v=DMARC1; p=none").record.unwrap();

    assert_eq!(record.percentage, 100);
    assert_eq!(record.subdomain_policy, Some(DmarcPolicy::None));
    assert_eq!(record.failure_options, "0");
    assert_eq!(record.report_format, "afrf");
    assert_eq!(record.report_interval, 86_400);
}

#[test]
fn test_explicit_subdomain_policy_and_alignment() {
    let record = parse_dmarc_text(
        NAME,
        "v=DMARC1; p=quarantine; sp=reject; adkim=s; aspf=r; fo=1; ri=3600",
    )
    .record
    .unwrap();

    assert_eq!(record.policy, Some(DmarcPolicy::Quarantine));
    assert_eq!(record.subdomain_policy, Some(DmarcPolicy::Reject));
    assert_eq!(record.dkim_alignment, Alignment::Strict);
    assert_eq!(record.spf_alignment, Alignment::Relaxed);
    assert_eq!(record.failure_options, "1");
    assert_eq!(record.report_interval, 3600);
}

#[test]
fn test_unknown_tags_preserved() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=reject; NP=reject; psd=n");
    let record = lookup.record.as_ref().unwrap();

    assert_eq!(record.raw_tags["np"], "reject");
    assert_eq!(record.raw_tags["psd"], "n");
    assert_eq!(record.raw_tags["p"], "reject");
    assert!(lookup.diagnostics.is_empty());
}

#[test]
fn test_wrong_version_is_not_a_record() {
    for text in ["v=DMARC2; p=reject", "v=dmarc1; p=reject", "p=reject; v=DMARC1"] {
        let lookup = parse_dmarc_text(NAME, text);
        assert!(lookup.record.is_none(), "{text}");
        assert_eq!(codes(&lookup), vec![DiagnosticCode::InvalidDmarcVersion]);
    }
}

#[test]
fn test_missing_policy() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; rua=mailto:a@x.com");
    let record = lookup.record.as_ref().unwrap();
    assert_eq!(record.policy, None);
    assert_eq!(record.subdomain_policy, None);
    assert_eq!(codes(&lookup), vec![DiagnosticCode::MissingDmarcPolicy]);
}

#[test]
fn test_invalid_policy() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=block; sp=bogus");
    let record = lookup.record.as_ref().unwrap();
    assert_eq!(record.policy, None);
    assert_eq!(
        codes(&lookup),
        vec![
            DiagnosticCode::InvalidDmarcPolicy,
            DiagnosticCode::InvalidDmarcPolicy
        ]
    );
}

#[test]
fn test_policy_is_case_insensitive() {
    let record = parse_dmarc_text(NAME, "v=DMARC1; p=Reject").record.unwrap();
    assert_eq!(record.policy, Some(DmarcPolicy::Reject));
}

#[test]
fn test_percentage_out_of_range_is_clamped_and_reported() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=none; pct=150");
    assert_eq!(lookup.record.as_ref().unwrap().percentage, 100);
    assert_eq!(codes(&lookup), vec![DiagnosticCode::PercentageOutOfRange]);

    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=none; pct=-5");
    assert_eq!(lookup.record.as_ref().unwrap().percentage, 0);
    assert_eq!(codes(&lookup), vec![DiagnosticCode::PercentageOutOfRange]);
}

#[test]
fn test_non_numeric_percentage() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=none; pct=half");
    assert_eq!(lookup.record.as_ref().unwrap().percentage, 100);
    assert_eq!(codes(&lookup), vec![DiagnosticCode::InvalidPercentage]);
}

#[test]
fn test_report_uris_split_and_checked() {
    let lookup = parse_dmarc_text(
        NAME,
        "v=DMARC1; p=none; rua=mailto:a@x.com, https://r.example/dmarc ,ftp://old.example; ruf=bogus",
    );
    let record = lookup.record.as_ref().unwrap();

    assert_eq!(
        record.aggregate_report_uris,
        vec![
            "mailto:a@x.com",
            "https://r.example/dmarc",
            "ftp://old.example"
        ]
    );
    assert_eq!(record.forensic_report_uris, vec!["bogus"]);
    assert_eq!(
        codes(&lookup),
        vec![
            DiagnosticCode::UnrecognizedUriScheme,
            DiagnosticCode::UnrecognizedUriScheme
        ]
    );
}

#[test]
fn test_invalid_alignment_defaults_to_relaxed() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=none; adkim=x");
    assert_eq!(
        lookup.record.as_ref().unwrap().dkim_alignment,
        Alignment::Relaxed
    );
    assert_eq!(codes(&lookup), vec![DiagnosticCode::InvalidAlignment]);
}

#[test]
fn test_malformed_segments_do_not_fail_the_record() {
    let lookup = parse_dmarc_text(NAME, "v=DMARC1; p=reject; junk; =x;");
    assert!(lookup.record.is_some());
    assert_eq!(
        codes(&lookup),
        vec![DiagnosticCode::MalformedTag, DiagnosticCode::MalformedTag]
    );
}

#[tokio::test]
async fn test_absent_record_is_not_an_error() {
    let dns = MockGateway::new();
    let lookup = parse_dmarc(&dns, "example.com").await;
    assert_eq!(lookup, DmarcLookup::default());
    assert_eq!(dns.queries(), vec![NAME]);
}

#[tokio::test]
async fn test_fetch_and_parse() {
    let dns = MockGateway::new();
    dns.add_txt(NAME, ["v=DMARC1; p=quarantine; rua=mailto:d@example.com"]);

    let lookup = parse_dmarc(&dns, "EXAMPLE.com.").await;

    assert_eq!(
        lookup.record.as_ref().unwrap().policy,
        Some(DmarcPolicy::Quarantine)
    );
}

#[tokio::test]
async fn test_lookalike_only() {
    let dns = MockGateway::new();
    dns.add_txt(NAME, ["v=DMARC1p=reject"]);

    let lookup = parse_dmarc(&dns, "example.com").await;

    assert!(lookup.record.is_none());
    assert_eq!(codes(&lookup), vec![DiagnosticCode::InvalidDmarcVersion]);
    assert_eq!(lookup.diagnostics[0].domain, NAME);
}

#[tokio::test]
async fn test_multiple_records_flagged() {
    let dns = MockGateway::new();
    dns.add_txt(
        NAME,
        ["unrelated=1", "v=DMARC1; p=reject", "v=DMARC1; p=none"],
    );

    let lookup = parse_dmarc(&dns, "example.com").await;

    assert_eq!(
        lookup.record.as_ref().unwrap().policy,
        Some(DmarcPolicy::Reject)
    );
    assert_eq!(codes(&lookup), vec![DiagnosticCode::MultipleDmarcRecords]);
}

#[tokio::test]
async fn test_dns_failure_is_a_diagnostic() {
    let dns = MockGateway::new();
    dns.fail(NAME, DnsError::ServFail);

    let lookup = parse_dmarc(&dns, "example.com").await;

    assert!(lookup.record.is_none());
    assert_eq!(codes(&lookup), vec![DiagnosticCode::DnsServFail]);
}
