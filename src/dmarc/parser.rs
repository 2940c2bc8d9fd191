//! DMARC record parser.

use std::collections::BTreeMap;

use log::{debug, warn};
use url::Url;

use super::types::{Alignment, DmarcLookup, DmarcPolicy, DmarcRecord};
use crate::config::{
    DEFAULT_DMARC_FAILURE_OPTIONS, DEFAULT_DMARC_PERCENTAGE, DEFAULT_DMARC_REPORT_FORMAT,
    DEFAULT_DMARC_REPORT_INTERVAL, RECOGNIZED_REPORT_URI_SCHEMES,
};
use crate::dns::{normalize_name, DnsGateway};
use crate::error_handling::{Diagnostic, DiagnosticCode, DnsError};
use crate::record::{fetch_records, tokenize_tags, RecordType};

const DMARC_VERSION: &str = "DMARC1";

/// Looks up and parses the DMARC record of `domain`.
///
/// A missing `_dmarc` record is not an error: the lookup comes back with no
/// record and no diagnostics. DNS failures, malformed records and bad tag
/// values are reported as diagnostics attributed to `_dmarc.<domain>`.
pub async fn parse_dmarc<G: DnsGateway>(gateway: &G, domain: &str) -> DmarcLookup {
    let name = format!("_dmarc.{}", normalize_name(domain));
    let records = match fetch_records(gateway, &name, RecordType::Dmarc).await {
        Ok(records) => records,
        Err(DnsError::NxDomain) => {
            debug!("No DMARC record at {name}");
            return DmarcLookup::default();
        }
        Err(e) => {
            warn!("Failed to fetch DMARC record at {name}: {e}");
            return DmarcLookup {
                record: None,
                diagnostics: vec![Diagnostic::from_dns(&name, &e)],
            };
        }
    };
    if records.is_empty() {
        debug!("No DMARC record at {name}");
        return DmarcLookup::default();
    }

    let valid: Vec<&str> = records
        .iter()
        .map(|r| r.text.as_str())
        .filter(|text| has_dmarc_version(text))
        .collect();

    match valid.as_slice() {
        [] => {
            let mut diagnostics = Vec::new();
            for record in &records {
                diagnostics.push(Diagnostic::new(
                    &name,
                    DiagnosticCode::InvalidDmarcVersion,
                    format!("`{}` does not start with v={DMARC_VERSION}", record.text.trim()),
                ));
            }
            DmarcLookup {
                record: None,
                diagnostics,
            }
        }
        [first, rest @ ..] => {
            let mut lookup = parse_dmarc_text(&name, first);
            if !rest.is_empty() {
                lookup.diagnostics.insert(
                    0,
                    Diagnostic::new(
                        &name,
                        DiagnosticCode::MultipleDmarcRecords,
                        format!("{} DMARC records published; using the first", valid.len()),
                    ),
                );
            }
            lookup
        }
    }
}

/// Parses one DMARC TXT string published at `name`.
///
/// # Examples
///
/// ```
/// use email_posture::dmarc::{parse_dmarc_text, DmarcPolicy};
///
/// let lookup = parse_dmarc_text("_dmarc.example.com", "v=DMARC1; p=reject; pct=50");
/// let record = lookup.record.unwrap();
/// assert_eq!(record.policy, Some(DmarcPolicy::Reject));
/// assert_eq!(record.percentage, 50);
/// ```
pub fn parse_dmarc_text(name: &str, text: &str) -> DmarcLookup {
    let mut diagnostics = Vec::new();
    if !has_dmarc_version(text) {
        diagnostics.push(Diagnostic::new(
            name,
            DiagnosticCode::InvalidDmarcVersion,
            format!("`{}` does not start with v={DMARC_VERSION}", text.trim()),
        ));
        return DmarcLookup {
            record: None,
            diagnostics,
        };
    }

    let list = tokenize_tags(text, ';');
    diagnostics.extend(list.errors.iter().map(|e| Diagnostic::from_parse(name, e)));
    let raw_tags: BTreeMap<String, String> = list
        .order
        .iter()
        .filter_map(|tag| {
            list.tags
                .get(tag)
                .map(|value| (tag.to_ascii_lowercase(), value.clone()))
        })
        .collect();
    let tag = |key: &str| raw_tags.get(key).map(String::as_str);

    let policy = match tag("p") {
        None => {
            diagnostics.push(Diagnostic::new(
                name,
                DiagnosticCode::MissingDmarcPolicy,
                "record has no p= tag",
            ));
            None
        }
        Some(value) => parse_policy(name, "p", value, &mut diagnostics),
    };
    let subdomain_policy = match tag("sp") {
        Some(value) => parse_policy(name, "sp", value, &mut diagnostics).or(policy),
        None => policy,
    };

    let record = DmarcRecord {
        version: DMARC_VERSION.to_string(),
        policy,
        subdomain_policy,
        percentage: parse_percentage(name, tag("pct"), &mut diagnostics),
        aggregate_report_uris: parse_report_uris(name, "rua", tag("rua"), &mut diagnostics),
        forensic_report_uris: parse_report_uris(name, "ruf", tag("ruf"), &mut diagnostics),
        dkim_alignment: parse_alignment(name, "adkim", tag("adkim"), &mut diagnostics),
        spf_alignment: parse_alignment(name, "aspf", tag("aspf"), &mut diagnostics),
        failure_options: tag("fo")
            .unwrap_or(DEFAULT_DMARC_FAILURE_OPTIONS)
            .to_string(),
        report_format: tag("rf").unwrap_or(DEFAULT_DMARC_REPORT_FORMAT).to_string(),
        report_interval: parse_interval(name, tag("ri"), &mut diagnostics),
        raw: text.trim().to_string(),
        raw_tags: raw_tags.clone(),
    };

    DmarcLookup {
        record: Some(record),
        diagnostics,
    }
}

/// True when the first tag is `v=DMARC1`, the value compared exactly.
fn has_dmarc_version(text: &str) -> bool {
    let list = tokenize_tags(text, ';');
    matches!(
        list.first(),
        Some((name, value)) if name.eq_ignore_ascii_case("v") && value == DMARC_VERSION
    )
}

fn parse_policy(
    name: &str,
    tag: &str,
    value: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<DmarcPolicy> {
    match value.parse::<DmarcPolicy>() {
        Ok(policy) => Some(policy),
        Err(_) => {
            diagnostics.push(Diagnostic::new(
                name,
                DiagnosticCode::InvalidDmarcPolicy,
                format!("{tag}={value} is not none, quarantine or reject"),
            ));
            None
        }
    }
}

fn parse_percentage(name: &str, value: Option<&str>, diagnostics: &mut Vec<Diagnostic>) -> u8 {
    let Some(value) = value else {
        return DEFAULT_DMARC_PERCENTAGE;
    };
    match value.parse::<i64>() {
        Ok(pct) if (0..=100).contains(&pct) => pct as u8,
        Ok(pct) => {
            let clamped = pct.clamp(0, 100) as u8;
            diagnostics.push(Diagnostic::new(
                name,
                DiagnosticCode::PercentageOutOfRange,
                format!("pct={pct} is outside 0-100; treated as {clamped}"),
            ));
            clamped
        }
        Err(_) => {
            diagnostics.push(Diagnostic::new(
                name,
                DiagnosticCode::InvalidPercentage,
                format!("pct={value} is not a number; treated as {DEFAULT_DMARC_PERCENTAGE}"),
            ));
            DEFAULT_DMARC_PERCENTAGE
        }
    }
}

fn parse_report_uris(
    name: &str,
    tag: &str,
    value: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };
    let uris: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .collect();
    for uri in &uris {
        if !has_recognized_scheme(uri) {
            diagnostics.push(Diagnostic::new(
                name,
                DiagnosticCode::UnrecognizedUriScheme,
                format!("{tag} entry `{uri}` is not a mailto: or https: URI"),
            ));
        }
    }
    uris
}

fn has_recognized_scheme(uri: &str) -> bool {
    Url::parse(uri)
        .map(|url| RECOGNIZED_REPORT_URI_SCHEMES.contains(&url.scheme()))
        .unwrap_or(false)
}

fn parse_alignment(
    name: &str,
    tag: &str,
    value: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Alignment {
    let Some(value) = value else {
        return Alignment::default();
    };
    Alignment::from_tag(value).unwrap_or_else(|| {
        diagnostics.push(Diagnostic::new(
            name,
            DiagnosticCode::InvalidAlignment,
            format!("{tag}={value} is not r or s; treated as relaxed"),
        ));
        Alignment::default()
    })
}

fn parse_interval(name: &str, value: Option<&str>, diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let Some(value) = value else {
        return DEFAULT_DMARC_REPORT_INTERVAL;
    };
    value.parse().unwrap_or_else(|_| {
        diagnostics.push(Diagnostic::new(
            name,
            DiagnosticCode::MalformedTag,
            format!("ri={value} is not a number of seconds"),
        ));
        DEFAULT_DMARC_REPORT_INTERVAL
    })
}
