//! Posture scoring.
//!
//! Starts from 100 and deducts points for each weakness found in the SPF,
//! DMARC and DKIM results. The score is a rough guide for humans, not a
//! compliance verdict.

use super::types::{Assessment, DomainReport, Finding};
use crate::config::SPF_DNS_LOOKUP_LIMIT;
use crate::dkim::DkimSelectorResult;
use crate::dmarc::{DmarcPolicy, DmarcRecord};
use crate::spf::{Qualifier, SpfEvaluation, SpfMechanism, SpfNode};

/// Lookup count above which SPF is considered close to the limit.
const SPF_LOOKUP_WARNING: u32 = SPF_DNS_LOOKUP_LIMIT - 3;

/// Scores the SPF, DKIM and DMARC parts of `report`.
pub fn assess(report: &DomainReport) -> Assessment {
    assess_parts(&report.spf, report.dmarc.as_ref(), &report.dkim)
}

pub(crate) fn assess_parts(
    spf: &SpfEvaluation,
    dmarc: Option<&DmarcRecord>,
    dkim: &[DkimSelectorResult],
) -> Assessment {
    let mut findings = Vec::new();
    assess_spf(spf, &mut findings);
    assess_dmarc(dmarc, &mut findings);
    assess_dkim(dkim, &mut findings);

    let penalty: u32 = findings.iter().map(|f| u32::from(f.penalty)).sum();
    let score = 100u32.saturating_sub(penalty).min(100) as u8;
    Assessment { score, findings }
}

fn assess_spf(spf: &SpfEvaluation, findings: &mut Vec<Finding>) {
    if !spf.has_record() {
        findings.push(Finding::new(40, "No SPF record: anyone can send as this domain"));
        return;
    }
    if spf.record_count > 1 {
        findings.push(Finding::new(
            30,
            format!(
                "{} SPF records published: receivers treat this as a permanent error",
                spf.record_count
            ),
        ));
    }

    match effective_all(&spf.root).map(|m| m.qualifier) {
        None => findings.push(Finding::new(
            5,
            "SPF record has no `all` mechanism: unlisted senders are not rejected",
        )),
        Some(Qualifier::Pass) => findings.push(Finding::new(
            25,
            "SPF ends in +all: every sender is authorized",
        )),
        Some(Qualifier::Neutral) => {
            findings.push(Finding::new(10, "SPF ends in ?all (neutral): weak protection"))
        }
        Some(Qualifier::SoftFail) => findings.push(Finding::new(
            3,
            "SPF ends in ~all (softfail): unlisted senders are only marked",
        )),
        Some(Qualifier::Fail) => {
            findings.push(Finding::new(0, "SPF ends in -all: unlisted senders are rejected"))
        }
    }

    if spf.lookup_limit_exceeded {
        findings.push(Finding::new(
            20,
            format!(
                "SPF needs more than {SPF_DNS_LOOKUP_LIMIT} DNS lookups: receivers will return permerror"
            ),
        ));
    } else if spf.total_lookups > SPF_LOOKUP_WARNING {
        findings.push(Finding::new(
            7,
            format!(
                "SPF uses {} of {SPF_DNS_LOOKUP_LIMIT} DNS lookups",
                spf.total_lookups
            ),
        ));
    }
    if spf.cycle_detected {
        findings.push(Finding::new(0, "SPF include chain repeats or loops back on a domain"));
    }
}

/// The `all` that ends evaluation of `node`, looking through `redirect=`.
fn effective_all(node: &SpfNode) -> Option<&SpfMechanism> {
    node.all_mechanism()
        .or_else(|| node.redirected.as_deref().and_then(effective_all))
}

fn assess_dmarc(dmarc: Option<&DmarcRecord>, findings: &mut Vec<Finding>) {
    let Some(dmarc) = dmarc else {
        findings.push(Finding::new(
            30,
            "No DMARC record: no domain-wide policy for unauthenticated mail",
        ));
        return;
    };

    match dmarc.policy {
        None | Some(DmarcPolicy::None) => findings.push(Finding::new(
            10,
            "DMARC p=none only monitors: consider quarantine or reject",
        )),
        Some(DmarcPolicy::Quarantine) => {
            findings.push(Finding::new(3, "DMARC p=quarantine sends failures to spam"))
        }
        Some(DmarcPolicy::Reject) => {
            findings.push(Finding::new(0, "DMARC p=reject blocks failing mail"))
        }
    }
    if dmarc.percentage < 100 {
        findings.push(Finding::new(
            5,
            format!("DMARC pct={} leaves some mail unprotected", dmarc.percentage),
        ));
    }
    if dmarc.aggregate_report_uris.is_empty() {
        findings.push(Finding::new(
            3,
            "DMARC has no rua: no aggregate reports will be received",
        ));
    }
}

fn assess_dkim(dkim: &[DkimSelectorResult], findings: &mut Vec<Finding>) {
    let keys: Vec<&DkimSelectorResult> = dkim.iter().filter(|r| r.public_key_present).collect();
    if keys.is_empty() {
        findings.push(Finding::new(
            10,
            "No DKIM key found among the probed selectors",
        ));
        return;
    }
    for key in keys {
        let Some(bits) = key.key_bits_approx else {
            continue;
        };
        let finding = match bits {
            b if b < 1024 => Finding::new(
                10,
                format!("DKIM selector {} has a weak key (~{b} bits)", key.selector),
            ),
            b if b < 2048 => Finding::new(
                3,
                format!("DKIM selector {} uses ~{b} bits: 2048 is recommended", key.selector),
            ),
            b => Finding::new(
                0,
                format!("DKIM selector {} key size looks fine (~{b} bits)", key.selector),
            ),
        };
        findings.push(finding);
    }
}
