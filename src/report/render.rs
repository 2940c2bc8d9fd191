//! Plain-text rendering of a [`DomainReport`].

use std::fmt::Write;

use super::types::DomainReport;
use crate::spf::SpfNode;

const RULE_WIDTH: usize = 60;
/// Raw DKIM TXT is cut to this many characters.
const RAW_PREVIEW_CHARS: usize = 200;

/// Renders `report` as a human-readable, multi-line summary.
pub fn render_text(report: &DomainReport) -> String {
    let mut out = String::new();
    let rule = "-".repeat(RULE_WIDTH);

    // Writing to a String cannot fail
    let _ = writeln!(out, "Email authentication report for: {}", report.domain);
    let _ = writeln!(
        out,
        "Checked at (UTC): {}",
        report.fetched_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    let _ = writeln!(out, "{rule}");

    render_spf(report, &mut out);
    render_dmarc(report, &mut out);
    render_dkim(report, &mut out);

    if !report.diagnostics.is_empty() {
        let _ = writeln!(out, "Diagnostics:");
        for diagnostic in &report.diagnostics {
            let _ = writeln!(out, "  ! {diagnostic}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Score (0-100): {}", report.assessment.score);
    for finding in &report.assessment.findings {
        if finding.penalty > 0 {
            let _ = writeln!(out, "  - [-{}] {}", finding.penalty, finding.message);
        } else {
            let _ = writeln!(out, "  - {}", finding.message);
        }
    }
    let _ = write!(out, "{rule}");
    out
}

fn render_spf(report: &DomainReport, out: &mut String) {
    let spf = &report.spf;
    let _ = writeln!(out, "SPF:");
    match &spf.root.record {
        None => {
            let _ = writeln!(out, "  - No SPF record found.");
        }
        Some(_) => {
            render_spf_node(&spf.root, 1, out);
            let _ = writeln!(
                out,
                "  - DNS lookups: {}{}",
                spf.total_lookups,
                if spf.lookup_limit_exceeded {
                    " (limit exceeded)"
                } else {
                    ""
                }
            );
            if spf.cycle_detected {
                let _ = writeln!(out, "  - Include loop detected");
            }
        }
    }
    let _ = writeln!(out);
}

fn render_spf_node(node: &SpfNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match &node.record {
        Some(record) => {
            let _ = writeln!(out, "{indent}- {}: {record}", node.domain);
        }
        None => {
            let _ = writeln!(out, "{indent}- {}: (no record)", node.domain);
        }
    }
    for child in node.children.values() {
        render_spf_node(child, depth + 1, out);
    }
    if let Some(redirected) = &node.redirected {
        render_spf_node(redirected, depth + 1, out);
    }
}

fn render_dmarc(report: &DomainReport, out: &mut String) {
    let _ = writeln!(out, "DMARC:");
    match &report.dmarc {
        None => {
            let _ = writeln!(out, "  - No DMARC record at _dmarc.{}.", report.domain);
        }
        Some(dmarc) => {
            let _ = writeln!(out, "  - Record: {}", dmarc.raw);
            for (tag, value) in &dmarc.raw_tags {
                let _ = writeln!(out, "    - {tag} = {value}");
            }
        }
    }
    let _ = writeln!(out);
}

fn render_dkim(report: &DomainReport, out: &mut String) {
    let _ = writeln!(out, "DKIM:");
    let mut any = false;
    for result in report.dkim.iter().filter(|r| r.found) {
        any = true;
        let _ = writeln!(out, "  - Selector: {} ({})", result.selector, result.name);
        if let Some(bits) = result.key_bits_approx {
            let _ = writeln!(out, "    - approx key bits: {bits}");
        }
        if let Some(key_type) = &result.key_type {
            let _ = writeln!(out, "    - key type: {key_type}");
        }
        if let Some(raw) = &result.raw {
            let preview: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
            let _ = writeln!(out, "    - raw: {preview}");
        }
    }
    for result in report.dkim.iter().filter(|r| r.revoked) {
        let _ = writeln!(
            out,
            "  - Revoked: {} ({}) publishes an empty p=",
            result.selector, result.name
        );
    }
    if !any {
        let _ = writeln!(
            out,
            "  - No DKIM record found among {} probed selectors.",
            report.dkim.len()
        );
        if !report.aggressive_dkim {
            let _ = writeln!(out, "    (--aggressive-dkim tries more selectors)");
        }
    }
    let _ = writeln!(out);
}
