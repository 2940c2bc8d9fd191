//! Recursive SPF expansion.
//!
//! Walks a domain's SPF record depth-first, following `include:` mechanisms
//! and the `redirect=` modifier through the DNS gateway while charging every
//! DNS-querying term against the RFC 7208 lookup budget. A domain's record is
//! fetched at most once per evaluation; meeting it again is a cycle.

use std::collections::BTreeSet;

use futures::future::BoxFuture;
use log::{debug, warn};

use super::types::{MechanismKind, SpfEvaluation, SpfNode};
use crate::config::SPF_DNS_LOOKUP_LIMIT;
use crate::dns::{normalize_name, DnsGateway};
use crate::error_handling::{Diagnostic, DiagnosticCode, DnsError};
use crate::record::{fetch_records, tokenize_spf, RecordType};

/// Mutable state of one evaluation.
///
/// Built fresh by every top-level call and threaded through the recursion by
/// `&mut`, so concurrent evaluations never share a counter.
struct SpfContext {
    lookups: u32,
    limit: u32,
    limit_exceeded: bool,
    cycle_detected: bool,
    /// Every domain whose record has been fetched.
    visited: BTreeSet<String>,
    /// Domains currently being expanded, root first.
    path: Vec<String>,
}

impl SpfContext {
    fn new(limit: u32) -> Self {
        Self {
            lookups: 0,
            limit,
            limit_exceeded: false,
            cycle_detected: false,
            visited: BTreeSet::new(),
            path: Vec::new(),
        }
    }

    /// Spends `cost` lookups. Fails, leaving the counter untouched, when that
    /// would go over the limit.
    fn charge(&mut self, cost: u32) -> bool {
        if self.lookups + cost > self.limit {
            self.limit_exceeded = true;
            false
        } else {
            self.lookups += cost;
            true
        }
    }

    /// Marks `target` visited. Returns the reason it must not be expanded
    /// when it already was.
    fn enter(&mut self, target: &str) -> Option<&'static str> {
        if self.path.iter().any(|d| d == target) {
            self.cycle_detected = true;
            Some("loops back to a domain being expanded")
        } else if !self.visited.insert(target.to_string()) {
            self.cycle_detected = true;
            Some("was already expanded in this evaluation")
        } else {
            self.path.push(target.to_string());
            None
        }
    }

    fn leave(&mut self) {
        self.path.pop();
    }
}

/// What stopped a record's mechanism walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Exhausted,
    All,
    Limit,
    Cycle,
}

/// Expands the SPF policy of `domain` under the standard ten-lookup budget.
///
/// Never fails: DNS errors, syntax errors and policy violations are attached
/// as diagnostics to the node where they occurred, and whatever was expanded
/// before a failure is kept.
pub async fn evaluate_spf<G: DnsGateway>(gateway: &G, domain: &str) -> SpfEvaluation {
    evaluate_spf_with_limit(gateway, domain, SPF_DNS_LOOKUP_LIMIT).await
}

/// [`evaluate_spf`] with a custom lookup budget.
pub async fn evaluate_spf_with_limit<G: DnsGateway>(
    gateway: &G,
    domain: &str,
    limit: u32,
) -> SpfEvaluation {
    let domain = normalize_name(domain);
    let mut ctx = SpfContext::new(limit);
    ctx.enter(&domain);

    let (root, record_count) = expand(gateway, domain.clone(), &mut ctx).await;

    debug!(
        "SPF for {}: {} lookups, limit exceeded: {}, cycle: {}",
        domain, ctx.lookups, ctx.limit_exceeded, ctx.cycle_detected
    );

    SpfEvaluation {
        root,
        total_lookups: ctx.lookups,
        lookup_limit_exceeded: ctx.limit_exceeded,
        cycle_detected: ctx.cycle_detected,
        visited_domains: ctx.visited,
        record_count,
    }
}

/// Fetches and tokenizes the SPF record at `domain` without expanding it.
///
/// Returns the node and the number of SPF records published there.
async fn load_record<G: DnsGateway>(gateway: &G, domain: &str) -> (SpfNode, usize) {
    let mut node = SpfNode::new(domain);
    let records = match fetch_records(gateway, domain, RecordType::Spf).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Failed to fetch SPF record for {domain}: {e}");
            node.push_error(Diagnostic::from_dns(domain, &e));
            if e == DnsError::NxDomain {
                node.push_error(Diagnostic::new(
                    domain,
                    DiagnosticCode::NoSpfRecord,
                    "domain does not exist",
                ));
            }
            return (node, 0);
        }
    };

    match records.len() {
        0 => node.push_error(Diagnostic::new(
            domain,
            DiagnosticCode::NoSpfRecord,
            "no TXT record starting with v=spf1",
        )),
        1 => {}
        n => node.push_error(Diagnostic::new(
            domain,
            DiagnosticCode::MultipleSpfRecords,
            format!("{n} SPF records published; evaluating the first"),
        )),
    }

    if let Some(record) = records.first() {
        node.mechanisms = tokenize_spf(&record.text);
        node.redirect = node
            .mechanisms
            .iter()
            .find(|m| m.kind == MechanismKind::Redirect)
            .and_then(|m| m.value.clone());
        node.record = Some(record.text.trim().to_string());
        for mechanism in &node.mechanisms.clone() {
            if let Some(error) = mechanism.parse_error() {
                node.push_error(Diagnostic::from_parse(domain, &error));
            }
        }
    }
    (node, records.len())
}

fn expand<'a, G: DnsGateway + 'a>(
    gateway: &'a G,
    domain: String,
    ctx: &'a mut SpfContext,
) -> BoxFuture<'a, (SpfNode, usize)> {
    Box::pin(async move {
        debug!("Expanding SPF record for {domain}");
        let (mut node, record_count) = load_record(gateway, &domain).await;
        if node.record.is_none() {
            return (node, record_count);
        }

        let stop = walk_mechanisms(gateway, &mut node, ctx).await;

        if stop == Stop::Exhausted {
            if let Some(target) = node.redirect.clone() {
                follow_redirect(gateway, &mut node, &target, ctx).await;
            }
        }
        (node, record_count)
    })
}

/// Charges and expands the node's mechanisms in order until one stops the
/// walk.
async fn walk_mechanisms<G: DnsGateway>(
    gateway: &G,
    node: &mut SpfNode,
    ctx: &mut SpfContext,
) -> Stop {
    let domain = node.domain.clone();
    for mechanism in node.mechanisms.clone() {
        if ctx.limit_exceeded {
            return Stop::Limit;
        }
        match mechanism.kind {
            MechanismKind::All => return Stop::All,
            // Modifiers are handled once the walk is over
            MechanismKind::Redirect | MechanismKind::Explanation => continue,
            _ if mechanism.domain_lookups_cost == 0 => continue,
            _ => {}
        }

        if !ctx.charge(mechanism.domain_lookups_cost) {
            node.push_error(Diagnostic::new(
                &domain,
                DiagnosticCode::LookupLimitExceeded,
                format!(
                    "`{}` would exceed the {}-lookup limit",
                    mechanism.to_term(),
                    ctx.limit
                ),
            ));
            return Stop::Limit;
        }

        if mechanism.kind != MechanismKind::Include {
            continue;
        }
        let Some(target) = mechanism.value.as_deref().map(normalize_name) else {
            continue;
        };
        if target.contains('%') {
            debug!("Not expanding macro include {target} from {domain}");
            continue;
        }
        if let Some(reason) = ctx.enter(&target) {
            node.push_error(Diagnostic::new(
                &domain,
                DiagnosticCode::CycleDetected,
                format!("include:{target} {reason}"),
            ));
            return Stop::Cycle;
        }

        let (child, _) = expand(gateway, target.clone(), &mut *ctx).await;
        ctx.leave();
        node.children.insert(target, child);
    }
    Stop::Exhausted
}

/// Resolves `redirect=` in place of the rest of the record.
async fn follow_redirect<G: DnsGateway>(
    gateway: &G,
    node: &mut SpfNode,
    target: &str,
    ctx: &mut SpfContext,
) {
    let domain = node.domain.clone();
    let target = normalize_name(target);
    if target.contains('%') {
        debug!("Not following macro redirect {target} from {domain}");
        return;
    }
    if !ctx.charge(MechanismKind::Redirect.lookup_cost()) {
        node.push_error(Diagnostic::new(
            &domain,
            DiagnosticCode::LookupLimitExceeded,
            format!("redirect={target} would exceed the {}-lookup limit", ctx.limit),
        ));
        return;
    }
    if let Some(reason) = ctx.enter(&target) {
        node.push_error(Diagnostic::new(
            &domain,
            DiagnosticCode::CycleDetected,
            format!("redirect={target} {reason}"),
        ));
        return;
    }

    let (redirected, _) = expand(gateway, target, &mut *ctx).await;
    ctx.leave();
    node.redirected = Some(Box::new(redirected));
}
