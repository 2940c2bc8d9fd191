//! DKIM selector discovery.

use futures::stream::{self, StreamExt};
use log::{debug, warn};

use super::catalog::SelectorCatalog;
use super::types::DkimSelectorResult;
use crate::config::DKIM_PROBE_CONCURRENCY;
use crate::dns::{normalize_name, DnsGateway};
use crate::error_handling::DnsError;
use crate::record::{fetch_records, RecordType};

/// Probes DKIM selectors for `domain` using the built-in selector lists.
///
/// # Arguments
///
/// * `gateway` - DNS gateway to query
/// * `domain` - Domain whose `_domainkey` subtree is probed
/// * `selector` - Probe exactly this selector instead of guessing
/// * `aggressive` - Guess from the larger selector list
///
/// # Returns
///
/// One result per probed selector, in candidate order, including selectors
/// that had no record.
pub async fn discover_dkim<G: DnsGateway>(
    gateway: &G,
    domain: &str,
    selector: Option<&str>,
    aggressive: bool,
) -> Vec<DkimSelectorResult> {
    discover_dkim_with(
        gateway,
        domain,
        selector,
        aggressive,
        &SelectorCatalog::default(),
        DKIM_PROBE_CONCURRENCY,
    )
    .await
}

/// [`discover_dkim`] with a custom catalog and probe concurrency.
///
/// At most `concurrency` probes are in flight at once, whichever list is
/// used. Results are returned in candidate order regardless of which probe
/// answers first.
pub async fn discover_dkim_with<G: DnsGateway>(
    gateway: &G,
    domain: &str,
    selector: Option<&str>,
    aggressive: bool,
    catalog: &SelectorCatalog,
    concurrency: usize,
) -> Vec<DkimSelectorResult> {
    let domain = normalize_name(domain);
    let candidates: Vec<String> = match selector.map(str::trim).filter(|s| !s.is_empty()) {
        Some(selector) => vec![selector.to_string()],
        None => catalog.candidates(aggressive).to_vec(),
    };
    debug!(
        "Probing {} DKIM selectors for {domain} ({} at a time)",
        candidates.len(),
        concurrency.max(1)
    );

    let results: Vec<DkimSelectorResult> = stream::iter(candidates)
        .map(|selector| probe_selector(gateway, &domain, selector))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    debug!(
        "Found {} DKIM records for {domain}",
        results.iter().filter(|r| r.found).count()
    );
    results
}

async fn probe_selector<G: DnsGateway>(
    gateway: &G,
    domain: &str,
    selector: String,
) -> DkimSelectorResult {
    let name = normalize_name(&format!("{selector}._domainkey.{domain}"));
    let records = match fetch_records(gateway, &name, RecordType::Dkim).await {
        Ok(records) => records,
        Err(DnsError::NxDomain) => return DkimSelectorResult::not_found(selector, name),
        Err(e) => {
            warn!("DKIM probe for {name} failed: {e}");
            return DkimSelectorResult::failed(selector, name, e);
        }
    };

    let record = records
        .iter()
        .find(|r| r.text.contains("v=DKIM1") || r.text.contains("p="))
        .or_else(|| records.first());
    match record {
        Some(record) => DkimSelectorResult::from_record(selector, name, &record.text),
        None => DkimSelectorResult::not_found(selector, name),
    }
}
