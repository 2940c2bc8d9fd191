//! Raw DNS records and the record tokenizer.
//!
//! This module provides:
//! - [`RawRecord`]: a TXT string as fetched, tagged with where it came from
//! - [`tokenize_spf`]: SPF term splitting
//! - [`tokenize_tags`]: `tag=value` splitting for DKIM and DMARC
//!
//! Tokenizing is pure; fetching goes through the [`DnsGateway`].

mod tokenizer;
mod types;

use crate::dns::{normalize_name, DnsGateway};
use crate::error_handling::DnsError;

// Re-export public API
pub use tokenizer::{tokenize_spf, tokenize_tags, TagList};
pub use types::{RawRecord, RecordType};

/// Fetches the TXT records at `name` that can be records of `record_type`.
///
/// # Errors
///
/// Returns the gateway's [`DnsError`] unchanged.
pub async fn fetch_records<G: DnsGateway>(
    gateway: &G,
    name: &str,
    record_type: RecordType,
) -> Result<Vec<RawRecord>, DnsError> {
    let domain = normalize_name(name);
    let txt_records = gateway.resolve_txt(&domain).await?;
    Ok(txt_records
        .into_iter()
        .filter(|txt| record_type.is_candidate(txt))
        .map(|text| RawRecord::new(domain.clone(), record_type, text))
        .collect())
}
