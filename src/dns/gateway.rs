//! The DNS capability the audit engines consume.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};

use crate::error_handling::DnsError;

/// Source of DNS answers.
///
/// Only `resolve_txt` is needed by the record engines. The address, MX and PTR
/// queries exist for callers that want them and default to
/// [`DnsError::Other`] so lightweight gateways only implement TXT.
pub trait DnsGateway: Send + Sync {
    /// Returns every TXT record at `name`, with multi-string records joined.
    ///
    /// An existing name without TXT data yields `Ok(vec![])`.
    fn resolve_txt(&self, name: &str) -> impl Future<Output = Result<Vec<String>, DnsError>> + Send;

    /// Returns the IPv4 addresses of `name`.
    fn resolve_a(&self, name: &str) -> impl Future<Output = Result<Vec<Ipv4Addr>, DnsError>> + Send {
        let _ = name;
        async { Err(DnsError::Other("A lookups not supported".to_string())) }
    }

    /// Returns `(preference, exchange)` pairs sorted by preference.
    fn resolve_mx(&self, name: &str) -> impl Future<Output = Result<Vec<(u16, String)>, DnsError>> + Send {
        let _ = name;
        async { Err(DnsError::Other("MX lookups not supported".to_string())) }
    }

    /// Returns the PTR names of `ip`.
    fn resolve_ptr(&self, ip: IpAddr) -> impl Future<Output = Result<Vec<String>, DnsError>> + Send {
        let _ = ip;
        async { Err(DnsError::Other("PTR lookups not supported".to_string())) }
    }
}

/// Canonical form of a DNS name for comparisons: trimmed, lowercase, no
/// trailing dot.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
