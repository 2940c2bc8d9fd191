//! DNS resolver initialization.
//!
//! This module provides functions to initialize the DNS resolver with proper
//! timeout configuration.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;

use crate::config::Config;
use crate::error_handling::InitializationError;

/// Initializes the DNS resolver used for all record lookups.
///
/// Uses the system's name servers (`/etc/resolv.conf` on Unix), falling back
/// to the library default (Google public DNS) when the system configuration
/// cannot be read.
///
/// Timeouts and attempts come from `config` so a dead name server fails the
/// query quickly instead of stalling the whole report.
///
/// # Returns
///
/// A configured `TokioAsyncResolver` wrapped in `Arc` for sharing across tasks.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if `config` asks for zero
/// attempts or a zero timeout.
pub fn init_resolver(config: &Config) -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    if config.dns_attempts == 0 || config.dns_timeout_secs == 0 {
        return Err(InitializationError::DnsResolverError(format!(
            "DNS timeout ({}s) and attempts ({}) must both be positive",
            config.dns_timeout_secs, config.dns_attempts
        )));
    }

    let (resolver_config, mut opts) = match read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            warn!("Could not read system DNS configuration ({e}); using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.timeout = Duration::from_secs(config.dns_timeout_secs);
    opts.attempts = config.dns_attempts;
    // Names are always fully qualified; never append search domains
    opts.ndots = 0;
    debug!(
        "DNS resolver: {} name servers, {:?} timeout, {} attempts",
        resolver_config.name_servers().len(),
        opts.timeout,
        opts.attempts
    );

    Ok(Arc::new(TokioAsyncResolver::tokio(resolver_config, opts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_resolver_with_defaults() {
        assert!(init_resolver(&Config::default()).is_ok());
    }

    #[test]
    fn test_init_resolver_rejects_zero_attempts() {
        let config = Config {
            dns_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            init_resolver(&config),
            Err(InitializationError::DnsResolverError(_))
        ));
    }
}
