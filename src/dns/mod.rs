//! DNS gateway.
//!
//! This module provides the only suspension points of an audit:
//! - The [`DnsGateway`] trait the record engines are written against
//! - A `hickory-resolver` backed implementation for real lookups
//! - An in-memory [`MockGateway`] for tests and offline runs
//! - A per-report wrapper enforcing the request deadline
//!
//! Transport failures come back as [`DnsError`](crate::error_handling::DnsError)
//! values; callers decide whether a failure is a diagnostic or a normal absence.

mod gateway;
mod mock;
mod resolver;
mod scoped;

// Re-export public API
pub use gateway::{normalize_name, DnsGateway};
pub use mock::MockGateway;
pub use resolver::ResolverGateway;
pub use scoped::ScopedGateway;
