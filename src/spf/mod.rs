//! SPF policy expansion.
//!
//! This module provides:
//! - The SPF data model ([`SpfMechanism`], [`SpfNode`], [`SpfEvaluation`])
//! - [`evaluate_spf`]: recursive expansion of `include:` and `redirect=` under
//!   the ten-lookup budget, with cycle detection
//!
//! Evaluation only reports structure and lookup cost. It never decides a
//! pass/fail result for a sending IP.

mod resolver;
mod types;


// Re-export public API
pub use resolver::{evaluate_spf, evaluate_spf_with_limit};
pub use types::{MechanismKind, Qualifier, SpfEvaluation, SpfMechanism, SpfNode};
