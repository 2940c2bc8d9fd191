//! Report aggregation, scoring and rendering.
//!
//! This module provides:
//! - [`build_report`]: runs SPF, DKIM and DMARC checks concurrently and joins
//!   them into a [`DomainReport`]
//! - [`assess`]: the 0-100 posture score
//! - [`render_text`]: the human-readable report

mod aggregate;
mod assess;
mod render;
mod types;


// Re-export public API
pub use aggregate::{build_report, build_report_with, ReportOptions};
pub use assess::assess;
pub use render::render_text;
pub use types::{Assessment, DomainReport, Finding};
