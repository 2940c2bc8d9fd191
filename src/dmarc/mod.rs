//! DMARC policy parsing.
//!
//! [`parse_dmarc`] fetches `_dmarc.<domain>` and hands the text to the pure
//! [`parse_dmarc_text`], which maps known tags onto [`DmarcRecord`] with the
//! RFC 7489 defaults applied and keeps every tag verbatim in `raw_tags`.

mod parser;
mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use parser::{parse_dmarc, parse_dmarc_text};
pub use types::{Alignment, DmarcLookup, DmarcPolicy, DmarcRecord};
