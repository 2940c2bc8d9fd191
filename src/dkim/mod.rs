//! DKIM key discovery.
//!
//! This module provides:
//! - [`DkimSelectorResult`]: what one selector probe found
//! - [`SelectorCatalog`]: candidate selector lists
//! - [`discover_dkim`]: bounded-concurrency probing of `<selector>._domainkey.<domain>`

mod catalog;
mod discover;
mod types;


// Re-export public API
pub use catalog::SelectorCatalog;
pub use discover::{discover_dkim, discover_dkim_with};
pub use types::{DkimSelectorResult, DEFAULT_KEY_TYPE};
