//! Candidate DKIM selectors.

use std::fs;
use std::path::Path;

use log::info;

use crate::config::{AGGRESSIVE_DKIM_SELECTORS, DEFAULT_DKIM_SELECTORS};
use crate::error_handling::InitializationError;

/// Selector names to guess when the caller does not know the selector.
///
/// DKIM selectors cannot be enumerated through DNS, so discovery probes a
/// list of names commonly used by mail providers. The lists are data: extend
/// them with [`SelectorCatalog::extend`] or a selector file instead of
/// changing the discovery code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCatalog {
    default: Vec<String>,
    aggressive: Vec<String>,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            default: DEFAULT_DKIM_SELECTORS.iter().map(|s| s.to_string()).collect(),
            aggressive: AGGRESSIVE_DKIM_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SelectorCatalog {
    /// Catalog with explicit lists. Duplicates are dropped, keeping first
    /// occurrence order.
    pub fn new<D, A>(default: D, aggressive: A) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let mut catalog = Self {
            default: Vec::new(),
            aggressive: Vec::new(),
        };
        push_unique(&mut catalog.default, default);
        push_unique(&mut catalog.aggressive, aggressive);
        catalog
    }

    /// The candidates for one discovery run, in probe order.
    pub fn candidates(&self, aggressive: bool) -> &[String] {
        if aggressive {
            &self.aggressive
        } else {
            &self.default
        }
    }

    /// Appends selectors to both lists, skipping names already present.
    pub fn extend<I>(&mut self, selectors: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let selectors: Vec<String> = selectors.into_iter().map(Into::into).collect();
        push_unique(&mut self.default, selectors.iter().cloned());
        push_unique(&mut self.aggressive, selectors);
    }

    /// Built-in lists extended with the selectors listed in `path`.
    ///
    /// The file holds one selector per line. Blank lines and text after `#`
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError::SelectorFileError`] if the file cannot be
    /// read.
    pub fn with_file(path: &Path) -> Result<Self, InitializationError> {
        let contents = fs::read_to_string(path)?;
        let selectors = parse_selector_list(&contents);
        info!(
            "Loaded {} extra DKIM selectors from {}",
            selectors.len(),
            path.display()
        );
        let mut catalog = Self::default();
        catalog.extend(selectors);
        Ok(catalog)
    }
}

fn push_unique<I>(list: &mut Vec<String>, selectors: I)
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    for selector in selectors {
        let selector = selector.into().trim().to_ascii_lowercase();
        if !selector.is_empty() && !list.contains(&selector) {
            list.push(selector);
        }
    }
}

fn parse_selector_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
