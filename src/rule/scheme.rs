//! Scheme allow-list rule implementation.

use ahash::AHashSet;

use super::SchemeRule;
use crate::{Error, Result};

/// SchemeAllowList accepts only the listed schemes.
///
/// Schemes are stored lower-cased and compared exactly. An empty list
/// rejects every scheme.
///
/// # Examples
/// ```
/// use urlegit::rule::{SchemeAllowList, SchemeRule};
///
/// let rule = SchemeAllowList::new(["HTTP", "https"]);
/// assert!(rule.check("http").is_ok());
/// assert!(rule.check("ftp").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemeAllowList {
    schemes: AHashSet<String>,
}

impl SchemeAllowList {
    /// Create an allow-list from the given schemes.
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        list.extend(schemes);
        list
    }

    /// Add more schemes to the list.
    pub fn extend<I, S>(&mut self, schemes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schemes
            .extend(schemes.into_iter().map(|s| s.as_ref().to_lowercase()));
    }

    /// Check whether a lower-cased scheme is allowed.
    pub fn contains(&self, scheme: &str) -> bool {
        self.schemes.contains(scheme)
    }

    /// Get the number of allowed schemes.
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    /// Check if no scheme is allowed.
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl SchemeRule for SchemeAllowList {
    fn check(&self, scheme: &str) -> Result<()> {
        if self.contains(scheme) {
            return Ok(());
        }
        Err(Error::SchemeNotAllowed)
    }
}
