//! Domain-name rule implementation.

use std::fmt;

use super::HostRule;
use crate::{Error, Result};

/// Label matching exactly one arbitrary label at its position.
const WILDCARD: &str = "*";

/// Reserved domain patterns blocked by
/// [`CheckOption::forbid_special_use_domains`](crate::CheckOption::forbid_special_use_domains).
///
/// See <https://www.iana.org/assignments/special-use-domain-names/special-use-domain-names.xhtml>.
pub const SPECIAL_USE_DOMAINS: &[&str] = &[
    "*.alt",
    "*.example",
    "*.invalid",
    "*.local",
    "*.localhost",
    "*.test",
    "example.*",
];

/// Split a domain into lower-cased labels in root-first order.
///
/// One trailing root dot is ignored. Any empty label is rejected.
pub(crate) fn hostname_labels(domain: &str) -> Result<Vec<String>> {
    let lower = domain.to_lowercase();
    let trimmed = lower.strip_suffix('.').unwrap_or(&lower);

    let mut labels = Vec::new();
    for label in trimmed.split('.') {
        if label.is_empty() {
            return Err(Error::invalid_input(format!(
                "invalid domain '{}' zero length subdomain",
                domain
            )));
        }
        labels.push(label.to_string());
    }
    labels.reverse();

    Ok(labels)
}

/// A forbidden domain pattern.
///
/// Patterns are matched against hostnames starting from the top-level label.
/// A pattern matches any hostname that shares all of its labels, so
/// `example.com` matches `example.com` and `www.example.com` but not `com`.
/// A `*` label matches exactly one label at that position.
///
/// # Examples
/// ```
/// use urlegit::rule::DomainPattern;
///
/// let pattern = DomainPattern::new("*.example.com").unwrap();
/// assert!(pattern.matches_host("www.example.com").unwrap());
/// assert!(!pattern.matches_host("example.com").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPattern {
    original: String,
    /// Root-first labels, e.g. `["com", "example"]`
    labels: Vec<String>,
}

impl DomainPattern {
    /// Parse a domain pattern.
    ///
    /// Fails with [`Error::InvalidInput`] if any label is empty.
    pub fn new(domain: &str) -> Result<Self> {
        Ok(Self {
            original: domain.to_string(),
            labels: hostname_labels(domain)?,
        })
    }

    /// The pattern exactly as supplied.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Root-first labels of the pattern.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Match root-first candidate labels against this pattern.
    pub fn matches(&self, candidate: &[String]) -> bool {
        for (i, block) in self.labels.iter().enumerate() {
            match candidate.get(i) {
                None => return false,
                Some(_) if block == WILDCARD => {}
                Some(label) if label == block => {}
                Some(_) => return false,
            }
        }
        true
    }

    /// Label a hostname and match it against this pattern.
    pub fn matches_host(&self, host: &str) -> Result<bool> {
        Ok(self.matches(&hostname_labels(host)?))
    }
}

impl fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// DomainRule rejects hostnames matching any of its patterns with
/// [`Error::DomainNotAllowed`].
#[derive(Debug, Clone, Default)]
pub struct DomainRule {
    patterns: Vec<DomainPattern>,
}

impl DomainRule {
    /// Create a rule from already parsed patterns.
    pub fn new(patterns: Vec<DomainPattern>) -> Self {
        Self { patterns }
    }

    /// Parse every domain, failing on the first malformed one.
    pub fn parse<I, S>(domains: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = domains
            .into_iter()
            .map(|d| {
                let d = d.as_ref();
                DomainPattern::new(d)
                    .map_err(|_| Error::invalid_input(format!("invalid domain '{}'", d)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(patterns))
    }

    /// The patterns of this rule.
    pub fn patterns(&self) -> &[DomainPattern] {
        &self.patterns
    }

    /// Get the number of patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

impl HostRule for DomainRule {
    fn check(&self, host: &str) -> Result<()> {
        let labels = hostname_labels(host)?;

        if self.patterns.iter().any(|p| p.matches(&labels)) {
            return Err(Error::DomainNotAllowed);
        }

        Ok(())
    }
}
