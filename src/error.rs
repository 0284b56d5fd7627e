//! Error types for urlegit.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error used for resolver and custom rule failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error type for urlegit operations.
///
/// `InvalidInput` is only produced while a [`Checker`](crate::Checker) is
/// being constructed. The policy variants are produced while evaluating a URL.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed construction argument (bad domain, bad CIDR, too many resolvers)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The URL scheme is not in the allowed set
    #[error("scheme not allowed")]
    SchemeNotAllowed,

    /// The URL has no hostname
    #[error("hostname is empty")]
    HostnameEmpty,

    /// The hostname matches a forbidden domain pattern
    #[error("domain not allowed")]
    DomainNotAllowed,

    /// The host is, or resolves to, a loopback address
    #[error("loopback address")]
    Loopback,

    /// The address falls inside a forbidden subnet
    #[error("subnet not allowed")]
    SubnetNotAllowed,

    /// Literal IP hosts are forbidden
    #[error("IPs not allowed")]
    IpNotAllowed,

    /// The resolver failed to resolve a hostname
    #[error("failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: BoxError,
    },

    /// URL syntax error
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Failure reported by a user supplied rule
    #[error("{0}")]
    Custom(BoxError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Build a resolution failure for `host`.
    pub fn resolution(host: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Resolution {
            host: host.into(),
            source: source.into(),
        }
    }

    /// Wrap an arbitrary error raised by a user supplied rule.
    pub fn custom(source: impl Into<BoxError>) -> Self {
        Self::Custom(source.into())
    }

    /// Whether this error is a policy rejection raised while evaluating a URL.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::SchemeNotAllowed
                | Error::HostnameEmpty
                | Error::DomainNotAllowed
                | Error::Loopback
                | Error::SubnetNotAllowed
                | Error::IpNotAllowed
                | Error::Custom(_)
        )
    }
}

/// Result type alias for urlegit operations.
pub type Result<T> = std::result::Result<T, Error>;
