//! Rule types and trait definitions.
//!
//! A rule is a pure check over one part of a URL. There are three kinds,
//! each a one-method trait:
//!
//! - [`SchemeRule`]: receives the lower-cased scheme
//! - [`HostRule`]: receives the lower-cased, non-empty hostname
//! - [`IpRule`]: receives a single IP address
//!
//! Closures with the matching signature implement the traits directly, so a
//! custom rule can be written inline:
//!
//! ```
//! use urlegit::{Error, rule::HostRule};
//!
//! let rule = |host: &str| {
//!     if host == "internal.corp" {
//!         Err(Error::DomainNotAllowed)
//!     } else {
//!         Ok(())
//!     }
//! };
//! assert!(rule.check("internal.corp").is_err());
//! assert!(rule.check("example.com").is_ok());
//! ```

mod cidr;
mod domain;
mod ip;
mod loopback;
mod scheme;

pub use cidr::{SubnetRule, SubnetSpec};
pub use domain::{DomainPattern, DomainRule, SPECIAL_USE_DOMAINS};
pub use ip::ForbidIpRule;
pub use loopback::{is_loopback, LoopbackHostRule, LoopbackIpRule};
pub use scheme::SchemeAllowList;

use std::net::IpAddr;
use std::sync::Arc;

use crate::Result;

/// Validates the scheme of a URL.
pub trait SchemeRule: Send + Sync {
    /// Check a lower-cased scheme.
    fn check(&self, scheme: &str) -> Result<()>;
}

/// Validates the hostname of a URL.
pub trait HostRule: Send + Sync {
    /// Check a lower-cased, non-empty hostname.
    fn check(&self, host: &str) -> Result<()>;
}

/// Validates an IP address, either the literal host or a resolved address.
pub trait IpRule: Send + Sync {
    /// Check a single address.
    fn check(&self, ip: IpAddr) -> Result<()>;
}

impl<F> SchemeRule for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn check(&self, scheme: &str) -> Result<()> {
        self(scheme)
    }
}

impl<F> HostRule for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn check(&self, host: &str) -> Result<()> {
        self(host)
    }
}

impl<F> IpRule for F
where
    F: Fn(IpAddr) -> Result<()> + Send + Sync,
{
    fn check(&self, ip: IpAddr) -> Result<()> {
        self(ip)
    }
}

/// Shared scheme rule handle.
pub type SharedSchemeRule = Arc<dyn SchemeRule>;

/// Shared host rule handle.
pub type SharedHostRule = Arc<dyn HostRule>;

/// Shared IP rule handle.
pub type SharedIpRule = Arc<dyn IpRule>;
