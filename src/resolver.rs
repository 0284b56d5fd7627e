//! Hostname resolution.
//!
//! The checker never performs DNS lookups on its own. A [`Resolver`] is
//! injected through configuration and called at most once per rule that uses
//! it. Results are never cached.

use std::fmt;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;

use crate::rule::HostRule;
use crate::{Error, Result};

/// Resolves a hostname to its IP addresses.
///
/// Implementations must be safe to call from several threads at once when a
/// [`Checker`](crate::Checker) is shared. Any timeout must be enforced by the
/// implementation itself.
pub trait Resolve: Send + Sync {
    /// Resolve `host` to an ordered list of addresses.
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>>;
}

impl<F> Resolve for F
where
    F: Fn(&str) -> Result<Vec<IpAddr>> + Send + Sync,
{
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        self(host)
    }
}

/// Shared resolver handle.
pub type Resolver = Arc<dyn Resolve>;

/// Wrap a closure or [`Resolve`] implementation into a [`Resolver`].
///
/// # Examples
/// ```
/// use std::net::IpAddr;
/// use urlegit::{resolver, Error, Resolve};
///
/// let r = resolver(|host: &str| match host {
///     "mock-loopback.com" => Ok(vec!["127.0.0.1".parse::<IpAddr>().unwrap()]),
///     _ => Err(Error::resolution(host, "no such host")),
/// });
/// assert_eq!(r.resolve("mock-loopback.com").unwrap().len(), 1);
/// ```
pub fn resolver<R: Resolve + 'static>(r: R) -> Resolver {
    Arc::new(r)
}

/// Resolver backed by the operating system's blocking lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        let addrs = (host, 0)
            .to_socket_addrs()
            .map_err(|e| Error::resolution(host, e))?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }

        log::debug!("Resolved {} to {:?}", host, ips);
        Ok(ips)
    }
}

/// Host rule that resolves the hostname and rejects it when any resolved
/// address fails `check`.
///
/// Resolver errors are returned unchanged.
pub struct ResolvedHostRule<F> {
    resolver: Resolver,
    check: F,
}

impl<F> ResolvedHostRule<F>
where
    F: Fn(IpAddr) -> Result<()> + Send + Sync,
{
    /// Create a rule checking every address `resolver` returns with `check`.
    pub fn new(resolver: Resolver, check: F) -> Self {
        Self { resolver, check }
    }
}

impl<F> HostRule for ResolvedHostRule<F>
where
    F: Fn(IpAddr) -> Result<()> + Send + Sync,
{
    fn check(&self, host: &str) -> Result<()> {
        let ips = self.resolver.resolve(host)?;
        ips.into_iter().try_for_each(|ip| (self.check)(ip))
    }
}

impl<F> fmt::Debug for ResolvedHostRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHostRule").finish_non_exhaustive()
    }
}
