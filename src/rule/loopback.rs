//! Loopback rule implementation.

use std::net::IpAddr;

use super::{HostRule, IpRule};
use crate::{Error, Result};

/// Hostname that always refers to the local machine.
const LOCALHOST: &str = "localhost";

/// Check whether `ip` is a loopback address.
///
/// IPv4-mapped IPv6 forms such as `::ffff:127.0.0.1` count as loopback.
pub fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().map_or(false, |v4| v4.is_loopback())
        }
    }
}

/// Rejects loopback addresses with [`Error::Loopback`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackIpRule;

impl IpRule for LoopbackIpRule {
    fn check(&self, ip: IpAddr) -> Result<()> {
        if is_loopback(ip) {
            return Err(Error::Loopback);
        }
        Ok(())
    }
}

/// Rejects the `localhost` hostname with [`Error::Loopback`].
///
/// One trailing root dot is ignored, so `localhost.` is rejected too.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackHostRule;

impl HostRule for LoopbackHostRule {
    fn check(&self, host: &str) -> Result<()> {
        if host.strip_suffix('.').unwrap_or(host) == LOCALHOST {
            return Err(Error::Loopback);
        }
        Ok(())
    }
}
