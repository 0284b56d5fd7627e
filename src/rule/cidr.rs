//! IP subnet rule implementation.

use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;

use super::IpRule;
use crate::{Error, Result};

/// A parsed CIDR network.
///
/// IPv4 networks also contain the IPv4-mapped IPv6 form of their members,
/// while IPv6 networks never contain IPv4 or IPv4-mapped addresses.
///
/// # Examples
/// ```
/// use urlegit::rule::SubnetSpec;
///
/// let subnet = SubnetSpec::parse("10.0.0.0/8").unwrap();
/// assert!(subnet.contains("10.1.2.3".parse().unwrap()));
/// assert!(!subnet.contains("11.0.0.0".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetSpec {
    net: IpNet,
}

impl SubnetSpec {
    /// Parse CIDR notation such as `192.168.0.0/16` or `fc00::/7`.
    ///
    /// Host bits may be set; the network is truncated to its prefix.
    pub fn parse(cidr: &str) -> Result<Self> {
        let net: IpNet = cidr
            .trim()
            .parse()
            .map_err(|_| Error::invalid_input(format!("invalid subnet '{}'", cidr)))?;
        Ok(Self { net: net.trunc() })
    }

    /// The underlying network.
    pub fn net(&self) -> IpNet {
        self.net
    }

    /// Check whether `ip` falls inside this network.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.net, ip) {
            (IpNet::V4(net), IpAddr::V4(v4)) => net.contains(&v4),
            (IpNet::V4(net), IpAddr::V6(v6)) => {
                v6.to_ipv4_mapped().map_or(false, |v4| net.contains(&v4))
            }
            (IpNet::V6(net), IpAddr::V6(v6)) => {
                v6.to_ipv4_mapped().is_none() && net.contains(&v6)
            }
            (IpNet::V6(_), IpAddr::V4(_)) => false,
        }
    }
}

impl fmt::Display for SubnetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

/// SubnetRule rejects addresses inside any of its networks with
/// [`Error::SubnetNotAllowed`].
#[derive(Debug, Clone, Default)]
pub struct SubnetRule {
    subnets: Vec<SubnetSpec>,
}

impl SubnetRule {
    /// Create a rule from already parsed networks.
    pub fn new(subnets: Vec<SubnetSpec>) -> Self {
        Self { subnets }
    }

    /// Parse every CIDR, failing on the first malformed one.
    pub fn parse<I, S>(cidrs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subnets = cidrs
            .into_iter()
            .map(|c| SubnetSpec::parse(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(subnets))
    }

    /// The networks of this rule.
    pub fn subnets(&self) -> &[SubnetSpec] {
        &self.subnets
    }

    /// Whether any network contains `ip`.
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.subnets.iter().any(|s| s.contains(ip))
    }
}

impl IpRule for SubnetRule {
    fn check(&self, ip: IpAddr) -> Result<()> {
        if self.contains(ip) {
            return Err(Error::SubnetNotAllowed);
        }
        Ok(())
    }
}
