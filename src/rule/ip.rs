//! Literal IP host rule implementation.

use std::net::IpAddr;

use super::IpRule;
use crate::{Error, Result};

/// ForbidIpRule rejects every address with [`Error::IpNotAllowed`].
///
/// It is installed as a pre-resolution rule, so it only fires when the URL
/// host is itself an IP literal. Addresses reached through a resolver are
/// never seen by it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbidIpRule;

impl IpRule for ForbidIpRule {
    fn check(&self, _ip: IpAddr) -> Result<()> {
        Err(Error::IpNotAllowed)
    }
}
