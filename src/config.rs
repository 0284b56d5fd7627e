//! Declarative policy files.
//!
//! A policy file is YAML:
//!
//! ```yaml
//! schemes: [http, https]
//! forbid_special_use_domains: true
//! forbid_domains:
//!   - internal.example.com
//!   - "*.corp"
//! forbid_loopback: true
//! forbid_ip_literals: false
//! forbid_subnets:
//!   - 10.0.0.0/8
//!   - 192.168.0.0/16
//! resolve: true
//! ```
//!
//! Every field is optional. Directives are produced in a fixed order:
//! schemes, domains, loopback, IP literals, subnets, resolver.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::option::CheckOption;
use crate::resolver::Resolver;
use crate::{Checker, Result};

/// Policy loaded from a YAML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Schemes added to the allow-list
    pub schemes: Vec<String>,
    /// Allow-list replacing `schemes` when set
    pub only_schemes: Option<Vec<String>>,
    /// Single allowed scheme, overriding both lists
    pub single_scheme: Option<String>,
    /// Forbidden domain patterns
    pub forbid_domains: Vec<String>,
    /// Forbid the reserved special-use domains
    pub forbid_special_use_domains: bool,
    /// Forbid `localhost` and loopback addresses
    pub forbid_loopback: bool,
    /// Forbid hosts that are literal IP addresses
    pub forbid_ip_literals: bool,
    /// Forbidden subnets in CIDR notation
    pub forbid_subnets: Vec<String>,
    /// Resolve hostnames and check the resulting addresses
    pub resolve: bool,
}

impl PolicyConfig {
    /// Parse a policy from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse a policy file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&content)?;
        log::info!("Loaded policy from {:?}", path.as_ref());
        Ok(config)
    }

    /// Translate the policy into an ordered list of directives.
    ///
    /// `resolver` is only used when `resolve` is set. It is installed as the
    /// checker's resolver and is not passed to the loopback or subnet
    /// directives, so each URL is resolved once.
    pub fn to_options(&self, resolver: Option<Resolver>) -> Vec<CheckOption> {
        let mut options = Vec::new();

        if !self.schemes.is_empty() {
            options.push(CheckOption::schemes(&self.schemes));
        }
        if let Some(only) = &self.only_schemes {
            options.push(CheckOption::only_allow_schemes(only));
        }
        if let Some(scheme) = &self.single_scheme {
            options.push(CheckOption::single_scheme(scheme));
        }
        if self.forbid_special_use_domains {
            options.push(CheckOption::forbid_special_use_domains());
        }
        if !self.forbid_domains.is_empty() {
            options.push(CheckOption::forbid_domain_names(&self.forbid_domains));
        }
        if self.forbid_loopback {
            options.push(CheckOption::forbid_loopback(&[]));
        }
        if self.forbid_ip_literals {
            options.push(CheckOption::forbid_any_ips());
        }
        if !self.forbid_subnets.is_empty() {
            options.push(CheckOption::forbid_subnets(&self.forbid_subnets, &[]));
        }
        if self.resolve {
            if let Some(resolver) = resolver {
                options.push(CheckOption::with_resolver(Some(resolver)));
            } else {
                log::warn!("Policy asks for resolution but no resolver was supplied");
            }
        }

        options
    }

    /// Build a checker from this policy.
    pub fn build(&self, resolver: Option<Resolver>) -> Result<Checker> {
        Checker::new(self.to_options(resolver))
    }
}
