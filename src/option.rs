//! Configuration directives for building a [`Checker`](crate::Checker).
//!
//! Each directive validates its own arguments when it is created and records
//! a failure instead of panicking. The failure surfaces when the checker is
//! built, so a list of directives can be assembled without intermediate
//! error handling.
//!
//! Directives are applied in the order given. Within each rule list this is
//! also the evaluation order, and evaluation stops at the first failing rule.

use std::fmt;
use std::sync::Arc;

use crate::checker::Draft;
use crate::resolver::{ResolvedHostRule, Resolver};
use crate::rule::{
    DomainRule, ForbidIpRule, HostRule, IpRule, LoopbackHostRule, LoopbackIpRule, SchemeRule,
    SharedHostRule, SharedIpRule, SharedSchemeRule, SubnetRule, SPECIAL_USE_DOMAINS,
};
use crate::{Error, Result};

/// A single configuration directive.
pub struct CheckOption {
    kind: Kind,
}

enum Kind {
    OnlyAllowSchemes(Vec<String>),
    Schemes(Vec<String>),
    SingleScheme(String),
    ForbidDomainNames {
        name: &'static str,
        rule: DomainRule,
    },
    ForbidLoopback(Option<Resolver>),
    ForbidAnyIps,
    ForbidSubnets {
        name: &'static str,
        rule: SubnetRule,
        originals: Vec<String>,
        resolver: Option<Resolver>,
    },
    WithResolver(Option<Resolver>),
    SchemeRule(SharedSchemeRule),
    HostRule(SharedHostRule),
    IpRule(SharedIpRule),
    Error(Error),
}

impl CheckOption {
    fn new(kind: Kind) -> Self {
        Self { kind }
    }

    /// Allow only the listed schemes, replacing any allow-list built so far.
    ///
    /// Matching is case-insensitive. An empty list rejects every URL.
    pub fn only_allow_schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Kind::OnlyAllowSchemes(lower_all(schemes)))
    }

    /// Add schemes to the allow-list.
    ///
    /// Ignored once [`single_scheme`](Self::single_scheme) is part of the
    /// configuration, wherever it appears.
    pub fn schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Kind::Schemes(lower_all(schemes)))
    }

    /// Allow exactly one scheme.
    ///
    /// This overrides every other allow-list directive regardless of order.
    pub fn single_scheme(scheme: &str) -> Self {
        Self::new(Kind::SingleScheme(scheme.to_lowercase()))
    }

    /// Forbid hostnames matching any of the given domain patterns.
    ///
    /// Patterns are matched from the top-level label, and `*` matches exactly
    /// one label. `example.com` therefore also forbids `www.example.com`.
    /// A pattern with an empty label makes the whole directive invalid.
    pub fn forbid_domain_names<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        forbid_domain_names("ForbidDomainNames", domains)
    }

    /// Forbid the reserved special-use domains listed in
    /// [`SPECIAL_USE_DOMAINS`].
    pub fn forbid_special_use_domains() -> Self {
        forbid_domain_names("ForbidSpecialUseDomains", SPECIAL_USE_DOMAINS)
    }

    /// Forbid loopback hosts.
    ///
    /// Without a resolver only the `localhost` name and loopback addresses
    /// are rejected. With one resolver, symbolic hostnames are also resolved
    /// and rejected if any address is loopback. More than one resolver is
    /// invalid.
    pub fn forbid_loopback(resolvers: &[Resolver]) -> Self {
        match single_resolver(resolvers) {
            Ok(resolver) => Self::new(Kind::ForbidLoopback(resolver)),
            Err(e) => Self::error(e),
        }
    }

    /// Forbid hosts that are literal IP addresses.
    ///
    /// Addresses obtained by resolving a symbolic hostname are not affected.
    pub fn forbid_any_ips() -> Self {
        Self::new(Kind::ForbidAnyIps)
    }

    /// Forbid addresses inside a single subnet. See [`forbid_subnets`](Self::forbid_subnets).
    pub fn forbid_subnet(subnet: &str, resolvers: &[Resolver]) -> Self {
        forbid_subnets("ForbidSubnet", [subnet], resolvers)
    }

    /// Forbid addresses inside any of the given subnets.
    ///
    /// With one resolver, symbolic hostnames are also resolved and rejected
    /// if any address falls in a listed subnet. A malformed CIDR or more than
    /// one resolver is invalid.
    pub fn forbid_subnets<I, S>(subnets: I, resolvers: &[Resolver]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        forbid_subnets("ForbidSubnets", subnets, resolvers)
    }

    /// Install the resolver used after host rules to obtain the addresses
    /// checked by IP rules. `None` removes a previously installed resolver.
    pub fn with_resolver(resolver: Option<Resolver>) -> Self {
        Self::new(Kind::WithResolver(resolver))
    }

    /// Append a user supplied scheme rule.
    pub fn custom_scheme_rule<R: SchemeRule + 'static>(rule: R) -> Self {
        Self::new(Kind::SchemeRule(Arc::new(rule)))
    }

    /// Append a user supplied host rule.
    pub fn custom_host_rule<R: HostRule + 'static>(rule: R) -> Self {
        Self::new(Kind::HostRule(Arc::new(rule)))
    }

    /// Append a user supplied IP rule.
    pub fn custom_ip_rule<R: IpRule + 'static>(rule: R) -> Self {
        Self::new(Kind::IpRule(Arc::new(rule)))
    }

    /// Make construction fail with `err`.
    pub fn error(err: Error) -> Self {
        Self::new(Kind::Error(err))
    }

    /// Apply this directive to a checker under construction.
    pub(crate) fn apply(self, draft: &mut Draft) -> Result<()> {
        match self.kind {
            Kind::OnlyAllowSchemes(schemes) => draft.replace_schemes(schemes),
            Kind::Schemes(schemes) => draft.add_schemes(schemes),
            Kind::SingleScheme(scheme) => draft.set_single_scheme(scheme),
            Kind::ForbidDomainNames { rule, .. } => draft.host_rules.push(Arc::new(rule)),
            Kind::ForbidLoopback(resolver) => {
                draft.ip_rules.push(Arc::new(LoopbackIpRule));
                draft.host_rules.push(Arc::new(LoopbackHostRule));
                if let Some(resolver) = resolver {
                    draft.host_rules.push(Arc::new(ResolvedHostRule::new(
                        resolver,
                        |ip| LoopbackIpRule.check(ip),
                    )));
                }
            }
            Kind::ForbidAnyIps => draft.ip_before_rules.push(Arc::new(ForbidIpRule)),
            Kind::ForbidSubnets { rule, resolver, .. } => {
                let rule = Arc::new(rule);
                draft.ip_rules.push(rule.clone());
                if let Some(resolver) = resolver {
                    draft.host_rules.push(Arc::new(ResolvedHostRule::new(
                        resolver,
                        move |ip| rule.check(ip),
                    )));
                }
            }
            Kind::WithResolver(resolver) => draft.resolver = resolver,
            Kind::SchemeRule(rule) => draft.scheme_rules.push(rule),
            Kind::HostRule(rule) => draft.host_rules.push(rule),
            Kind::IpRule(rule) => draft.ip_rules.push(rule),
            Kind::Error(err) => return Err(err),
        }
        Ok(())
    }
}

fn lower_all<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect()
}

fn single_resolver(resolvers: &[Resolver]) -> Result<Option<Resolver>> {
    match resolvers {
        [] => Ok(None),
        [resolver] => Ok(Some(resolver.clone())),
        _ => Err(Error::invalid_input("only one resolver allowed")),
    }
}

fn forbid_domain_names<I, S>(name: &'static str, domains: I) -> CheckOption
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match DomainRule::parse(domains) {
        Ok(rule) => CheckOption::new(Kind::ForbidDomainNames { name, rule }),
        Err(e) => CheckOption::error(e),
    }
}

fn forbid_subnets<I, S>(name: &'static str, subnets: I, resolvers: &[Resolver]) -> CheckOption
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let originals: Vec<String> = subnets
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect();

    let rule = match SubnetRule::parse(&originals) {
        Ok(rule) => rule,
        Err(e) => return CheckOption::error(e),
    };
    let resolver = match single_resolver(resolvers) {
        Ok(resolver) => resolver,
        Err(e) => return CheckOption::error(e),
    };

    CheckOption::new(Kind::ForbidSubnets {
        name,
        rule,
        originals,
        resolver,
    })
}

/// Write `'a', 'b'` style lists.
fn write_quoted<I, S>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = S>,
    S: fmt::Display,
{
    let mut comma = "";
    for item in items {
        write!(f, "{}'{}'", comma, item)?;
        comma = ", ";
    }
    Ok(())
}

impl fmt::Display for CheckOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::OnlyAllowSchemes(schemes) => {
                write!(f, "OnlyAllowSchemes(")?;
                write_quoted(f, schemes)?;
                write!(f, ")")
            }
            Kind::Schemes(schemes) => {
                write!(f, "Schemes(")?;
                write_quoted(f, schemes)?;
                write!(f, ")")
            }
            Kind::SingleScheme(scheme) => write!(f, "SingleScheme('{}')", scheme),
            Kind::ForbidDomainNames { name, rule } => {
                write!(f, "{}(", name)?;
                write_quoted(f, rule.patterns().iter().map(|p| p.original()))?;
                write!(f, ")")
            }
            Kind::ForbidLoopback(None) => write!(f, "ForbidLoopback()"),
            Kind::ForbidLoopback(Some(_)) => write!(f, "ForbidLoopback(resolver)"),
            Kind::ForbidAnyIps => write!(f, "ForbidAnyIPs()"),
            Kind::ForbidSubnets {
                name,
                originals,
                resolver,
                ..
            } => {
                write!(f, "{}(", name)?;
                write_quoted(f, originals)?;
                if resolver.is_some() {
                    write!(f, ", resolver")?;
                }
                write!(f, ")")
            }
            Kind::WithResolver(None) => write!(f, "WithResolver(nil)"),
            Kind::WithResolver(Some(_)) => write!(f, "WithResolver(resolver)"),
            Kind::SchemeRule(_) => write!(f, "CustomSchemeRule(rule)"),
            Kind::HostRule(_) => write!(f, "CustomHostRule(rule)"),
            Kind::IpRule(_) => write!(f, "CustomIpRule(rule)"),
            Kind::Error(err) => write!(f, "Error('{}')", err),
        }
    }
}

impl fmt::Debug for CheckOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CheckOption")
            .field(&self.to_string())
            .finish()
    }
}
