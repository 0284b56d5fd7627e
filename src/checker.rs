//! Checker construction and the URL evaluation pipeline.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use url::{Host, Url};

use crate::option::CheckOption;
use crate::resolver::Resolver;
use crate::rule::{
    HostRule, IpRule, SchemeAllowList, SchemeRule, SharedHostRule, SharedIpRule, SharedSchemeRule,
};
use crate::{Error, Result};

/// Checker decides whether a URL is legitimate under a fixed set of rules.
///
/// Rules are evaluated in this order, and the first failure is returned:
/// 1. Scheme rules, against the lower-cased scheme
/// 2. An empty hostname is rejected with [`Error::HostnameEmpty`]
/// 3. If the host is a literal IP address, pre-resolution IP rules run
///    against it. Otherwise host rules run against the hostname, then the
///    installed resolver (if any) is called once to obtain its addresses
/// 4. IP rules run against every candidate address, rule by rule
///
/// A symbolic hostname with no resolver installed has no candidate
/// addresses, so step 4 is skipped for it.
///
/// A `Checker` is immutable once built and can be shared between threads.
///
/// # Examples
/// ```
/// use urlegit::{CheckOption, Checker};
///
/// let checker = Checker::new([
///     CheckOption::only_allow_schemes(["https"]),
///     CheckOption::forbid_special_use_domains(),
/// ])
/// .unwrap();
///
/// assert!(checker.is_legit("https://github.com"));
/// assert!(!checker.is_legit("http://github.com"));
/// assert!(!checker.is_legit("https://printer.local"));
/// ```
pub struct Checker {
    scheme_rules: Vec<SharedSchemeRule>,
    /// Only run when the host is a literal IP address
    ip_before_rules: Vec<SharedIpRule>,
    host_rules: Vec<SharedHostRule>,
    ip_rules: Vec<SharedIpRule>,
    resolver: Option<Resolver>,
    /// Directive descriptions in application order
    options: Vec<String>,
}

/// Number of rules in each list of a [`Checker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleCounts {
    /// Scheme rules
    pub scheme: usize,
    /// IP rules applied to literal IP hosts only
    pub ip_before: usize,
    /// Host rules
    pub host: usize,
    /// IP rules applied to every candidate address
    pub ip: usize,
}

enum Hostname {
    Literal(IpAddr),
    Name(String),
}

impl Checker {
    /// Build a checker by applying `options` in order.
    ///
    /// `None` entries are skipped. The first invalid directive, or the first
    /// [`CheckOption::error`], aborts construction and its error is returned.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Option<CheckOption>>,
    {
        let mut draft = Draft::default();
        let mut descriptions = Vec::new();

        for option in options {
            let option: Option<CheckOption> = option.into();
            if let Some(option) = option {
                descriptions.push(option.to_string());
                option.apply(&mut draft)?;
            }
        }

        let checker = draft.finish(descriptions);
        log::debug!("Built {}", checker);
        Ok(checker)
    }

    /// Start a fluent builder.
    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::new()
    }

    /// Returns true if `url` parses and passes every rule.
    pub fn is_legit(&self, url: &str) -> bool {
        self.check(url).is_ok()
    }

    /// Returns true if the parsed `url` passes every rule.
    pub fn is_url_legit(&self, url: &Url) -> bool {
        self.check_url(url).is_ok()
    }

    /// Parse `url` and evaluate it.
    ///
    /// A URL with an empty host such as `http://` is rejected with
    /// [`Error::HostnameEmpty`]. Other parse errors are returned as
    /// [`Error::Url`]. Special schemes take the first path segment as the
    /// host, so `http:///path` is evaluated with host `path`.
    pub fn check(&self, url: &str) -> Result<()> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(url::ParseError::EmptyHost) => return Err(Error::HostnameEmpty),
            Err(e) => return Err(e.into()),
        };
        self.check_url(&parsed)
    }

    /// Evaluate an already parsed URL.
    pub fn check_url(&self, url: &Url) -> Result<()> {
        let result = self.evaluate(url);
        if let Err(ref e) = result {
            log::debug!("Rejected {}: {}", url, e);
        }
        result
    }

    fn evaluate(&self, url: &Url) -> Result<()> {
        let scheme = url.scheme().to_lowercase();
        for rule in &self.scheme_rules {
            rule.check(&scheme)?;
        }

        let ips = match classify(url)? {
            Hostname::Literal(ip) => {
                log::trace!("Host of {} is literal address {}", url, ip);
                for rule in &self.ip_before_rules {
                    rule.check(ip)?;
                }
                vec![ip]
            }
            Hostname::Name(host) => {
                log::trace!("Host of {} is hostname {}", url, host);
                for rule in &self.host_rules {
                    rule.check(&host)?;
                }
                match &self.resolver {
                    Some(resolver) => resolver.resolve(&host)?,
                    None => Vec::new(),
                }
            }
        };

        if ips.is_empty() {
            return Ok(());
        }

        for rule in &self.ip_rules {
            for ip in &ips {
                rule.check(*ip)?;
            }
        }

        Ok(())
    }

    /// Number of rules in each list.
    pub fn rule_counts(&self) -> RuleCounts {
        RuleCounts {
            scheme: self.scheme_rules.len(),
            ip_before: self.ip_before_rules.len(),
            host: self.host_rules.len(),
            ip: self.ip_rules.len(),
        }
    }

    /// Whether a resolver is installed for the post-resolution step.
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }
}

fn classify(url: &Url) -> Result<Hostname> {
    match url.host() {
        None => Err(Error::HostnameEmpty),
        Some(Host::Ipv4(v4)) => Ok(Hostname::Literal(IpAddr::V4(v4))),
        Some(Host::Ipv6(v6)) => Ok(Hostname::Literal(IpAddr::V6(v6))),
        Some(Host::Domain(domain)) => {
            let host = domain.to_lowercase();
            if host.is_empty() {
                return Err(Error::HostnameEmpty);
            }
            // Opaque hosts of non-special schemes are not parsed as addresses.
            match host.parse::<IpAddr>() {
                Ok(ip) => Ok(Hostname::Literal(ip)),
                Err(_) => Ok(Hostname::Name(host)),
            }
        }
    }
}

impl fmt::Display for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "urlegit::Checker{{")?;
        if !self.options.is_empty() {
            write!(f, " {} ", self.options.join(", "))?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("options", &self.options)
            .field("rules", &self.rule_counts())
            .field("resolver", &self.has_resolver())
            .finish()
    }
}

/// Mutable state while directives are applied.
#[derive(Default)]
pub(crate) struct Draft {
    allow_list: Option<SchemeAllowList>,
    single_scheme: Option<String>,
    pub(crate) scheme_rules: Vec<SharedSchemeRule>,
    pub(crate) ip_before_rules: Vec<SharedIpRule>,
    pub(crate) host_rules: Vec<SharedHostRule>,
    pub(crate) ip_rules: Vec<SharedIpRule>,
    pub(crate) resolver: Option<Resolver>,
}

impl Draft {
    pub(crate) fn replace_schemes(&mut self, schemes: Vec<String>) {
        self.allow_list = Some(SchemeAllowList::new(schemes));
    }

    pub(crate) fn add_schemes(&mut self, schemes: Vec<String>) {
        self.allow_list
            .get_or_insert_with(SchemeAllowList::default)
            .extend(schemes);
    }

    pub(crate) fn set_single_scheme(&mut self, scheme: String) {
        self.single_scheme = Some(scheme);
    }

    /// Freeze the draft. The built-in scheme allow-list runs before any
    /// custom scheme rule, and a single scheme overrides the allow-list.
    fn finish(self, options: Vec<String>) -> Checker {
        let allow_list = match self.single_scheme {
            Some(scheme) => Some(SchemeAllowList::new([scheme])),
            None => self.allow_list,
        };

        let mut scheme_rules: Vec<SharedSchemeRule> = Vec::with_capacity(self.scheme_rules.len() + 1);
        if let Some(list) = allow_list {
            scheme_rules.push(Arc::new(list));
        }
        scheme_rules.extend(self.scheme_rules);

        Checker {
            scheme_rules,
            ip_before_rules: self.ip_before_rules,
            host_rules: self.host_rules,
            ip_rules: self.ip_rules,
            resolver: self.resolver,
            options,
        }
    }
}

/// Fluent builder collecting [`CheckOption`]s in order.
///
/// # Examples
/// ```
/// use urlegit::Checker;
///
/// let checker = Checker::builder()
///     .schemes(["http", "https"])
///     .forbid_loopback(&[])
///     .forbid_subnets(["10.0.0.0/8", "192.168.0.0/16"], &[])
///     .build()
///     .unwrap();
///
/// assert!(checker.is_legit("https://example.com"));
/// assert!(!checker.is_legit("http://localhost:8080"));
/// assert!(!checker.is_legit("http://192.168.1.1"));
/// ```
#[derive(Debug, Default)]
pub struct CheckerBuilder {
    options: Vec<CheckOption>,
}

impl CheckerBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary directive.
    pub fn option(mut self, option: CheckOption) -> Self {
        self.options.push(option);
        self
    }

    /// See [`CheckOption::only_allow_schemes`].
    pub fn only_allow_schemes<I, S>(self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.option(CheckOption::only_allow_schemes(schemes))
    }

    /// See [`CheckOption::schemes`].
    pub fn schemes<I, S>(self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.option(CheckOption::schemes(schemes))
    }

    /// See [`CheckOption::single_scheme`].
    pub fn single_scheme(self, scheme: &str) -> Self {
        self.option(CheckOption::single_scheme(scheme))
    }

    /// See [`CheckOption::forbid_domain_names`].
    pub fn forbid_domain_names<I, S>(self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.option(CheckOption::forbid_domain_names(domains))
    }

    /// See [`CheckOption::forbid_special_use_domains`].
    pub fn forbid_special_use_domains(self) -> Self {
        self.option(CheckOption::forbid_special_use_domains())
    }

    /// See [`CheckOption::forbid_loopback`].
    pub fn forbid_loopback(self, resolvers: &[Resolver]) -> Self {
        self.option(CheckOption::forbid_loopback(resolvers))
    }

    /// See [`CheckOption::forbid_any_ips`].
    pub fn forbid_any_ips(self) -> Self {
        self.option(CheckOption::forbid_any_ips())
    }

    /// See [`CheckOption::forbid_subnet`].
    pub fn forbid_subnet(self, subnet: &str, resolvers: &[Resolver]) -> Self {
        self.option(CheckOption::forbid_subnet(subnet, resolvers))
    }

    /// See [`CheckOption::forbid_subnets`].
    pub fn forbid_subnets<I, S>(self, subnets: I, resolvers: &[Resolver]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.option(CheckOption::forbid_subnets(subnets, resolvers))
    }

    /// See [`CheckOption::with_resolver`].
    pub fn with_resolver(self, resolver: Option<Resolver>) -> Self {
        self.option(CheckOption::with_resolver(resolver))
    }

    /// See [`CheckOption::custom_scheme_rule`].
    pub fn custom_scheme_rule<R: SchemeRule + 'static>(self, rule: R) -> Self {
        self.option(CheckOption::custom_scheme_rule(rule))
    }

    /// See [`CheckOption::custom_host_rule`].
    pub fn custom_host_rule<R: HostRule + 'static>(self, rule: R) -> Self {
        self.option(CheckOption::custom_host_rule(rule))
    }

    /// See [`CheckOption::custom_ip_rule`].
    pub fn custom_ip_rule<R: IpRule + 'static>(self, rule: R) -> Self {
        self.option(CheckOption::custom_ip_rule(rule))
    }

    /// Apply the collected directives.
    pub fn build(self) -> Result<Checker> {
        Checker::new(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MOCK_LOOPBACK_URL: &str = "http://mock-loopback.com";
    const MOCK_PRIVATE_LOOPBACK_URL: &str = "http://mock-private-loopback.com";
    const MOCK_LOOPBACK_PRIVATE_URL: &str = "http://mock-loopback-private.com";
    const MOCK_PRIVATE_URL: &str = "http://mock-private.com";
    const MOCK_UNSUPPORTED_URL: &str = "http://mock-unsupported.com";

    fn mock_resolve(host: &str) -> Result<Vec<IpAddr>> {
        let loopback: IpAddr = "127.0.0.1".parse().unwrap();
        let local: IpAddr = "192.168.1.1".parse().unwrap();

        match host {
            "mock-loopback.com" => Ok(vec![loopback]),
            "mock-private-loopback.com" => Ok(vec![local, loopback]),
            "mock-loopback-private.com" => Ok(vec![loopback, local]),
            "mock-private.com" => Ok(vec![local]),
            _ => Err(Error::resolution(host, "no such host")),
        }
    }

    fn mock() -> Resolver {
        resolver(mock_resolve)
    }

    fn http() -> CheckOption {
        CheckOption::schemes(["http"])
    }

    #[test]
    fn test_empty_checker_accepts_everything_with_host() {
        let checker = Checker::new(Vec::<CheckOption>::new()).unwrap();

        assert!(checker.is_legit("http://example.com"));
        assert!(checker.is_legit("ftp://127.0.0.1"));
        assert!(checker.is_legit("custom://whatever"));
        assert_eq!(checker.rule_counts(), RuleCounts::default());
        assert_eq!(checker.to_string(), "urlegit::Checker{}");
    }

    #[test]
    fn test_none_options_are_skipped() {
        let checker = Checker::new([None, Some(http()), None]).unwrap();

        assert_eq!(checker.rule_counts().scheme, 1);
        assert_eq!(checker.to_string(), "urlegit::Checker{ Schemes('http') }");
    }

    #[test]
    fn test_parse_error_passthrough() {
        let checker = Checker::new([http()]).unwrap();

        assert!(matches!(checker.check("not a url"), Err(Error::Url(_))));
        assert!(matches!(checker.check("http://[::1"), Err(Error::Url(_))));
    }

    #[test]
    fn test_empty_host_on_parse() {
        let checker = Checker::new([http()]).unwrap();

        assert!(matches!(checker.check("http://"), Err(Error::HostnameEmpty)));
        assert!(matches!(checker.check("http://:8080"), Err(Error::HostnameEmpty)));
        assert!(!checker.is_legit("http://"));
    }

    #[test]
    fn test_hostname_empty() {
        let checker = Checker::new(Vec::<CheckOption>::new()).unwrap();

        assert!(matches!(checker.check("file:///etc/passwd"), Err(Error::HostnameEmpty)));
        assert!(matches!(checker.check("mailto:someone@example.com"), Err(Error::HostnameEmpty)));
    }

    #[test]
    fn test_scheme_checked_before_hostname() {
        let checker = Checker::new([http()]).unwrap();

        assert!(matches!(checker.check("file:///etc/passwd"), Err(Error::SchemeNotAllowed)));
    }

    #[test]
    fn test_scheme_case_insensitive() {
        let checker = Checker::new([CheckOption::only_allow_schemes(["HTTPS"])]).unwrap();

        assert!(checker.is_legit("HTTPS://example.com"));
        assert!(checker.is_legit("https://example.com"));
        assert!(matches!(checker.check("http://example.com"), Err(Error::SchemeNotAllowed)));
    }

    #[test]
    fn test_only_allow_schemes_empty_rejects() {
        let checker = Checker::new([CheckOption::only_allow_schemes(Vec::<String>::new())]).unwrap();

        assert!(matches!(checker.check("http://example.com"), Err(Error::SchemeNotAllowed)));
    }

    #[test]
    fn test_only_allow_schemes_replaces() {
        let checker = Checker::new([
            CheckOption::schemes(["http", "https"]),
            CheckOption::only_allow_schemes(["ftp"]),
        ])
        .unwrap();

        assert!(checker.is_legit("ftp://example.com"));
        assert!(!checker.is_legit("http://example.com"));
        assert_eq!(checker.rule_counts().scheme, 1);
    }

    #[test]
    fn test_schemes_accumulate() {
        let checker = Checker::new([CheckOption::schemes(["http"]), CheckOption::schemes(["https"])])
            .unwrap();

        assert!(checker.is_legit("http://example.com"));
        assert!(checker.is_legit("https://example.com"));
        assert!(!checker.is_legit("ftp://example.com"));
        assert_eq!(checker.rule_counts().scheme, 1);
    }

    #[test]
    fn test_single_scheme_overrides_regardless_of_order() {
        let orders = [
            vec![CheckOption::schemes(["http", "https"]), CheckOption::single_scheme("ftp")],
            vec![CheckOption::single_scheme("ftp"), CheckOption::schemes(["http", "https"])],
            vec![CheckOption::single_scheme("ftp"), CheckOption::only_allow_schemes(["http"])],
        ];

        for options in orders {
            let checker = Checker::new(options).unwrap();

            assert!(checker.is_legit("ftp://host"));
            assert!(matches!(checker.check("http://host"), Err(Error::SchemeNotAllowed)));
            assert!(matches!(checker.check("https://host"), Err(Error::SchemeNotAllowed)));
        }
    }

    #[test]
    fn test_custom_scheme_rule_runs_after_allow_list() {
        let checker = Checker::builder()
            .custom_scheme_rule(|s: &str| -> Result<()> {
                if s == "wss" {
                    Ok(())
                } else {
                    Err(Error::custom("only wss"))
                }
            })
            .schemes(["ws", "wss"])
            .build()
            .unwrap();

        assert!(checker.is_legit("wss://example.com"));
        assert!(matches!(checker.check("ws://example.com"), Err(Error::Custom(_))));
        assert!(matches!(checker.check("ftp://example.com"), Err(Error::SchemeNotAllowed)));
    }

    #[test]
    fn test_forbid_any_ips() {
        let checker = Checker::new([http(), CheckOption::forbid_any_ips()]).unwrap();

        assert!(matches!(checker.check("http://192.168.1.1"), Err(Error::IpNotAllowed)));
        assert!(matches!(checker.check("http://[::1]:8080/"), Err(Error::IpNotAllowed)));
        assert!(checker.is_legit("http://example.com"));
    }

    #[test]
    fn test_forbid_any_ips_ignores_resolved_addresses() {
        let checker = Checker::new([
            http(),
            CheckOption::forbid_any_ips(),
            CheckOption::with_resolver(Some(mock())),
        ])
        .unwrap();

        assert!(checker.is_legit(MOCK_PRIVATE_URL));
        assert!(checker.is_legit(MOCK_LOOPBACK_URL));
    }

    #[test]
    fn test_forbid_loopback_without_resolver() {
        let checker = Checker::new([http(), CheckOption::forbid_loopback(&[])]).unwrap();

        assert!(matches!(checker.check("http://localhost"), Err(Error::Loopback)));
        assert!(matches!(checker.check("http://LOCALHOST:8080/x"), Err(Error::Loopback)));
        assert!(matches!(checker.check("http://127.0.0.1"), Err(Error::Loopback)));
        assert!(matches!(checker.check("http://127.8.9.10"), Err(Error::Loopback)));
        assert!(matches!(checker.check("http://[::1]"), Err(Error::Loopback)));
        assert!(matches!(checker.check("http://[::ffff:127.0.0.1]"), Err(Error::Loopback)));
        assert!(matches!(checker.check("http://localhost./"), Err(Error::Loopback)));
        assert!(checker.is_legit(MOCK_LOOPBACK_URL));
        assert!(checker.is_legit("http://192.168.1.1"));
    }

    #[test]
    fn test_forbid_loopback_with_resolver() {
        let checker = Checker::new([http(), CheckOption::forbid_loopback(&[mock()])]).unwrap();

        assert!(matches!(checker.check(MOCK_LOOPBACK_URL), Err(Error::Loopback)));
        assert!(matches!(checker.check(MOCK_PRIVATE_LOOPBACK_URL), Err(Error::Loopback)));
        assert!(matches!(checker.check(MOCK_LOOPBACK_PRIVATE_URL), Err(Error::Loopback)));
        assert!(checker.is_legit(MOCK_PRIVATE_URL));
        assert!(matches!(
            checker.check(MOCK_UNSUPPORTED_URL),
            Err(Error::Resolution { .. })
        ));
        assert!(!checker.has_resolver());
    }

    #[test]
    fn test_forbid_loopback_too_many_resolvers() {
        let err = Checker::new([http(), CheckOption::forbid_loopback(&[mock(), mock()])]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_forbid_subnets() {
        let checker = Checker::new([
            http(),
            CheckOption::forbid_subnets(["192.168.0.0/16", "10.0.0.0/8"], &[]),
        ])
        .unwrap();

        assert!(matches!(checker.check("http://192.168.1.1"), Err(Error::SubnetNotAllowed)));
        assert!(matches!(checker.check("http://10.255.255.255"), Err(Error::SubnetNotAllowed)));
        assert!(checker.is_legit("http://11.0.0.0"));
        assert!(checker.is_legit("http://192.169.0.0"));
        assert!(checker.is_legit(MOCK_PRIVATE_URL));
    }

    #[test]
    fn test_forbid_subnet_with_resolver() {
        let checker = Checker::new([
            http(),
            CheckOption::forbid_subnet("192.168.1.0/24", &[mock()]),
        ])
        .unwrap();

        assert!(matches!(checker.check(MOCK_PRIVATE_URL), Err(Error::SubnetNotAllowed)));
        assert!(matches!(checker.check(MOCK_PRIVATE_LOOPBACK_URL), Err(Error::SubnetNotAllowed)));
        assert!(checker.is_legit(MOCK_LOOPBACK_URL));
    }

    #[test]
    fn test_forbid_subnet_invalid() {
        for options in [
            vec![CheckOption::forbid_subnet("10.0.0.0/", &[])],
            vec![CheckOption::forbid_subnets(["10.0.0.0/8", "nope"], &[])],
            vec![CheckOption::forbid_subnet("10.0.0.0/8", &[mock(), mock()])],
        ] {
            assert!(matches!(Checker::new(options), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_forbid_domain_names() {
        let checker = Checker::new([
            http(),
            CheckOption::forbid_domain_names(["example.com", "*.corp"]),
        ])
        .unwrap();

        assert!(matches!(checker.check("http://example.com"), Err(Error::DomainNotAllowed)));
        assert!(matches!(checker.check("http://WWW.Example.com./"), Err(Error::DomainNotAllowed)));
        assert!(matches!(checker.check("http://git.corp"), Err(Error::DomainNotAllowed)));
        assert!(checker.is_legit("http://corp"));
        assert!(checker.is_legit("http://example.org"));
        assert!(checker.is_legit("http://93.184.216.34"));
    }

    #[test]
    fn test_forbid_domain_names_invalid() {
        for domain in ["example..com", "foo..com", ".com", ""] {
            let err = Checker::new([CheckOption::forbid_domain_names([domain])]).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{domain:?}");
        }
    }

    #[test]
    fn test_custom_ip_rule_on_literal_host() {
        let excluded: IpAddr = "192.168.1.1".parse().unwrap();
        let checker = Checker::builder()
            .custom_ip_rule(move |ip: IpAddr| -> Result<()> {
                if ip == excluded {
                    Err(Error::custom("excluded address"))
                } else {
                    Ok(())
                }
            })
            .build()
            .unwrap();

        match checker.check("http://192.168.1.1") {
            Err(Error::Custom(e)) => assert_eq!(e.to_string(), "excluded address"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(checker.is_legit("http://192.168.1.2"));
        assert!(checker.is_legit("http://example.com"));
    }

    #[test]
    fn test_post_resolution_rules_need_resolver() {
        let checker = Checker::new([http(), CheckOption::forbid_subnet("192.168.0.0/16", &[])]).unwrap();
        assert!(checker.is_legit(MOCK_PRIVATE_URL));

        let checker = Checker::new([
            http(),
            CheckOption::forbid_subnet("192.168.0.0/16", &[]),
            CheckOption::with_resolver(Some(mock())),
        ])
        .unwrap();
        assert!(matches!(checker.check(MOCK_PRIVATE_URL), Err(Error::SubnetNotAllowed)));
        assert!(checker.has_resolver());
    }

    #[test]
    fn test_with_resolver_none_clears() {
        let checker = Checker::new([
            CheckOption::with_resolver(Some(mock())),
            CheckOption::with_resolver(None),
        ])
        .unwrap();

        assert!(!checker.has_resolver());
        assert!(checker.is_legit(MOCK_UNSUPPORTED_URL));
    }

    #[test]
    fn test_resolver_error_stops_pipeline() {
        let ip_rule_calls = Arc::new(AtomicUsize::new(0));
        let calls = ip_rule_calls.clone();

        let checker = Checker::builder()
            .with_resolver(Some(mock()))
            .custom_ip_rule(move |_: IpAddr| -> Result<()> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build()
            .unwrap();

        match checker.check(MOCK_UNSUPPORTED_URL) {
            Err(Error::Resolution { host, source }) => {
                assert_eq!(host, "mock-unsupported.com");
                assert_eq!(source.to_string(), "no such host");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(ip_rule_calls.load(Ordering::SeqCst), 0);

        assert!(checker.is_legit(MOCK_PRIVATE_LOOPBACK_URL));
        assert_eq!(ip_rule_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolver_called_once_per_evaluation() {
        let resolutions = Arc::new(AtomicUsize::new(0));
        let counter = resolutions.clone();

        let checker = Checker::builder()
            .forbid_loopback(&[])
            .forbid_subnet("10.0.0.0/8", &[])
            .with_resolver(Some(resolver(move |host: &str| -> Result<Vec<IpAddr>> {
                counter.fetch_add(1, Ordering::SeqCst);
                mock_resolve(host)
            })))
            .build()
            .unwrap();

        assert!(matches!(checker.check(MOCK_LOOPBACK_URL), Err(Error::Loopback)));
        assert_eq!(resolutions.load(Ordering::SeqCst), 1);
        assert!(checker.is_legit(MOCK_PRIVATE_URL));
        assert_eq!(resolutions.load(Ordering::SeqCst), 2);

        assert!(checker.is_legit("http://192.168.1.1"));
        assert_eq!(resolutions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rule_order_outer_rules_inner_addresses() {
        let checker = Checker::builder()
            .forbid_subnet("192.168.0.0/16", &[])
            .forbid_loopback(&[])
            .with_resolver(Some(mock()))
            .build()
            .unwrap();

        // Subnet rule runs over every address before the loopback rule.
        assert!(matches!(checker.check(MOCK_LOOPBACK_PRIVATE_URL), Err(Error::SubnetNotAllowed)));
        assert!(matches!(checker.check(MOCK_PRIVATE_LOOPBACK_URL), Err(Error::SubnetNotAllowed)));
        assert!(matches!(checker.check(MOCK_LOOPBACK_URL), Err(Error::Loopback)));
    }

    #[test]
    fn test_host_rules_in_order() {
        let checker = Checker::builder()
            .custom_host_rule(|_: &str| -> Result<()> { Err(Error::custom("first")) })
            .forbid_domain_names(["example.com"])
            .build()
            .unwrap();

        match checker.check("http://example.com") {
            Err(Error::Custom(e)) => assert_eq!(e.to_string(), "first"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_option() {
        let err = Checker::new([http(), CheckOption::error(Error::custom("boom")), CheckOption::forbid_any_ips()])
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let err = Checker::new([
            CheckOption::forbid_subnet("bad", &[]),
            CheckOption::error(Error::custom("later")),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_check_url_matches_check() {
        let checker = Checker::new([http(), CheckOption::forbid_loopback(&[])]).unwrap();

        for s in ["http://localhost", "http://example.com", "ftp://example.com"] {
            let url = Url::parse(s).unwrap();
            assert_eq!(checker.is_url_legit(&url), checker.is_legit(s));
            assert_eq!(
                checker.check_url(&url).map_err(|e| e.to_string()),
                checker.check(s).map_err(|e| e.to_string())
            );
        }
    }

    #[test]
    fn test_idempotent() {
        let checker = Checker::new([
            http(),
            CheckOption::forbid_loopback(&[mock()]),
            CheckOption::forbid_special_use_domains(),
        ])
        .unwrap();

        for s in [MOCK_LOOPBACK_URL, MOCK_PRIVATE_URL, "http://foo.test", "http://github.com"] {
            assert_eq!(checker.is_legit(s), checker.is_legit(s));
        }
    }

    #[test]
    fn test_display() {
        let checker = Checker::builder()
            .schemes(["http"])
            .forbid_loopback(&[mock()])
            .forbid_any_ips()
            .build()
            .unwrap();

        assert_eq!(
            checker.to_string(),
            "urlegit::Checker{ Schemes('http'), ForbidLoopback(resolver), ForbidAnyIPs() }"
        );
    }

    #[test]
    fn test_checker_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Checker>();
    }
}
