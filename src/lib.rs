//! urlegit - A policy-driven URL legitimacy checker.
//!
//! This crate decides whether a URL is safe to act upon, for example before a
//! server fetches it on behalf of a client. It guards against server-side
//! request forgery (SSRF): requests steered to loopback, private, or
//! otherwise forbidden destinations. It never issues requests itself.
//!
//! # Features
//!
//! - **Scheme rules**: allow-lists with case-insensitive matching
//! - **Domain rules**: root-first suffix matching with single-label wildcards
//! - **Subnet rules**: IPv4 and IPv6 CIDR matching
//! - **Loopback and literal-IP rules**: built in, no network access needed
//! - **Pluggable resolution**: inject a resolver to check resolved addresses
//! - **Custom rules**: closures plug into any stage of the pipeline
//! - **Thread-safe**: a built [`Checker`] is immutable
//!
//! # Quick Start
//!
//! ```
//! use urlegit::{CheckOption, Checker, Error};
//!
//! let checker = Checker::new([
//!     CheckOption::schemes(["http", "https"]),
//!     CheckOption::forbid_special_use_domains(),
//!     CheckOption::forbid_loopback(&[]),
//!     CheckOption::forbid_subnets(["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"], &[]),
//! ])
//! .unwrap();
//!
//! assert!(checker.is_legit("https://github.com"));
//! assert!(matches!(checker.check("http://127.0.0.1:8080"), Err(Error::Loopback)));
//! assert!(matches!(checker.check("http://10.0.0.5/admin"), Err(Error::SubnetNotAllowed)));
//! ```
//!
//! # Resolution
//!
//! Without a resolver, rules on addresses only see hosts that are literal IP
//! addresses. Install one with [`CheckOption::with_resolver`] (or pass one to
//! [`CheckOption::forbid_loopback`] / [`CheckOption::forbid_subnets`]) to
//! also check where symbolic hostnames point:
//!
//! ```no_run
//! use urlegit::{resolver, CheckOption, Checker, SystemResolver};
//!
//! let checker = Checker::new([
//!     CheckOption::forbid_loopback(&[]),
//!     CheckOption::with_resolver(Some(resolver(SystemResolver))),
//! ])
//! .unwrap();
//!
//! assert!(!checker.is_legit("http://localtest.me"));
//! ```
//!
//! # Evaluation Order
//!
//! 1. Scheme rules
//! 2. Empty hostname check
//! 3. Literal IP host: pre-resolution IP rules. Symbolic host: host rules,
//!    then the resolver
//! 4. IP rules against every candidate address
//!
//! The first failing rule ends evaluation and its error is returned.

mod checker;
mod config;
mod error;
mod option;
mod resolver;

pub mod rule;

// Re-export core types
pub use checker::{Checker, CheckerBuilder, RuleCounts};
pub use error::{BoxError, Error, Result};
pub use option::CheckOption;

// Re-export configuration
pub use config::PolicyConfig;

// Re-export resolution
pub use resolver::{resolver, Resolve, ResolvedHostRule, Resolver, SystemResolver};

// Re-export the parsed URL type accepted by `Checker::check_url`
pub use url::Url;
