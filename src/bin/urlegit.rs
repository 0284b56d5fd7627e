//! urlegit: CLI tool for checking URLs against an SSRF policy.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use urlegit::{resolver, Checker, PolicyConfig, SystemResolver};

#[derive(Parser)]
#[command(name = "urlegit")]
#[command(version = "0.1.0")]
#[command(about = "Check URLs against an SSRF policy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one or more URLs
    Check {
        #[command(flatten)]
        policy: PolicyArgs,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,

        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Print the checker built from the policy
    Describe {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Args)]
struct PolicyArgs {
    /// YAML policy file; flags are applied on top of it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allowed scheme (repeatable)
    #[arg(long = "scheme")]
    schemes: Vec<String>,

    /// Allow exactly this scheme
    #[arg(long)]
    single_scheme: Option<String>,

    /// Forbidden domain pattern (repeatable)
    #[arg(long = "forbid-domain")]
    forbid_domains: Vec<String>,

    /// Forbid special-use domains such as *.local and *.test
    #[arg(long)]
    special_use: bool,

    /// Forbid localhost and loopback addresses
    #[arg(long)]
    forbid_loopback: bool,

    /// Forbid hosts that are literal IP addresses
    #[arg(long)]
    forbid_ips: bool,

    /// Forbidden subnet in CIDR notation (repeatable)
    #[arg(long = "forbid-subnet")]
    forbid_subnets: Vec<String>,

    /// Resolve hostnames with the system resolver
    #[arg(long)]
    resolve: bool,
}

impl PolicyArgs {
    fn into_config(self) -> urlegit::Result<PolicyConfig> {
        let mut config = match &self.config {
            Some(path) => PolicyConfig::from_path(path)?,
            None => PolicyConfig::default(),
        };

        config.schemes.extend(self.schemes);
        if self.single_scheme.is_some() {
            config.single_scheme = self.single_scheme;
        }
        config.forbid_domains.extend(self.forbid_domains);
        config.forbid_special_use_domains |= self.special_use;
        config.forbid_loopback |= self.forbid_loopback;
        config.forbid_ip_literals |= self.forbid_ips;
        config.forbid_subnets.extend(self.forbid_subnets);
        config.resolve |= self.resolve;

        Ok(config)
    }

    fn build(self) -> urlegit::Result<Checker> {
        let config = self.into_config()?;
        config.build(Some(resolver(SystemResolver)))
    }
}

#[derive(Serialize)]
struct Verdict<'a> {
    url: &'a str,
    legit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { policy, json, urls } => {
            let checker = build_or_exit(policy);
            if !check_urls(&checker, &urls, json) {
                std::process::exit(1);
            }
        }
        Commands::Describe { policy } => {
            let checker = build_or_exit(policy);
            println!("{}", checker);
        }
    }
}

fn build_or_exit(policy: PolicyArgs) -> Checker {
    match policy.build() {
        Ok(checker) => checker,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Print a verdict per URL. Returns false if any URL was rejected.
fn check_urls(checker: &Checker, urls: &[String], json: bool) -> bool {
    let mut all_legit = true;

    for url in urls {
        let result = checker.check(url);
        all_legit &= result.is_ok();

        let verdict = Verdict {
            url,
            legit: result.is_ok(),
            reason: result.err().map(|e| e.to_string()),
        };

        if json {
            match serde_json::to_string(&verdict) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Error: {}", e),
            }
        } else {
            match &verdict.reason {
                None => println!("ALLOW  {}", verdict.url),
                Some(reason) => println!("REJECT {} ({})", verdict.url, reason),
            }
        }
    }

    all_legit
}
