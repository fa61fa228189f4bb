use clap::Parser;
use std::path::PathBuf;
use vuln_impact::impact_analysis::domain::{Ecosystem, PackageRef, Severity, TraversalSeed};

/// Trace vulnerable packages to the source files that import them
#[derive(Parser, Debug)]
#[command(name = "vuln-impact")]
#[command(version)]
#[command(
    about = "Trace vulnerable packages to the source files that import them and rank remediation",
    long_about = None
)]
pub struct Args {
    /// Scan-records JSON document (packages, imports, module links, dependencies, advisories)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Traverse impact from this vulnerability; may be repeated
    #[arg(long = "seed-cve", value_name = "CVE_ID")]
    pub seed_cves: Vec<String>,

    /// Traverse impact from this package; may be repeated, requires --ecosystem
    #[arg(long = "seed-package", value_name = "NAME", requires = "ecosystem")]
    pub seed_packages: Vec<String>,

    /// Ecosystem of the --seed-package values (python, javascript, rust, go)
    #[arg(long, value_name = "ECOSYSTEM")]
    pub ecosystem: Option<Ecosystem>,

    /// Maximum number of reverse hops from a vulnerable package
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Exit with code 1 when a vulnerability at or above this severity is found
    #[arg(long = "fail-on", value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,

    /// Config file (defaults to vuln-impact.config.yml next to the input)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Seeds named on the command line; empty means every vulnerable package
    pub fn seeds(&self) -> Vec<TraversalSeed> {
        let mut seeds: Vec<TraversalSeed> = self
            .seed_cves
            .iter()
            .map(|cve_id| TraversalSeed::vulnerability(cve_id))
            .collect();
        if let Some(ecosystem) = self.ecosystem {
            seeds.extend(
                self.seed_packages
                    .iter()
                    .map(|name| TraversalSeed::package(PackageRef::new(name, ecosystem))),
            );
        }
        seeds
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
