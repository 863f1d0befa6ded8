// chainval: X.509 certificate chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use anyhow::{Context, Result};
use chainval::chain::{Policy, Validator, Verdict};
use chainval::rsa::HashAlgorithm;
use chainval::x509::{Certificate, load_certificate_file};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "chainval")]
#[command(about = "Validate a root <- intermediate <- end-entity X.509 chain", long_about = None)]
struct Cli {
    /// Root CA certificate (PEM or DER)
    #[arg(long)]
    root_ca: PathBuf,
    /// Intermediate CA certificate (PEM or DER)
    #[arg(long)]
    intermediate_ca: PathBuf,
    /// End-entity certificate (PEM or DER)
    #[arg(long)]
    end_entity: PathBuf,
    /// Instant to validate at, as RFC 3339. Defaults to the end-entity's notBefore
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,
    /// Require issuer and subject names to link up along the chain
    #[arg(long)]
    require_name_chaining: bool,
    /// Accept only these signature digests (repeatable, e.g. sha256)
    #[arg(long = "allow-hash", value_parser = parse_hash)]
    allow_hash: Vec<HashAlgorithm>,
    /// Fail instead of warn when the root is outside its validity window
    #[arg(long)]
    strict_root: bool,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| format!("invalid RFC 3339 instant: {err}"))
}

fn parse_hash(s: &str) -> Result<HashAlgorithm, String> {
    HashAlgorithm::from_name(s).ok_or_else(|| {
        let known: Vec<_> = HashAlgorithm::ALL.iter().map(|h| h.to_string()).collect();
        format!("unknown hash algorithm, expected one of: {}", known.join(", "))
    })
}

fn load(role: &str, path: &PathBuf) -> Result<Certificate> {
    let cert = load_certificate_file(path)
        .with_context(|| format!("failed to load {role} certificate from {}", path.display()))?;
    println!("{role}: {cert}");
    Ok(cert)
}

fn run(cli: Cli) -> Result<Verdict> {
    let root = load("Root CA", &cli.root_ca)?;
    let intermediate = load("Intermediate CA", &cli.intermediate_ca)?;
    let end_entity = load("End-entity", &cli.end_entity)?;

    let policy = Policy {
        require_name_chaining: cli.require_name_chaining,
        allowed_hash_algorithms: (!cli.allow_hash.is_empty()).then_some(cli.allow_hash),
        enforce_root_validity: cli.strict_root,
    };
    let at = cli.at.unwrap_or(end_entity.not_valid_before);

    Ok(Validator::new(policy).validate(&root, &intermediate, &end_entity, at))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(Verdict::Valid) => {
            println!("Certificate chain is valid");
            ExitCode::SUCCESS
        }
        Ok(verdict) => {
            println!("Certificate chain is {verdict}");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
