//! # CLI Execution Functions
//!
//! Config resolution and the execution logic for each subcommand. Results go
//! to stdout as JSON, in the same shapes the HTTP API returns.

use anyhow::{anyhow, Result};
use primeprobe::config::{self, ServerConfig};
use primeprobe::correlation::MersenneCache;
use primeprobe::palindromic::PalindromeError;
use primeprobe::{
    brocard, conjectures, kaprekar, mersenne, palindromic, parse_integer, perfect, repunit,
    wieferich,
};
use serde::Serialize;
use std::net::IpAddr;
use tracing::info;

use super::{Cli, Commands};

/// File (or defaults), then CLI/env overrides, then validation.
pub fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(rounds) = cli.mr_rounds {
        config.mr_rounds = rounds;
    }
    if let Some(secs) = cli.progress_interval {
        config.progress_interval_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

pub fn run_serve(mut config: ServerConfig, port: Option<u16>, bind: Option<IpAddr>) -> Result<()> {
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(bind) = bind {
        config.bind = bind;
    }
    info!(
        addr = %config.addr(),
        mr_rounds = config.mr_rounds,
        stream_buffer = config.stream_buffer,
        "primeprobe starting"
    );
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(primeprobe::dashboard::run(config))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Run one search subcommand and print its result.
pub fn run_search(command: &Commands, config: &ServerConfig) -> Result<()> {
    let opts = config.search_options();
    match command {
        Commands::Kaprekar { start, end } => {
            for event in kaprekar::KaprekarSearch::new(*start, *end, opts.mr_rounds) {
                print_json(&event)?;
            }
            Ok(())
        }
        Commands::Repunit { start, end } => print_json(&repunit::search(*start, *end, &opts)?),
        Commands::Mersenne { start, end } => {
            // A one-shot process has no later Brocard request to feed
            let cache = MersenneCache::new();
            print_json(&mersenne::search(*start, *end, &cache, &opts)?)
        }
        Commands::Brocard { start_p, end_p } => print_json(&brocard::evaluate(
            start_p.as_deref(),
            end_p.as_deref(),
            &MersenneCache::new(),
            opts.mr_rounds,
        )),
        Commands::Palindromic {
            min_digits,
            max_candidates,
        } => {
            let cap = max_candidates.or(config.palindrome_max_candidates);
            match palindromic::search(*min_digits, cap, &opts) {
                Ok(result) => print_json(&result),
                Err(e) => {
                    if let PalindromeError::StepLimit {
                        candidates_tested, ..
                    } = &e
                    {
                        print_json(&serde_json::json!({
                            "error": "step limit reached",
                            "candidates_tested": candidates_tested,
                        }))?;
                    }
                    Err(e.into())
                }
            }
        }
        Commands::Perfect { p_values } => {
            let exponents = perfect::parse_exponents(p_values.as_deref());
            print_json(&perfect::derive(&exponents))
        }
        Commands::Wieferich { start, end } => print_json(&wieferich::search(*start, *end, &opts)),
        Commands::Legendre { n } => print_json(&conjectures::legendre(&parse_integer(n)?)),
        Commands::Oppermann { n } => print_json(&conjectures::oppermann(&parse_integer(n)?)),
        Commands::Serve { .. } => Err(anyhow!("serve is not a search subcommand")),
    }
}
