//! # Main — CLI Entry Point
//!
//! Every search is available both as a subcommand (result printed as JSON on
//! stdout, logs on stderr) and through the HTTP server started by `serve`.
//!
//! ## Global Options
//!
//! - `--config` / `PRIMEPROBE_CONFIG`: optional TOML file (see `config.rs`).
//! - `--mr-rounds` / `MR_ROUNDS`: Miller–Rabin rounds, overriding the file.
//! - `--progress-interval`: seconds between progress log lines (0 disables).
//!
//! `LOG_FORMAT=json` switches logs to JSON; `RUST_LOG` sets the filter.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "primeprobe",
    version,
    about = "Search special prime families and probe open prime conjectures"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "PRIMEPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Miller-Rabin rounds for primality testing (overrides the config file)
    #[arg(long, env = "MR_ROUNDS")]
    mr_rounds: Option<u32>,

    /// Seconds between progress log lines for long searches; 0 disables
    #[arg(long)]
    progress_interval: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the first prime 1 2 … n … 2 1 concatenation; prints one JSON event per line
    Kaprekar {
        #[arg(long, default_value_t = 1000)]
        start: u64,
        #[arg(long, default_value_t = 3000)]
        end: u64,
    },
    /// Find repunit primes R(n) for prime n in [start, end]
    Repunit {
        #[arg(long, default_value_t = 2)]
        start: u64,
        #[arg(long, default_value_t = 1040)]
        end: u64,
    },
    /// Find Mersenne primes 2^p - 1 for p in [start, end) with Lucas-Lehmer
    Mersenne {
        #[arg(long, default_value_t = 2201)]
        start: u64,
        #[arg(long, default_value_t = 2300)]
        end: u64,
    },
    /// Up to four primes between M1^2 and M2^2
    Brocard {
        /// Lower bound M1 (decimal); needs --end-p too
        #[arg(long)]
        start_p: Option<String>,
        /// Upper bound M2 (decimal); needs --start-p too
        #[arg(long)]
        end_p: Option<String>,
    },
    /// Smallest palindromic prime with at least this many digits (odd lengths only)
    Palindromic {
        #[arg(long, default_value_t = 50)]
        min_digits: u64,
        /// Give up after generating this many palindromes
        #[arg(long)]
        max_candidates: Option<u64>,
    },
    /// Derive 2^(p-1)(2^p - 1) for each exponent
    Perfect {
        /// Comma-separated exponents, e.g. "2,3,5,7"
        #[arg(long)]
        p_values: Option<String>,
    },
    /// Find Wieferich primes in [start, end]
    Wieferich {
        #[arg(long, default_value_t = 2)]
        start: u64,
        #[arg(long, default_value_t = 4000)]
        end: u64,
    },
    /// Look for a prime between N^2 and (N+1)^2
    Legendre {
        /// N as a decimal integer of any size
        #[arg(long = "n")]
        n: String,
    },
    /// Look for primes in (N(N-1), N^2) and (N^2, N(N+1))
    Oppermann {
        /// N as a decimal integer of any size
        #[arg(long = "n")]
        n: String,
    },
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(long, env = "PRIMEPROBE_PORT")]
        port: Option<u16>,
        /// Address to bind (overrides the config file)
        #[arg(long)]
        bind: Option<IpAddr>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Structured logging: LOG_FORMAT=json for log shippers, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = cli::load_config(&cli)?;

    match &cli.command {
        Commands::Serve { port, bind } => cli::run_serve(config, *port, *bind),
        command => cli::run_search(command, &config),
    }
}
