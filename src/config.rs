//! Server configuration: TOML file, environment, and CLI overrides.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. CLI flags are applied on top of the file by `cli.rs`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::{SearchOptions, DEFAULT_MR_ROUNDS};

pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: IpAddr,
    /// Miller–Rabin rounds for the primality oracle.
    pub mr_rounds: u32,
    /// Capacity of the Kaprekar progress channel.
    pub stream_buffer: usize,
    /// Cap on palindromes generated per request; unset means unbounded.
    pub palindrome_max_candidates: Option<u64>,
    /// Background progress log period for long searches; 0 disables it.
    pub progress_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            mr_rounds: DEFAULT_MR_ROUNDS,
            stream_buffer: 16,
            palindrome_max_candidates: None,
            progress_interval_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            mr_rounds: self.mr_rounds,
            progress_interval: Duration::from_secs(self.progress_interval_secs),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mr_rounds == 0 {
            anyhow::bail!("mr_rounds must be at least 1");
        }
        if self.stream_buffer == 0 {
            anyhow::bail!("stream_buffer must be at least 1");
        }
        Ok(())
    }
}

/// Parse a server configuration from a TOML string.
pub fn parse_toml(content: &str) -> Result<ServerConfig> {
    let config: ServerConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load from `path`, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<ServerConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            parse_toml(&content).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(ServerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr().to_string(), "0.0.0.0:5001");
        assert_eq!(config.search_options().mr_rounds, 25);
    }

    #[test]
    fn partial_override() {
        let config = parse_toml(
            r#"
            port = 8080
            bind = "127.0.0.1"
            palindrome_max_candidates = 100000
            progress_interval_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.palindrome_max_candidates, Some(100_000));
        assert_eq!(config.search_options().progress_interval, Duration::ZERO);
        assert_eq!(config.stream_buffer, 16);
    }

    #[test]
    fn rejects_zero_rounds_and_buffer() {
        assert!(parse_toml("mr_rounds = 0").is_err());
        assert!(parse_toml("stream_buffer = 0").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_toml("prot = 1").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mr_rounds = 40").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.mr_rounds, 40);
        assert_eq!(load(None).unwrap(), ServerConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.toml"));
    }
}
