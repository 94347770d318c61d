//! Server configuration
//!
//! Command line arguments, each backed by a `SCREENSHARE_*` environment
//! variable and a default. The listen address is also accepted as the first
//! positional argument.

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::message::IceServer;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:9100";

/// Default bound for a single socket write, in milliseconds
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 2000;

/// Channel buffer size for server commands
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Default STUN server handed out with sessions
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Listen address
    #[arg(env = "SCREENSHARE_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Upper bound for one socket write; a peer stalled past it is dropped
    #[arg(
        long = "write-timeout-ms",
        env = "SCREENSHARE_WRITE_TIMEOUT_MS",
        default_value_t = DEFAULT_WRITE_TIMEOUT_MS,
        value_parser = parse_positive::<u64>
    )]
    pub write_timeout_ms: u64,

    #[arg(
        long,
        env = "SCREENSHARE_CHANNEL_BUFFER",
        default_value_t = DEFAULT_CHANNEL_BUFFER,
        value_parser = parse_positive::<usize>
    )]
    pub channel_buffer: usize,

    /// STUN/TURN urls sent in session offers, comma separated
    #[arg(
        long = "stun-servers",
        env = "SCREENSHARE_STUN_SERVERS",
        default_value = DEFAULT_STUN_SERVER,
        value_delimiter = ','
    )]
    pub stun_servers: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
            stun_servers: vec![DEFAULT_STUN_SERVER.to_string()],
        }
    }
}

impl ServerConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// ICE servers for new sessions, one per configured url
    pub fn ice_servers(&self) -> Vec<IceServer> {
        self.stun_servers
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(|url| IceServer {
                urls: vec![url.to_string()],
            })
            .collect()
    }
}

/// Parse a positive integer setting
fn parse_positive<T>(value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialOrd,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::NotPositive(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ServerConfig, clap::Error> {
        ServerConfig::try_parse_from(std::iter::once("screenshare_signal").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.write_timeout(), Duration::from_secs(2));
        assert_eq!(config.ice_servers().len(), 1);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "0.0.0.0:5050",
            "--write-timeout-ms",
            "500",
            "--channel-buffer",
            "16",
            "--stun-servers",
            "stun:a:1, stun:b:2",
        ])
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:5050");
        assert_eq!(config.write_timeout(), Duration::from_millis(500));
        assert_eq!(config.channel_buffer, 16);
        let urls: Vec<String> = config
            .ice_servers()
            .into_iter()
            .flat_map(|server| server.urls)
            .collect();
        assert_eq!(urls, vec!["stun:a:1", "stun:b:2"]);
    }

    #[test]
    fn test_empty_stun_list_disables_ice() {
        let config = parse(&["--stun-servers", ""]).unwrap();
        assert!(config.ice_servers().is_empty());
    }

    #[test]
    fn test_invalid_number() {
        assert!(parse(&["--write-timeout-ms", "soon"]).is_err());
        assert!(parse(&["--channel-buffer", "0"]).is_err());
        assert!(matches!(
            parse_positive::<u64>("0"),
            Err(ConfigError::NotPositive(ref v)) if v == "0"
        ));
    }
}
