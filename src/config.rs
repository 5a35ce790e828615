use std::str::FromStr;

use anyhow::Context;

const DEFAULT_PORT: u16 = 42069;
const DEFAULT_MAX_CONNECTIONS: usize = 256;
const DEFAULT_INITIAL_BUFFER_SIZE: usize = 512;
const DEFAULT_MAX_HEADER_SIZE: usize = 8 * 1024;

pub const PORT_ENV: &str = "HTTPFROMTCP_PORT";
pub const MAX_CONNECTIONS_ENV: &str = "HTTPFROMTCP_MAX_CONNECTIONS";
pub const MAX_HEADER_SIZE_ENV: &str = "HTTPFROMTCP_MAX_HEADER_SIZE";

/// Buffer limits for decoding one request head.
///
/// `max_header_size` bounds the whole head: request line, header lines and
/// the blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    initial_buffer_size: usize,
    max_header_size: usize,
}

impl DecoderConfig {
    /// `initial_buffer_size` is clamped into `1..=max_header_size`.
    pub fn new(initial_buffer_size: usize, max_header_size: usize) -> Self {
        let max_header_size = max_header_size.max(1);
        Self {
            initial_buffer_size: initial_buffer_size.clamp(1, max_header_size),
            max_header_size,
        }
    }

    pub fn initial_buffer_size(&self) -> usize {
        self.initial_buffer_size
    }

    pub fn max_header_size(&self) -> usize {
        self.max_header_size
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_BUFFER_SIZE, DEFAULT_MAX_HEADER_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_connections: usize,
    pub decoder: DecoderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            decoder: DecoderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `HTTPFROMTCP_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(port) = parse_var(&lookup, PORT_ENV)? {
            config.port = port;
        }
        if let Some(max_connections) = parse_var::<usize>(&lookup, MAX_CONNECTIONS_ENV)? {
            anyhow::ensure!(max_connections > 0, "{MAX_CONNECTIONS_ENV} must be positive");
            config.max_connections = max_connections;
        }
        if let Some(max_header_size) = parse_var(&lookup, MAX_HEADER_SIZE_ENV)? {
            config.decoder = DecoderConfig::new(DEFAULT_INITIAL_BUFFER_SIZE, max_header_size);
        }
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse().with_context(|| format!("parse {key}={raw:?}")))
        .transpose()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 42069);
        assert_eq!(config.decoder.initial_buffer_size(), 512);
        assert_eq!(config.decoder.max_header_size(), 8192);
    }

    #[test]
    fn overrides() {
        let config = from_vars(&[
            (PORT_ENV, "8080"),
            (MAX_CONNECTIONS_ENV, " 4 "),
            (MAX_HEADER_SIZE_ENV, "256"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.decoder.max_header_size(), 256);
        assert_eq!(config.decoder.initial_buffer_size(), 256);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = from_vars(&[(PORT_ENV, "http")]).unwrap_err();
        assert!(err.to_string().contains(PORT_ENV), "{err}");
        assert!(from_vars(&[(MAX_CONNECTIONS_ENV, "0")]).is_err());
    }

    #[test]
    fn decoder_config_clamps_initial_size() {
        let config = DecoderConfig::new(0, 64);
        assert_eq!(config.initial_buffer_size(), 1);
        let config = DecoderConfig::new(1024, 64);
        assert_eq!(config.initial_buffer_size(), 64);
    }
}
