use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Smallest payload size a DNS client may advertise (RFC 6891 section 6.2.5)
const MIN_UDP_PAYLOAD_SIZE: u16 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nsec3HashConfig {
    /// Port used when a nameserver is given without one
    pub port: u16,

    /// Bound on each UDP or TCP attempt
    pub timeout: Duration,

    /// UDP payload size advertised in the EDNS0 OPT record
    pub udp_payload_size: u16,

    /// Resolver configuration consulted when no nameserver is given
    pub resolv_conf: PathBuf,

    /// Verbose diagnostics on stderr
    pub debug: bool,
}

impl Default for Nsec3HashConfig {
    fn default() -> Self {
        Self {
            port: 53,
            timeout: Duration::from_secs(5),
            udp_payload_size: 4096,
            resolv_conf: PathBuf::from("/etc/resolv.conf"),
            debug: false,
        }
    }
}

impl Nsec3HashConfig {
    /// Create a config from the defaults overlaid with `NSEC3HASH_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables supplied by `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("NSEC3HASH_PORT") {
            config.port = match port.trim().parse::<u16>() {
                Ok(0) | Err(_) => return Err(ConfigError::InvalidPort(port)),
                Ok(p) => p,
            };
        }

        if let Some(timeout_str) = lookup("NSEC3HASH_TIMEOUT") {
            let timeout_secs = timeout_str
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(timeout_str.clone()))?;
            if timeout_secs == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "Timeout must be greater than 0".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Some(size_str) = lookup("NSEC3HASH_UDP_PAYLOAD_SIZE") {
            let size = size_str
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPayloadSize(size_str.clone()))?;
            if size < MIN_UDP_PAYLOAD_SIZE {
                return Err(ConfigError::InvalidPayloadSize(format!(
                    "{} is below the minimum of {}",
                    size, MIN_UDP_PAYLOAD_SIZE
                )));
            }
            config.udp_payload_size = size;
        }

        if let Some(path) = lookup("NSEC3HASH_RESOLV_CONF") {
            if path.trim().is_empty() {
                return Err(ConfigError::ParseError(
                    "NSEC3HASH_RESOLV_CONF must not be empty".to_string(),
                ));
            }
            config.resolv_conf = PathBuf::from(path);
        }

        if let Some(debug) = lookup("NSEC3HASH_DEBUG") {
            config.debug = parse_bool(&debug, false);
        }

        Ok(config)
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
