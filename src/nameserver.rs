//! Turning a nameserver given by the user, or by the system resolver
//! configuration, into a socket address.

use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use tokio::net::lookup_host;
use tracing::debug;

use crate::error::ConfigError;

/// Resolve `text` (an IP literal, `[v6]`, or host name, optionally prefixed
/// with `@`) to an address on `port`.
pub async fn resolve_nameserver(text: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let host = text.trim();
    let host = host.strip_prefix('@').unwrap_or(host);
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if host.is_empty() {
        return Err(ConfigError::InvalidNameserver(text.to_string()));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let fqdn = host.trim_end_matches('.');
    let mut addrs = lookup_host((fqdn, port))
        .await
        .map_err(|e| ConfigError::InvalidNameserver(format!("{}: {}", host, e)))?;
    let addr = addrs
        .next()
        .ok_or_else(|| ConfigError::InvalidNameserver(format!("{}: no addresses", host)))?;
    debug!("Nameserver {} resolved to {}", host, addr);
    Ok(addr)
}

/// The parts of resolv.conf(5) this tool needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvConf {
    pub nameservers: Vec<String>,
}

impl ResolvConf {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let to_config_error = |e: io::Error| ConfigError::ResolvConf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let mut file = fs::File::open(path).map_err(to_config_error)?;
        Self::parse(&mut file).map_err(to_config_error)
    }

    /// Parses the configuration from a reader.
    ///
    /// Comment lines and keywords other than `nameserver` are skipped.
    pub fn parse<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut conf = Self::default();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            let mut words = line.split_whitespace();
            if words.next() == Some("nameserver") {
                if let Some(server) = words.next() {
                    conf.nameservers.push(server.to_string());
                }
            }
        }
        Ok(conf)
    }

    pub fn first_nameserver(&self) -> Result<&str, ConfigError> {
        self.nameservers
            .first()
            .map(String::as_str)
            .ok_or(ConfigError::NoNameserver)
    }
}
