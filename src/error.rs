use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::dns::ParseError;

/// Which transport a network failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Tcp => write!(f, "TCP"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No nameserver given and none found in resolver configuration")]
    NoNameserver,

    #[error("Cannot read resolver configuration {path}: {reason}")]
    ResolvConf { path: PathBuf, reason: String },

    #[error("Invalid nameserver: {0}")]
    InvalidNameserver(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid UDP payload size: {0}")]
    InvalidPayloadSize(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Nsec3Error {
    #[error("Unknown hash algorithm: {0}")]
    UnsupportedAlgorithm(u8),

    #[error("No NSEC3PARAM Record for '{0}'")]
    NoNsec3Param(String),

    #[error("Id mismatch: sent {sent}, received {received}")]
    IdentityMismatch { sent: u16, received: u16 },

    #[error("{protocol} exchange failed: {reason}")]
    Transport { protocol: Protocol, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    #[error("Malformed DNS message: {0}")]
    Parse(String),
}

impl Nsec3Error {
    pub(crate) fn transport(protocol: Protocol, reason: impl fmt::Display) -> Self {
        Nsec3Error::Transport {
            protocol,
            reason: reason.to_string(),
        }
    }
}

impl From<ParseError> for Nsec3Error {
    fn from(err: ParseError) -> Self {
        Nsec3Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Nsec3Error>;
