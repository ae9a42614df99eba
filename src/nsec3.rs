//! NSEC3 owner-name hashing (RFC 5155 section 5).

use std::fmt;

use ring::digest::{Context, SHA1_FOR_LEGACY_USE_ONLY};
use tracing::trace;

use crate::dns::rdata::Nsec3ParamData;
use crate::error::{Nsec3Error, Result};
use crate::name::DomainName;

/// NSEC3 hash algorithms. SHA-1 is the only one assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nsec3HashAlgorithm {
    Sha1,
}

impl TryFrom<u8> for Nsec3HashAlgorithm {
    type Error = Nsec3Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Sha1),
            other => Err(Nsec3Error::UnsupportedAlgorithm(other)),
        }
    }
}

/// The (algorithm, iterations, salt) triple a zone hashes its names with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashParameters {
    pub algorithm: u8,
    /// Additional rounds after the first; zero still hashes once
    pub iterations: u16,
    pub salt: Vec<u8>,
}

impl HashParameters {
    pub fn new(algorithm: u8, iterations: u16, salt: Vec<u8>) -> Self {
        Self {
            algorithm,
            iterations,
            salt,
        }
    }

    /// Parameters as written on a command line or in a zone file.
    ///
    /// The salt is hexadecimal; `-` and the empty string both mean no salt.
    pub fn from_presentation(salt: &str, algorithm: u8, iterations: u16) -> Result<Self> {
        let salt = match salt {
            "" | "-" => Vec::new(),
            hex_salt => hex::decode(hex_salt)
                .map_err(|e| Nsec3Error::InvalidSalt(format!("'{}': {}", hex_salt, e)))?,
        };
        if salt.len() > u8::MAX as usize {
            return Err(Nsec3Error::InvalidSalt(format!(
                "{} octets exceeds the 255 octet limit",
                salt.len()
            )));
        }
        Ok(Self::new(algorithm, iterations, salt))
    }

    /// Hash `name` with these parameters, encoded for display.
    pub fn hash_name(&self, name: &DomainName) -> Result<String> {
        let digest = nsec3_hash(name, self.algorithm, self.iterations, &self.salt)?;
        Ok(encode_base32hex(&digest))
    }
}

impl From<Nsec3ParamData> for HashParameters {
    fn from(data: Nsec3ParamData) -> Self {
        Self::new(data.algorithm, data.iterations, data.salt)
    }
}

impl fmt::Display for HashParameters {
    /// Zone file layout: `algorithm iterations salt`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let salt = if self.salt.is_empty() {
            "-".to_string()
        } else {
            hex::encode_upper(&self.salt)
        };
        write!(f, "{} {} {}", self.algorithm, self.iterations, salt)
    }
}

/// Compute the binary NSEC3 hash of `name`.
///
/// ```text
/// IH(salt, x, 0) = H(x || salt)
/// IH(salt, x, k) = H(IH(salt, x, k-1) || salt), if k > 0
/// ```
///
/// where `x` is the lower-cased canonical wire form of the name.
pub fn nsec3_hash(name: &DomainName, algorithm: u8, iterations: u16, salt: &[u8]) -> Result<Vec<u8>> {
    match Nsec3HashAlgorithm::try_from(algorithm)? {
        Nsec3HashAlgorithm::Sha1 => {
            let wire = name.to_canonical_wire()?;
            trace!("NSEC3 input for {}: {:02x?}, {} extra iterations", name, wire, iterations);

            let mut digest = sha1_with_salt(&wire, salt);
            for _ in 0..iterations {
                digest = sha1_with_salt(&digest, salt);
            }
            Ok(digest)
        }
    }
}

fn sha1_with_salt(data: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut ctx = Context::new(&SHA1_FOR_LEGACY_USE_ONLY);
    ctx.update(data);
    ctx.update(salt);
    ctx.finish().as_ref().to_vec()
}

/// Base32 with the Extended Hex alphabet, upper case, no padding (RFC 4648 section 7).
pub fn encode_base32hex(digest: &[u8]) -> String {
    base32::encode(base32::Alphabet::Rfc4648Hex { padding: false }, digest)
}
