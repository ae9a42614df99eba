//! Domain name normalization for NSEC3 hashing and zone lookup.

use std::fmt;

use crate::dns::common::label_from_text;
use crate::error::{Nsec3Error, Result};

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

/// A fully qualified domain name, held as its non-root labels in order.
///
/// Case is preserved; comparison for hashing happens on the lower-cased wire
/// form produced by [`DomainName::to_canonical_wire`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DomainName {
    labels: Vec<String>,
}

impl DomainName {
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalize user input into a fully qualified name.
    ///
    /// Runs of dots collapse into one separator, leading dots are dropped
    /// and the result always ends at the root. Never fails; length limits
    /// are enforced when the name is encoded.
    pub fn canonicalize(raw: &str) -> Self {
        let labels = raw
            .split('.')
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();
        Self { labels }
    }

    /// The name with its first label removed, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.labels.split_first()?;
        Some(Self {
            labels: rest.to_vec(),
        })
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in the codec's layout, terminated by the empty root label.
    pub fn to_wire_labels(&self) -> Vec<String> {
        let mut labels = self.labels.clone();
        labels.push(String::new());
        labels
    }

    /// Length-prefixed, ASCII lower-cased, root-terminated encoding (RFC 4034 section 6.2).
    pub fn to_canonical_wire(&self) -> Result<Vec<u8>> {
        let mut wire = Vec::with_capacity(self.wire_len());
        for label in &self.labels {
            let raw = label_from_text(label)
                .map_err(|_| Nsec3Error::InvalidName(format!("bad escape in label '{}'", label)))?;
            if raw.len() > MAX_LABEL_LEN {
                return Err(Nsec3Error::InvalidName(format!(
                    "label '{}' is {} octets, limit is {}",
                    label,
                    raw.len(),
                    MAX_LABEL_LEN
                )));
            }
            wire.push(raw.len() as u8);
            wire.extend(raw.iter().map(u8::to_ascii_lowercase));
        }
        wire.push(0);

        if wire.len() > MAX_NAME_LEN {
            return Err(Nsec3Error::InvalidName(format!(
                "{} is {} octets on the wire, limit is {}",
                self,
                wire.len(),
                MAX_NAME_LEN
            )));
        }
        Ok(wire)
    }

    fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in &self.labels {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}
