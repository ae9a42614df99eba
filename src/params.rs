use std::net::SocketAddr;

use tracing::{debug, warn};

use crate::dns::{enums::DNSResourceType, resource::DNSResource};
use crate::error::{Nsec3Error, Result};
use crate::name::DomainName;
use crate::nsec3::HashParameters;
use crate::transaction::DnssecClient;

/// Look up the NSEC3 hashing parameters `zone` publishes at its apex.
pub async fn resolve_parameters(
    client: &DnssecClient,
    server: SocketAddr,
    zone: &DomainName,
) -> Result<HashParameters> {
    let answers = client
        .exchange(server, zone, DNSResourceType::NSEC3PARAM)
        .await?;
    extract_parameters(&answers, zone)
}

/// Pick the NSEC3PARAM out of an answer section.
///
/// Other record types (the covering RRSIG, say) are skipped. When a zone
/// publishes several NSEC3PARAM records the last one wins.
pub fn extract_parameters(answers: &[DNSResource], zone: &DomainName) -> Result<HashParameters> {
    let mut found = Vec::new();
    for record in answers {
        if let Some(data) = record.as_nsec3param() {
            found.push(data?);
        }
    }

    if found.len() > 1 {
        warn!(
            "{} NSEC3PARAM records for '{}', using the last one",
            found.len(),
            zone
        );
    }

    let data = found
        .pop()
        .ok_or_else(|| Nsec3Error::NoNsec3Param(zone.to_string()))?;
    let params = HashParameters::from(data);
    debug!("NSEC3PARAM for {}: {}", zone, params);
    Ok(params)
}
