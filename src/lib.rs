pub mod config;
pub mod dns;
pub mod error;
pub mod name;
pub mod nameserver;
pub mod nsec3;
pub mod params;
pub mod transaction;
pub mod transport;

use tracing::{debug, info};

pub use config::Nsec3HashConfig;
pub use error::{ConfigError, Nsec3Error, Result};
pub use name::DomainName;
pub use nsec3::{HashParameters, nsec3_hash};
pub use transaction::DnssecClient;

use nameserver::{ResolvConf, resolve_nameserver};

/// What to hash, and optionally with what and where to ask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashRequest {
    pub domain: String,
    /// Explicit parameters; when absent they are looked up in the parent zone
    pub parameters: Option<HashParameters>,
    /// Nameserver to ask; falls back to the first resolv.conf entry
    pub nameserver: Option<String>,
}

/// Compute the display form of the NSEC3 hash for `request.domain`.
pub async fn hash_name(request: &HashRequest, config: &Nsec3HashConfig) -> Result<String> {
    let domain = DomainName::canonicalize(&request.domain);

    let parameters = match &request.parameters {
        Some(parameters) => parameters.clone(),
        None => {
            let zone = domain.parent().ok_or_else(|| {
                Nsec3Error::InvalidName("the root has no parent zone to query".to_string())
            })?;

            let nameserver = match &request.nameserver {
                Some(nameserver) => nameserver.clone(),
                None => {
                    let conf = ResolvConf::from_file(&config.resolv_conf)?;
                    conf.first_nameserver()?.to_string()
                }
            };
            let server = resolve_nameserver(&nameserver, config.port).await?;
            info!("Looking up NSEC3PARAM for {} at {}", zone, server);

            let client = DnssecClient::new(config.clone());
            params::resolve_parameters(&client, server, &zone).await?
        }
    };

    debug!("Hashing {} with {}", domain, parameters);
    parameters.hash_name(&domain)
}
