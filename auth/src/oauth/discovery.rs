//! OpenID provider discovery.

use log::*;
use serde::Deserialize;

use crate::error::{discovery_error, DiscoveryErrorKind, Error};

const PKCE_METHOD_S256: &str = "S256";

/// The subset of the provider's discovery document this application relies on.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub code_challenge_methods_supported: Option<Vec<String>>,
    #[serde(default)]
    pub token_endpoint_auth_methods_supported: Option<Vec<String>>,
}

impl ProviderMetadata {
    /// Fetch and validate the discovery document at `metadata_url`.
    pub async fn discover(http_client: &reqwest::Client, metadata_url: &str) -> Result<Self, Error> {
        debug!("Fetching provider metadata from {metadata_url}");

        let metadata: ProviderMetadata = http_client
            .get(metadata_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| {
                warn!("Provider metadata at {metadata_url} is not a valid discovery document: {e}");
                discovery_error(DiscoveryErrorKind::InvalidMetadata, &e.to_string())
            })?;

        metadata.validate()?;
        info!("Discovered OAuth provider {}", metadata.issuer);
        Ok(metadata)
    }

    /// Providers that do not advertise challenge methods are assumed to accept S256.
    pub fn supports_s256(&self) -> bool {
        self.code_challenge_methods_supported
            .as_ref()
            .map_or(true, |methods| methods.iter().any(|m| m == PKCE_METHOD_S256))
    }

    /// True when the token endpoint only accepts client credentials in the request body.
    pub fn requires_client_secret_post(&self) -> bool {
        self.token_endpoint_auth_methods_supported
            .as_ref()
            .is_some_and(|methods| {
                methods.iter().any(|m| m == "client_secret_post")
                    && !methods.iter().any(|m| m == "client_secret_basic")
            })
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.supports_s256() {
            error!("Provider {} does not support S256 PKCE challenges", self.issuer);
            return Err(discovery_error(
                DiscoveryErrorKind::UnsupportedPkceMethod,
                "provider does not support the S256 code challenge method",
            ));
        }
        Ok(())
    }
}
