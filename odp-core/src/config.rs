//! Configuration management for the proxy
//!
//! Service credentials come from the platform service binding (`VCAP_SERVICES`)
//! or, outside a bound environment, from `DESTINATION_SERVICE_*` environment
//! variables. Gateway settings (`PORT`, `DESTINATION_NAME`) come from plain
//! environment variables.

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Credentials for the OAuth-protected destination-configuration service
///
/// Loaded once at process start and passed explicitly into the components
/// that need it; nothing reads credentials from ambient state afterwards.
#[derive(Debug, Clone)]
pub struct ServiceCredentials {
    /// OAuth token service base URL (token endpoint is `{url}/oauth/token`)
    pub token_endpoint: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Destination-configuration API base URL
    pub config_endpoint: String,
}

/// Binding credentials as they appear in `VCAP_SERVICES` and in the
/// `DESTINATION_SERVICE_*` fallback variables
#[derive(Debug, Deserialize)]
struct BindingCredentials {
    url: String,
    clientid: String,
    clientsecret: String,
    uri: String,
}

impl From<BindingCredentials> for ServiceCredentials {
    fn from(raw: BindingCredentials) -> Self {
        Self {
            token_endpoint: raw.url,
            client_id: raw.clientid,
            client_secret: raw.clientsecret,
            config_endpoint: raw.uri,
        }
    }
}

impl ServiceCredentials {
    /// Load credentials from the environment
    ///
    /// `VCAP_SERVICES` takes precedence; the first bound service instance
    /// tagged (or labeled) `destination` wins. Without a binding, falls back
    /// to `DESTINATION_SERVICE_URL` / `_CLIENTID` / `_CLIENTSECRET` / `_URI`.
    pub fn from_env() -> Result<Self> {
        let creds: Self = if let Ok(vcap) = std::env::var("VCAP_SERVICES") {
            Self::from_vcap_services(&vcap)?
        } else {
            let raw: BindingCredentials = envy::prefixed("DESTINATION_SERVICE_")
                .from_env()
                .map_err(|e| {
                    Error::Config(format!(
                        "No destination service binding: VCAP_SERVICES is unset and \
                         DESTINATION_SERVICE_* variables are incomplete: {}",
                        e
                    ))
                })?;
            raw.into()
        };

        creds.validate()?;
        Ok(creds)
    }

    /// Extract the destination-service credentials from a `VCAP_SERVICES` document
    fn from_vcap_services(vcap: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(vcap)
            .map_err(|e| Error::Config(format!("Failed to parse VCAP_SERVICES: {}", e)))?;

        let services = doc.as_object().ok_or_else(|| {
            Error::Config("VCAP_SERVICES must be a JSON object".to_string())
        })?;

        for (label, instances) in services {
            let Some(instances) = instances.as_array() else {
                continue;
            };
            for instance in instances {
                let tagged = instance
                    .get("tags")
                    .and_then(Value::as_array)
                    .map(|tags| tags.iter().any(|t| t.as_str() == Some("destination")))
                    .unwrap_or(false);

                if !tagged && label != "destination" {
                    continue;
                }

                let raw: BindingCredentials = instance
                    .get("credentials")
                    .cloned()
                    .ok_or_else(|| {
                        Error::Config("Destination binding has no credentials".to_string())
                    })
                    .and_then(|c| {
                        serde_json::from_value(c).map_err(|e| {
                            Error::Config(format!(
                                "Malformed destination service credentials: {}",
                                e
                            ))
                        })
                    })?;
                return Ok(raw.into());
            }
        }

        Err(Error::Config(
            "No service tagged 'destination' found in VCAP_SERVICES".to_string(),
        ))
    }

    /// Validate credentials
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(Error::Config(
                "Destination service clientid/clientsecret must not be empty".to_string(),
            ));
        }

        Url::parse(&self.token_endpoint)
            .map_err(|e| Error::Config(format!("Invalid token endpoint URL: {}", e)))?;
        Url::parse(&self.config_endpoint)
            .map_err(|e| Error::Config(format!("Invalid config endpoint URL: {}", e)))?;

        Ok(())
    }
}

/// Gateway runtime settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Name of the destination to resolve per request
    #[serde(default = "default_destination_name")]
    pub destination_name: String,
}

impl GatewayConfig {
    /// Load settings from `PORT` and `DESTINATION_NAME`
    pub fn from_env() -> Result<Self> {
        envy::from_env()
            .map_err(|e| Error::Config(format!("Failed to parse environment variables: {}", e)))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            destination_name: default_destination_name(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    crate::DEFAULT_PORT
}

fn default_destination_name() -> String {
    crate::DEFAULT_DESTINATION.to_string()
}
