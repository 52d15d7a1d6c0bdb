//! Destination-configuration lookup
//!
//! Resolves a named destination to its connection properties via the
//! destination-configuration API, authenticated with a bearer token. The
//! proxy only consumes the `URL` property; everything else is carried along
//! untouched.

use crate::config::ServiceCredentials;
use crate::{Error, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Resolved destination configuration
#[derive(Debug, Clone)]
pub struct DestinationConfig {
    /// Base URL of the destination, as configured (may carry a trailing slash)
    pub base_url: String,
    /// Remaining destination properties, passed through unparsed
    pub properties: Value,
}

/// Destination-configuration API client
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    client: Client,
    config_endpoint: String,
}

impl DestinationResolver {
    pub fn new(client: Client, credentials: &ServiceCredentials) -> Self {
        Self {
            client,
            config_endpoint: credentials.config_endpoint.clone(),
        }
    }

    /// Look up a destination by name
    ///
    /// GETs `/destination-configuration/v1/destinations/{name}` with the
    /// given bearer token and extracts `destinationConfiguration.URL`.
    pub async fn resolve(&self, token: &str, name: &str) -> Result<DestinationConfig> {
        let url = format!(
            "{}/destination-configuration/v1/destinations/{}",
            self.config_endpoint, name
        );

        debug!("Resolving destination '{}' via {}", name, url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| Error::UpstreamResolution {
                status: None,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamResolution {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        let body: Value = response.json().await.map_err(|e| Error::UpstreamResolution {
            status: None,
            detail: format!("Failed to parse destination response: {}", e),
        })?;

        let configuration = body
            .get("destinationConfiguration")
            .cloned()
            .ok_or_else(|| Error::UpstreamResolution {
                status: None,
                detail: format!("Destination '{}' has no destinationConfiguration", name),
            })?;

        let base_url = configuration
            .get("URL")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::UpstreamResolution {
                status: None,
                detail: format!("Destination '{}' has no URL property", name),
            })?
            .to_string();

        debug!("Destination '{}' resolved to {}", name, base_url);

        Ok(DestinationConfig {
            base_url,
            properties: configuration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_for(config_endpoint: String) -> DestinationResolver {
        DestinationResolver::new(
            Client::new(),
            &ServiceCredentials {
                token_endpoint: "https://auth.example.com".to_string(),
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                config_endpoint,
            },
        )
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/destination-configuration/v1/destinations/Products")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "owner": {"SubaccountId": "abc"},
                    "destinationConfiguration": {
                        "Name": "Products",
                        "Type": "HTTP",
                        "URL": "https://services.odata.org/northwind/northwind.svc/",
                        "ProxyType": "Internet"
                    }
                }"#,
            )
            .create_async()
            .await;

        let resolver = resolver_for(server.url());
        let dest = resolver.resolve("tok", "Products").await.unwrap();
        assert_eq!(
            dest.base_url,
            "https://services.odata.org/northwind/northwind.svc/"
        );
        assert_eq!(dest.properties["ProxyType"], "Internet");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/destination-configuration/v1/destinations/Missing")
            .with_status(404)
            .with_body("Destination not found")
            .create_async()
            .await;

        let resolver = resolver_for(server.url());
        let err = resolver.resolve("tok", "Missing").await.unwrap_err();
        match err {
            Error::UpstreamResolution { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_url_property() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/destination-configuration/v1/destinations/NoUrl")
            .with_status(200)
            .with_body(r#"{"destinationConfiguration": {"Name": "NoUrl", "Type": "HTTP"}}"#)
            .create_async()
            .await;

        let resolver = resolver_for(server.url());
        let err = resolver.resolve("tok", "NoUrl").await.unwrap_err();
        match err {
            Error::UpstreamResolution { status, detail } => {
                assert_eq!(status, None);
                assert!(detail.contains("no URL property"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
