//! Entity fetch chain
//!
//! Runs the full per-request pipeline: token exchange, destination lookup,
//! then an unauthenticated GET of the entity set against the resolved base
//! URL. The OData service's JSON body is returned verbatim.

use crate::auth::TokenAcquirer;
use crate::config::ServiceCredentials;
use crate::destination::DestinationResolver;
use crate::{Error, Result};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetches OData entity sets through the destination service
#[derive(Debug, Clone)]
pub struct EntityFetcher {
    client: Client,
    acquirer: TokenAcquirer,
    resolver: DestinationResolver,
    destination_name: String,
}

impl EntityFetcher {
    /// Create a fetcher for the given credentials and destination name
    pub fn new(credentials: ServiceCredentials, destination_name: String) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let acquirer = TokenAcquirer::new(client.clone(), credentials.clone());
        let resolver = DestinationResolver::new(client.clone(), &credentials);

        Ok(Self {
            client,
            acquirer,
            resolver,
            destination_name,
        })
    }

    /// Fetch one entity set and return its JSON body unmodified
    ///
    /// Performs a fresh token exchange and destination lookup on every call;
    /// any failure in those steps propagates as the corresponding upstream
    /// error.
    #[instrument(skip(self))]
    pub async fn fetch_entity(&self, entity: &str) -> Result<Value> {
        let token = self.acquirer.fetch_token().await?;
        let destination = self.resolver.resolve(&token, &self.destination_name).await?;
        let url = entity_url(&destination.base_url, entity);

        debug!("Fetching entity set from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamData {
                status: None,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamData {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        let body: Value = response.json().await.map_err(|e| Error::UpstreamData {
            status: None,
            detail: format!("Failed to parse OData response: {}", e),
        })?;

        Ok(body)
    }

    /// Destination name this fetcher resolves
    pub fn destination_name(&self) -> &str {
        &self.destination_name
    }
}

/// Compose the final entity URL
///
/// The resolved base URL may carry a trailing slash; it is stripped so the
/// composed URL never contains `//{entity}`.
fn entity_url(base_url: &str, entity: &str) -> String {
    format!("{}/{}?$format=json", base_url.trim_end_matches('/'), entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_url_strips_trailing_slash() {
        assert_eq!(
            entity_url("https://services.odata.org/northwind/northwind.svc/", "Products"),
            "https://services.odata.org/northwind/northwind.svc/Products?$format=json"
        );
    }

    #[test]
    fn test_entity_url_without_trailing_slash() {
        assert_eq!(
            entity_url("https://services.odata.org/northwind/northwind.svc", "Orders"),
            "https://services.odata.org/northwind/northwind.svc/Orders?$format=json"
        );
    }

    #[test]
    fn test_entity_url_never_doubles_separator() {
        let url = entity_url("https://x/", "Products");
        assert!(!url.contains("//Products"));
        assert_eq!(url, "https://x/Products?$format=json");
    }
}
