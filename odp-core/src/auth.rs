//! OAuth client-credentials token exchange
//!
//! Implements the client-credentials grant against the destination service's
//! token endpoint. Tokens are fetched fresh for every request chain and never
//! cached; the upstream sees one exchange per proxied request.

use crate::config::ServiceCredentials;
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Token response from the OAuth server
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client-credentials token acquirer
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    client: Client,
    credentials: ServiceCredentials,
}

impl TokenAcquirer {
    pub fn new(client: Client, credentials: ServiceCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Exchange client credentials for a bearer token
    ///
    /// POSTs `grant_type=client_credentials` with HTTP Basic auth to
    /// `{token_endpoint}/oauth/token` and returns the `access_token` field.
    pub async fn fetch_token(&self) -> Result<String> {
        let url = format!("{}/oauth/token", self.credentials.token_endpoint);
        let params = [("grant_type", "client_credentials")];

        debug!("Requesting access token from {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::UpstreamAuth {
                status: None,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamAuth {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| Error::UpstreamAuth {
            status: None,
            detail: format!("Failed to parse token response: {}", e),
        })?;

        debug!("Access token acquired");
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquirer_for(token_endpoint: String) -> TokenAcquirer {
        TokenAcquirer::new(
            Client::new(),
            ServiceCredentials {
                token_endpoint,
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                config_endpoint: "https://destination.example.com".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_fetch_token_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_header(
                "authorization",
                mockito::Matcher::Regex("^Basic ".to_string()),
            )
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".to_string(),
                "client_credentials".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"abc123","token_type":"bearer","expires_in":3600}"#)
            .create_async()
            .await;

        let acquirer = acquirer_for(server.url());
        let token = acquirer.fetch_token().await.unwrap();
        assert_eq!(token, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_token_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body(r#"{"error":"unauthorized"}"#)
            .create_async()
            .await;

        let acquirer = acquirer_for(server.url());
        let err = acquirer.fetch_token().await.unwrap_err();
        match err {
            Error::UpstreamAuth { status, detail } => {
                assert_eq!(status, Some(401));
                assert!(detail.contains("unauthorized"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_token_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let acquirer = acquirer_for(server.url());
        let err = acquirer.fetch_token().await.unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth { status: None, .. }));
    }
}
