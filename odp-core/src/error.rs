// SPDX-License-Identifier: MIT
//
// OData Destination Proxy
// https://github.com/yourusername/odata-destination-proxy

//! Error types for the proxy
//!
//! Provides a unified error taxonomy using `thiserror`. Upstream status and
//! body are carried in the error for server-side logging; they must never be
//! echoed back to HTTP clients.

pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for proxy operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration validation failed (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// OAuth token exchange failed
    #[error("Token exchange failed: {detail}")]
    UpstreamAuth {
        status: Option<u16>,
        detail: String,
    },

    /// Destination lookup failed or returned no usable URL
    #[error("Destination lookup failed: {detail}")]
    UpstreamResolution {
        status: Option<u16>,
        detail: String,
    },

    /// Final data fetch failed
    #[error("Data fetch failed: {detail}")]
    UpstreamData {
        status: Option<u16>,
        detail: String,
    },

    /// Requested entity set is not in the allow-list
    #[error("Unknown entity set: {0}")]
    InvalidEntity(String),
}

impl Error {
    /// Upstream HTTP status attached to the error, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::UpstreamAuth { status, .. }
            | Error::UpstreamResolution { status, .. }
            | Error::UpstreamData { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if the error is the caller's fault (maps to a 4xx response)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidEntity(_))
    }
}
