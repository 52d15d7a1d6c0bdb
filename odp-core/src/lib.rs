// SPDX-License-Identifier: MIT
//
// OData Destination Proxy
// https://github.com/yourusername/odata-destination-proxy

//! Proxy Core Library
//!
//! This crate provides the building blocks for the OData destination proxy:
//! resolving a named destination through an OAuth-protected configuration
//! service and relaying OData entity sets from the resolved backend.
//!
//! # Architecture
//!
//! The library is organized into modules representing core concerns:
//! - `config`: Service-binding credentials and gateway settings
//! - `auth`: OAuth client-credentials token exchange
//! - `destination`: Destination-configuration lookup
//! - `fetcher`: Entity fetch chain (token -> destination -> data)
//! - `entities`: The fixed entity-set allow-list
//! - `error`: Unified error types
//!
//! Every fetch performs a fresh token exchange and destination lookup;
//! nothing is cached between requests.

pub mod auth;
pub mod config;
pub mod destination;
pub mod entities;
pub mod error;
pub mod fetcher;

pub use entities::ENTITY_SETS;
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP listen port when `PORT` is unset
pub const DEFAULT_PORT: u16 = 5000;

/// Default destination name when `DESTINATION_NAME` is unset
pub const DEFAULT_DESTINATION: &str = "Products";
