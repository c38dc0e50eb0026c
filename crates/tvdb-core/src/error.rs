//! Error types for the TVDB episode provider
//!
//! This module defines all error types used throughout the library.
//! TvdbError implements Serialize so hosts can forward it as JSON.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for TVDB provider operations
#[derive(Error, Debug)]
pub enum TvdbError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse a catalog response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// The API rejected our credentials (HTTP 401)
    #[error("Unauthorized - API key rejected")]
    Unauthorized,

    /// The catalog answered with a server-side failure
    #[error("Server fault {status}: {message}")]
    ServerFault { status: u16, message: String },

    /// Client is missing required configuration
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// An identifier could not be used as a catalog id
    #[error("Invalid TVDB ID: {0}")]
    InvalidId(String),

    /// A present numbering field does not hold an integer
    #[error("Invalid number in {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Serialize TvdbError as its display string
impl Serialize for TvdbError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for TVDB provider operations
pub type Result<T> = std::result::Result<T, TvdbError>;
