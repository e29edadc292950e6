//! Core error types for bassist-core.
//!
//! This module defines the error hierarchy using thiserror. Configuration
//! errors are fatal at startup; backend and connection errors are scoped to
//! a single provider and never destroy previously known state.

use std::path::PathBuf;
use thiserror::Error;

use crate::providers::ProviderId;

/// Core error type for bassist-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Provider lookup errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Backend HTTP errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Connection lifecycle errors
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No client id configured for a connectable provider
    #[error("OAuth client id not configured for {provider} (set {})", .provider.client_id_env())]
    MissingClientId { provider: ProviderId },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Unknown configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Provider lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Id outside the closed set of supported providers
    #[error("Unknown integration provider: '{0}'")]
    NotFound(String),
}

/// OAuth-specific errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Callback `state` does not match the one minted for the attempt
    #[error("OAuth state mismatch for {provider}")]
    StateMismatch { provider: ProviderId },

    /// OS randomness unavailable
    #[error("Failed to generate OAuth state: {0}")]
    StateGeneration(String),

    /// Header value contains bytes HTTP does not allow
    #[error("Invalid authorization header for {provider}: {message}")]
    InvalidHeader { provider: ProviderId, message: String },

    /// Provider is registered but not yet fully supported
    #[error("{provider} connections are not available yet")]
    NotConnectable { provider: ProviderId },
}

/// Errors talking to the integrations backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be interpreted
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// Base URL could not be joined with an endpoint path
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Connection lifecycle errors, scoped to one provider.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Another connect/disconnect for the same provider is in flight
    #[error("A connect or disconnect for {provider} is already in progress")]
    Busy { provider: ProviderId },

    /// Backend call failed; prior state was kept
    #[error("{provider}: {source}")]
    Backend {
        provider: ProviderId,
        #[source]
        source: BackendError,
    },

    /// Status refresh failed; prior state was kept
    #[error("Failed to refresh integration status: {0}")]
    Refresh(#[source] BackendError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
