//! # Bassist Core Library
//!
//! Client-side core of the Bassist integrations feature: connecting a
//! user's issue tracker / VCS accounts (GitHub, GitLab, Bitbucket, Azure
//! DevOps, Jira) over OAuth and tracking which of them are connected.
//!
//! ## Architecture
//!
//! - **Providers**: the closed, ordered registry of supported integrations
//! - **OAuth**: authorization URLs, API auth headers, and classification of
//!   the `/oauth-result` redirect into a closed outcome type
//! - **Connection**: injectable per-provider connection state mirrored from
//!   the integrations backend
//! - **Storage**: TOML configuration with environment overrides
//!
//! ## Key Components
//!
//! - [`ProviderId`]: Provider identity, exhaustively matched everywhere
//! - [`OAuthSettings`]: Client ids validated at startup
//! - [`OAuthResultOutcome`]: Classified callback with its affordances
//! - [`ConnectionState`]: Connection status container over a [`ConnectionBackend`]

pub mod connection;
pub mod error;
pub mod oauth;
pub mod providers;
pub mod storage;

pub use connection::{
    ConnectAttempt, ConnectionBackend, ConnectionState, HttpBackend, IntegrationConnection,
    ProviderStatus, StatusSnapshot,
};
pub use error::{BackendError, ConfigError, ConnectionError, CoreError, OAuthError, ProviderError};
pub use oauth::{
    build_auth_header, build_auth_url, classify_callback, classify_query, Affordance,
    AuthHeaders, AuthorizationRequest, OAuthResultOutcome, OAuthSettings, OAuthStatus,
};
pub use providers::{get_provider, list_providers, ImplementationStatus, Provider, ProviderId};
pub use storage::Config;
