//! Integration connection lifecycle as observed from the client side.

pub mod backend;
pub mod record;
pub mod state;

pub use backend::{ConnectionBackend, HttpBackend};
pub use record::{IntegrationConnection, ProviderStatus, StatusSnapshot};
pub use state::{ConnectAttempt, ConnectionState};
