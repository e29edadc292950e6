//! OAuth plumbing shared by every integration provider.
//!
//! - [`authorize`]: authorization URL per provider
//! - [`header`]: API auth headers per provider
//! - [`result`]: classification of the `/oauth-result` redirect
//! - [`state`]: CSRF state tokens
//! - [`settings`]: validated client ids + redirect URI

pub mod authorize;
pub mod header;
pub mod result;
pub mod settings;
pub mod state;

pub use authorize::build_auth_url;
pub use header::{build_auth_header, AuthHeaders};
pub use result::{classify_callback, classify_query, Affordance, OAuthResultOutcome, OAuthStatus};
pub use settings::{AuthorizationRequest, OAuthSettings};
