//! Authorization headers for calling a connected provider's API.

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::OAuthError;
use crate::providers::ProviderId;

pub const AUTHORIZATION: &str = "Authorization";

/// Header set to attach to API requests made on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    provider: ProviderId,
    headers: IndexMap<&'static str, String>,
}

impl AuthHeaders {
    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Convert to a `reqwest` header map.
    ///
    /// Fails only when the token contains bytes that are not valid in an
    /// HTTP header value.
    pub fn to_header_map(&self) -> Result<HeaderMap, OAuthError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let mut value =
                HeaderValue::from_str(value).map_err(|e| OAuthError::InvalidHeader {
                    provider: self.provider,
                    message: e.to_string(),
                })?;
            value.set_sensitive(true);
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                OAuthError::InvalidHeader {
                    provider: self.provider,
                    message: e.to_string(),
                }
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// Build the auth header set for `provider`.
///
/// GitHub uses its classic `token <t>` scheme; every other provider takes a
/// Bearer token. The token itself is not validated here.
pub fn build_auth_header(provider: ProviderId, token: &str) -> AuthHeaders {
    let value = match provider {
        ProviderId::Github => format!("token {token}"),
        ProviderId::Gitlab | ProviderId::Bitbucket | ProviderId::Azure | ProviderId::Jira => {
            format!("Bearer {token}")
        }
    };

    let mut headers = IndexMap::with_capacity(1);
    headers.insert(AUTHORIZATION, value);
    AuthHeaders { provider, headers }
}
