//! Client ids and redirect URI, validated once at startup.

use indexmap::IndexMap;

use super::{authorize, state};
use crate::error::{ConfigError, OAuthError};
use crate::providers::ProviderId;
use crate::storage::Config;

/// A ready-to-navigate authorization URL plus the state it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub provider: ProviderId,
    pub url: String,
    pub state: String,
}

/// OAuth application settings for every provider.
///
/// Constructing one guarantees that every connectable provider has a
/// client id, so connect actions never discover a missing id per click.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    redirect_uri: String,
    client_ids: IndexMap<ProviderId, String>,
}

impl OAuthSettings {
    /// Validate `config` and extract the OAuth settings.
    ///
    /// # Errors
    ///
    /// `MissingClientId` for the first connectable provider without a
    /// client id; `InvalidValue` if the redirect URI is not an absolute URL.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        url::Url::parse(&config.oauth.redirect_uri).map_err(|e| ConfigError::InvalidValue {
            key: "oauth.redirect_uri".to_string(),
            message: e.to_string(),
        })?;

        let mut client_ids = IndexMap::new();
        for provider in ProviderId::ALL {
            match config.client_id(provider) {
                Some(id) => {
                    client_ids.insert(provider, id.to_string());
                }
                None if provider.provider().is_connectable() => {
                    return Err(ConfigError::MissingClientId { provider });
                }
                None => {
                    tracing::debug!(%provider, "no client id for provider that is not connectable yet");
                }
            }
        }

        Ok(Self {
            redirect_uri: config.oauth.redirect_uri.clone(),
            client_ids,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn client_id(&self, provider: ProviderId) -> Option<&str> {
        self.client_ids.get(&provider).map(String::as_str)
    }

    /// Whether a connect action can be offered for `provider`.
    pub fn can_connect(&self, provider: ProviderId) -> bool {
        provider.provider().is_connectable() && self.client_ids.contains_key(&provider)
    }

    /// Build the authorization URL for `provider` with a caller-supplied state.
    pub fn authorization_url(&self, provider: ProviderId, state: &str) -> Result<String, OAuthError> {
        if !self.can_connect(provider) {
            return Err(OAuthError::NotConnectable { provider });
        }
        let client_id = self
            .client_id(provider)
            .ok_or(OAuthError::NotConnectable { provider })?;
        Ok(authorize::build_auth_url(
            provider,
            client_id,
            provider.provider().scopes,
            state,
            &self.redirect_uri,
        ))
    }

    /// Start a fresh attempt: new random state, new URL.
    pub fn authorization_request(&self, provider: ProviderId) -> Result<AuthorizationRequest, OAuthError> {
        let state = state::generate_state()?;
        let url = self.authorization_url(provider, &state)?;
        Ok(AuthorizationRequest { provider, url, state })
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> OAuthSettings {
    let mut config = Config::default();
    for provider in ProviderId::ALL {
        config
            .oauth
            .client_ids
            .insert(provider.as_str().to_string(), format!("{provider}-client"));
    }
    OAuthSettings::from_config(&config).expect("all client ids present")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_client_id_fails_fast() {
        let mut config = Config::default();
        config.oauth.client_ids.insert("github".into(), "gh".into());
        let err = OAuthSettings::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingClientId { provider: ProviderId::Gitlab }
        ));
    }

    #[test]
    fn invalid_redirect_uri_is_rejected() {
        let mut config = Config::default();
        config.oauth.redirect_uri = "not a url".into();
        let err = OAuthSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "oauth.redirect_uri"));
    }

    #[test]
    fn every_provider_has_a_client_id() {
        let settings = test_settings();
        for provider in ProviderId::ALL {
            assert_eq!(
                settings.client_id(provider),
                Some(format!("{provider}-client").as_str())
            );
            assert!(settings.can_connect(provider));
        }
    }

    #[test]
    fn authorization_requests_use_fresh_state() {
        let settings = test_settings();
        let first = settings.authorization_request(ProviderId::Github).unwrap();
        let second = settings.authorization_request(ProviderId::Github).unwrap();
        assert_ne!(first.state, second.state);
        assert!(first.url.contains(&format!("state={}", first.state)));
        assert!(first.url.contains("client_id=github-client"));
        assert!(second.url.starts_with("https://github.com/login/oauth/authorize?"));
    }

    #[test]
    fn authorization_url_uses_configured_redirect() {
        let settings = test_settings();
        let url = settings.authorization_url(ProviderId::Gitlab, "abc").unwrap();
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth-callback"));
        assert!(url.contains("state=abc"));
    }
}
