//! Integrations backend: status, disconnect and connection records.

use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use url::Url;

use super::record::{parse_status_payload, IntegrationConnection, StatusSnapshot};
use crate::error::BackendError;
use crate::providers::ProviderId;
use crate::storage::BackendConfig;

/// Server-side owner of connection records.
///
/// [`ConnectionState`](super::ConnectionState) is generic over this so
/// tests can substitute an in-memory fake.
pub trait ConnectionBackend: Send + Sync {
    /// Connection status for every provider.
    fn fetch_status(&self) -> impl Future<Output = Result<StatusSnapshot, BackendError>> + Send;

    /// Delete the stored connection for `provider`.
    fn disconnect(
        &self,
        provider: ProviderId,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Full connection record, `None` when not connected.
    fn fetch_connection(
        &self,
        provider: ProviderId,
    ) -> impl Future<Output = Result<Option<IntegrationConnection>, BackendError>> + Send;
}

/// HTTP client for the Bassist integrations API.
pub struct HttpBackend {
    base_url: Url,
    session_token: Option<String>,
    http_client: Client,
}

impl HttpBackend {
    /// Create a client rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: Url::parse(&base)?,
            session_token: None,
            http_client,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Authenticate backend calls as the current user.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn error_from(resp: reqwest::Response) -> BackendError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        BackendError::Status { status, body }
    }
}

impl ConnectionBackend for HttpBackend {
    async fn fetch_status(&self) -> Result<StatusSnapshot, BackendError> {
        let url = self.endpoint("integrations/status")?;
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(parse_status_payload(&body))
    }

    async fn disconnect(&self, provider: ProviderId) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("integrations/{provider}"))?;
        let resp = self.request(reqwest::Method::DELETE, url).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn fetch_connection(
        &self,
        provider: ProviderId,
    ) -> Result<Option<IntegrationConnection>, BackendError> {
        let url = self.endpoint(&format!("integrations/{provider}/connection"))?;
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }

        let Ok(body) = resp.json::<serde_json::Value>().await else {
            tracing::warn!(%provider, "connection record body is not JSON");
            return Ok(None);
        };
        Ok(IntegrationConnection::from_json(&body).filter(|conn| conn.provider == provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(server: &mockito::Server) -> HttpBackend {
        HttpBackend::new(&format!("{}/api", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_status_parses_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/integrations/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"github":{"connected":true,"name":"GitHub"},"jira":{"connected":false,"name":"Jira"}}"#)
            .create_async()
            .await;

        let snapshot = backend(&server).fetch_status().await.unwrap();
        assert!(snapshot[&ProviderId::Github].connected);
        assert!(!snapshot[&ProviderId::Jira].connected);
        assert_eq!(snapshot.len(), 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn session_token_is_sent_as_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/integrations/status")
            .match_header("authorization", "Bearer sess-1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        backend(&server)
            .with_session_token("sess-1")
            .fetch_status()
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_status_surfaces_http_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/integrations/status")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = backend(&server).fetch_status().await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Status { status: 503, ref body } if body == "maintenance"
        ));
    }

    #[tokio::test]
    async fn fetch_status_rejects_non_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/integrations/status")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let err = backend(&server).fetch_status().await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn disconnect_issues_delete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/integrations/gitlab")
            .with_status(204)
            .create_async()
            .await;

        backend(&server).disconnect(ProviderId::Gitlab).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn disconnect_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/integrations/jira")
            .with_status(500)
            .create_async()
            .await;

        let err = backend(&server).disconnect(ProviderId::Jira).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn fetch_connection_handles_missing_and_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/integrations/github/connection")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/api/integrations/gitlab/connection")
            .with_status(200)
            .with_body(r#"{"provider":"gitlab"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/integrations/azure/connection")
            .with_status(200)
            .with_body(
                r#"{"provider":"azure","access_token":"az","expires_at":1900000000,"scopes":["vso.work_full"],"connected_at":"2026-02-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let backend = backend(&server);
        assert!(backend.fetch_connection(ProviderId::Github).await.unwrap().is_none());
        assert!(backend.fetch_connection(ProviderId::Gitlab).await.unwrap().is_none());

        let azure = backend
            .fetch_connection(ProviderId::Azure)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(azure.expires_at, Some(1_900_000_000));
        assert_eq!(azure.missing_scopes(), vec!["vso.project"]);
    }

    #[tokio::test]
    async fn fetch_connection_rejects_mismatched_provider() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/integrations/jira/connection")
            .with_status(200)
            .with_body(
                r#"{"provider":"github","access_token":"x","connected_at":"2026-02-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        assert!(backend(&server)
            .fetch_connection(ProviderId::Jira)
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let backend = HttpBackend::new("https://api.bassist.dev/v1", Duration::from_secs(1)).unwrap();
        assert_eq!(
            backend.endpoint("integrations/status").unwrap().as_str(),
            "https://api.bassist.dev/v1/integrations/status"
        );
    }
}
