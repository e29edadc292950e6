//! Connection records and status entries as reported by the backend.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::oauth::{build_auth_header, AuthHeaders};
use crate::providers::ProviderId;

/// Seconds before `expires_at` at which a token is already treated as expired.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// A user's persisted authorization for one provider.
///
/// Owned by the backend; the core only reads it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConnection {
    pub provider: ProviderId,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp; `None` means the token does not expire.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Granted scopes, possibly a subset of the requested ones.
    #[serde(default, deserialize_with = "deserialize_scopes")]
    pub scopes: Vec<String>,
    pub connected_at: DateTime<Utc>,
}

impl fmt::Debug for IntegrationConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationConnection")
            .field("provider", &self.provider)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

impl IntegrationConnection {
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(exp) => now > exp - EXPIRY_BUFFER_SECS,
            None => false,
        }
    }

    /// Check if the access token is expired (with 60s buffer).
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Registry scopes the user did not grant.
    pub fn missing_scopes(&self) -> Vec<&'static str> {
        self.provider
            .provider()
            .scopes
            .iter()
            .copied()
            .filter(|scope| !self.scopes.iter().any(|granted| granted == scope))
            .collect()
    }

    pub fn auth_header(&self) -> AuthHeaders {
        build_auth_header(self.provider, &self.access_token)
    }

    /// Parse a backend record. Malformed records and records without an
    /// access token read as "not connected".
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(conn) if !conn.access_token.trim().is_empty() => Some(conn),
            Ok(conn) => {
                tracing::warn!(provider = %conn.provider, "connection record has empty access token");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed connection record");
                None
            }
        }
    }
}

/// Accept either a list of scopes or a single delimited string.
fn deserialize_scopes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scopes {
        List(Vec<String>),
        Joined(String),
        Missing(()),
    }

    Ok(match Scopes::deserialize(deserializer)? {
        Scopes::List(list) => list,
        Scopes::Joined(joined) => joined
            .split([',', ' ', '+'])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Scopes::Missing(_) => Vec::new(),
    })
}

/// One provider's row in the status view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub connected: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    /// Set when an API call was rejected with 401/403; the user should
    /// reconnect.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl ProviderStatus {
    pub fn disconnected(provider: ProviderId) -> Self {
        Self {
            provider,
            connected: false,
            name: provider.provider().name.to_string(),
            connected_at: None,
            stale: false,
        }
    }
}

/// Status of every provider, in registry order.
pub type StatusSnapshot = IndexMap<ProviderId, ProviderStatus>;

/// Snapshot with every provider disconnected.
pub fn empty_snapshot() -> StatusSnapshot {
    ProviderId::ALL
        .into_iter()
        .map(|p| (p, ProviderStatus::disconnected(p)))
        .collect()
}

/// Interpret the backend status payload.
///
/// The payload is an object keyed by provider id. Unknown keys are
/// ignored; missing, non-object or malformed entries read as not
/// connected. The result always contains every provider in registry order.
pub fn parse_status_payload(payload: &serde_json::Value) -> StatusSnapshot {
    let mut snapshot = empty_snapshot();
    let Some(entries) = payload.as_object() else {
        tracing::warn!("status payload is not an object; treating all providers as disconnected");
        return snapshot;
    };

    for (key, entry) in entries {
        let Ok(provider) = key.parse::<ProviderId>() else {
            tracing::debug!(key = %key, "ignoring status for unknown provider");
            continue;
        };
        let Some(status) = snapshot.get_mut(&provider) else {
            continue;
        };

        status.connected = entry
            .get("connected")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if let Some(name) = entry
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            status.name = name.to_string();
        }
        status.connected_at = entry
            .get("connected_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .filter(|_| status.connected);
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(expires_at: Option<i64>) -> IntegrationConnection {
        IntegrationConnection {
            provider: ProviderId::Github,
            access_token: "gho_secret".into(),
            refresh_token: Some("ghr_secret".into()),
            expires_at,
            scopes: vec!["repo".into(), "read:user".into()],
            connected_at: Utc::now(),
        }
    }

    #[test]
    fn absent_expiry_never_expires() {
        assert!(!record(None).is_expired());
    }

    #[test]
    fn expiry_uses_buffer() {
        let now = 1_700_000_000;
        assert!(record(Some(now + 30)).is_expired_at(now));
        assert!(!record(Some(now + 120)).is_expired_at(now));
        assert!(record(Some(now - 1)).is_expired_at(now));
    }

    #[test]
    fn debug_redacts_tokens() {
        let text = format!("{:?}", record(None));
        assert!(!text.contains("gho_secret"));
        assert!(!text.contains("ghr_secret"));
        assert!(text.contains("<redacted>"));
    }

    #[test]
    fn missing_scopes_against_registry() {
        assert_eq!(record(None).missing_scopes(), vec!["user:email"]);
    }

    #[test]
    fn auth_header_follows_provider_scheme() {
        let header = record(None).auth_header();
        assert_eq!(header.get("Authorization"), Some("token gho_secret"));
    }

    #[test]
    fn parses_record_with_joined_scopes() {
        let conn = IntegrationConnection::from_json(&json!({
            "provider": "gitlab",
            "access_token": "glpat",
            "scopes": "api read_user",
            "connected_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(conn.provider, ProviderId::Gitlab);
        assert_eq!(conn.scopes, vec!["api", "read_user"]);
        assert_eq!(conn.refresh_token, None);
        assert!(!conn.can_refresh());
    }

    #[test]
    fn null_scopes_read_as_none_granted() {
        let conn = IntegrationConnection::from_json(&json!({
            "provider": "bitbucket",
            "access_token": "bb",
            "scopes": null,
            "connected_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert!(conn.scopes.is_empty());
        assert_eq!(conn.missing_scopes().len(), 3);
    }

    #[test]
    fn malformed_record_is_not_connected() {
        assert!(IntegrationConnection::from_json(&json!({"provider": "github"})).is_none());
        assert!(IntegrationConnection::from_json(&json!("garbage")).is_none());
        assert!(IntegrationConnection::from_json(&json!({
            "provider": "trello",
            "access_token": "x",
            "connected_at": "2026-01-02T03:04:05Z"
        }))
        .is_none());
        assert!(IntegrationConnection::from_json(&json!({
            "provider": "jira",
            "access_token": "  ",
            "connected_at": "2026-01-02T03:04:05Z"
        }))
        .is_none());
    }

    #[test]
    fn status_payload_covers_every_provider() {
        let snapshot = parse_status_payload(&json!({
            "github": { "connected": true, "name": "GitHub", "connected_at": "2026-03-01T10:00:00Z" },
            "jira": { "connected": false, "name": "Jira Cloud" },
        }));
        let ids: Vec<_> = snapshot.keys().copied().collect();
        assert_eq!(ids, ProviderId::ALL.to_vec());

        let github = &snapshot[&ProviderId::Github];
        assert!(github.connected);
        assert!(github.connected_at.is_some());
        assert_eq!(snapshot[&ProviderId::Jira].name, "Jira Cloud");
        assert!(!snapshot[&ProviderId::Gitlab].connected);
        assert_eq!(snapshot[&ProviderId::Azure].name, "Azure DevOps");
    }

    #[test]
    fn malformed_status_entries_are_disconnected() {
        let snapshot = parse_status_payload(&json!({
            "github": "yes",
            "gitlab": { "connected": "true" },
            "bitbucket": { "connected": true, "name": 42, "connected_at": "yesterday" },
            "trello": { "connected": true },
        }));
        assert!(!snapshot[&ProviderId::Github].connected);
        assert!(!snapshot[&ProviderId::Gitlab].connected);
        let bitbucket = &snapshot[&ProviderId::Bitbucket];
        assert!(bitbucket.connected);
        assert_eq!(bitbucket.name, "Bitbucket");
        assert_eq!(bitbucket.connected_at, None);
        assert_eq!(snapshot.len(), 5);
    }

    #[test]
    fn non_object_payload_is_all_disconnected() {
        let snapshot = parse_status_payload(&json!([1, 2, 3]));
        assert!(snapshot.values().all(|s| !s.connected));
    }
}
