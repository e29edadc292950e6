//! Integration provider registry.
//!
//! The closed set of issue trackers / VCS hosts Bassist can connect to,
//! with their display metadata and the OAuth scopes each one needs.
//! Display order is registration order and is part of the contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// Stable identifier of a supported integration provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Github,
    Gitlab,
    Bitbucket,
    Azure,
    Jira,
}

impl ProviderId {
    /// All providers in display order.
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Github,
        ProviderId::Gitlab,
        ProviderId::Bitbucket,
        ProviderId::Azure,
        ProviderId::Jira,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Github => "github",
            ProviderId::Gitlab => "gitlab",
            ProviderId::Bitbucket => "bitbucket",
            ProviderId::Azure => "azure",
            ProviderId::Jira => "jira",
        }
    }

    /// Environment variable holding this provider's OAuth client id.
    pub fn client_id_env(&self) -> String {
        format!("BASSIST_{}_CLIENT_ID", self.as_str().to_uppercase())
    }

    /// Registry entry for this id. Total: every id has exactly one entry.
    pub fn provider(&self) -> &'static Provider {
        match self {
            ProviderId::Github => &PROVIDERS[0],
            ProviderId::Gitlab => &PROVIDERS[1],
            ProviderId::Bitbucket => &PROVIDERS[2],
            ProviderId::Azure => &PROVIDERS[3],
            ProviderId::Jira => &PROVIDERS[4],
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(ProviderId::Github),
            "gitlab" => Ok(ProviderId::Gitlab),
            "bitbucket" => Ok(ProviderId::Bitbucket),
            "azure" => Ok(ProviderId::Azure),
            "jira" => Ok(ProviderId::Jira),
            other => Err(ProviderError::NotFound(other.to_string())),
        }
    }
}

/// Marker for providers that are registered but not fully supported yet.
/// Connecting is disabled for them; it is not an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStatus {
    ComingSoon,
    Beta,
}

impl ImplementationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ImplementationStatus::ComingSoon => "Coming soon",
            ImplementationStatus::Beta => "Beta",
        }
    }
}

/// Identity and display metadata for one integration provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    /// Scopes requested on connect, in the order they are serialized.
    pub scopes: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_status: Option<ImplementationStatus>,
}

impl Provider {
    /// Whether a connect action should be offered for this provider.
    /// `Beta` providers are connectable, `ComingSoon` ones are not.
    pub fn is_connectable(&self) -> bool {
        !matches!(
            self.implementation_status,
            Some(ImplementationStatus::ComingSoon)
        )
    }
}

static PROVIDERS: [Provider; 5] = [
    Provider {
        id: ProviderId::Github,
        name: "GitHub",
        description: "Create issues and pull request checklists in GitHub repositories",
        icon: "github",
        color: "#24292e",
        scopes: &["repo", "read:user", "user:email"],
        implementation_status: None,
    },
    Provider {
        id: ProviderId::Gitlab,
        name: "GitLab",
        description: "Create issues and milestones in GitLab projects",
        icon: "gitlab",
        color: "#fc6d26",
        scopes: &["api", "read_user"],
        implementation_status: None,
    },
    Provider {
        id: ProviderId::Bitbucket,
        name: "Bitbucket",
        description: "Create issues in Bitbucket Cloud repositories",
        icon: "bitbucket",
        color: "#0052cc",
        scopes: &["repository", "issue:write", "account"],
        implementation_status: None,
    },
    Provider {
        id: ProviderId::Azure,
        name: "Azure DevOps",
        description: "Create work items in Azure DevOps boards",
        icon: "azure",
        color: "#0078d4",
        scopes: &["vso.work_full", "vso.project"],
        implementation_status: Some(ImplementationStatus::Beta),
    },
    Provider {
        id: ProviderId::Jira,
        name: "Jira",
        description: "Create epics, stories and tasks in Jira projects",
        icon: "jira",
        color: "#0052cc",
        scopes: &[
            "read:jira-work",
            "write:jira-work",
            "read:jira-user",
            "offline_access",
        ],
        implementation_status: None,
    },
];

/// All providers in display order.
pub fn list_providers() -> &'static [Provider] {
    &PROVIDERS
}

/// Look up a provider by its string id.
pub fn get_provider(id: &str) -> Result<&'static Provider, ProviderError> {
    id.parse::<ProviderId>().map(|p| p.provider())
}

/// Display name for an optional, possibly unknown provider id.
/// Unresolvable ids map to the generic "External service" label.
pub fn display_name_or_default(id: Option<&str>) -> &'static str {
    id.and_then(|raw| get_provider(raw.trim()).ok())
        .map(|p| p.name)
        .unwrap_or(EXTERNAL_SERVICE_LABEL)
}

/// Label shown when the provider of a callback cannot be resolved.
pub const EXTERNAL_SERVICE_LABEL: &str = "External service";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_preserves_registration_order() {
        let ids: Vec<&str> = list_providers().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["github", "gitlab", "bitbucket", "azure", "jira"]);
    }

    #[test]
    fn list_is_stable_across_calls() {
        assert_eq!(list_providers(), list_providers());
    }

    #[test]
    fn every_id_maps_to_its_own_entry() {
        for id in ProviderId::ALL {
            assert_eq!(id.provider().id, id);
        }
        for (idx, provider) in list_providers().iter().enumerate() {
            assert_eq!(ProviderId::ALL[idx], provider.id);
        }
    }

    #[test]
    fn ids_roundtrip_through_strings() {
        for id in ProviderId::ALL {
            assert_eq!(id.as_str().parse::<ProviderId>().unwrap(), id);
            assert_eq!(id.to_string(), id.as_str());
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(get_provider("github").is_ok());
        assert_eq!(
            get_provider("GitHub"),
            Err(ProviderError::NotFound("GitHub".to_string()))
        );
    }

    #[test]
    fn unknown_id_is_not_found() {
        assert!(matches!(
            get_provider("trello"),
            Err(ProviderError::NotFound(id)) if id == "trello"
        ));
    }

    #[test]
    fn display_name_defaults_to_external_service() {
        assert_eq!(display_name_or_default(Some("github")), "GitHub");
        assert_eq!(display_name_or_default(Some("azure")), "Azure DevOps");
        assert_eq!(display_name_or_default(Some("<script>")), "External service");
        assert_eq!(display_name_or_default(None), "External service");
    }

    #[test]
    fn every_provider_requests_scopes() {
        for provider in list_providers() {
            assert!(!provider.scopes.is_empty(), "{} has no scopes", provider.id);
        }
    }

    #[test]
    fn serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&ProviderId::Bitbucket).unwrap();
        assert_eq!(json, "\"bitbucket\"");
        let parsed: ProviderId = serde_json::from_str("\"jira\"").unwrap();
        assert_eq!(parsed, ProviderId::Jira);
    }

    #[test]
    fn client_id_env_names() {
        assert_eq!(ProviderId::Github.client_id_env(), "BASSIST_GITHUB_CLIENT_ID");
        assert_eq!(ProviderId::Azure.client_id_env(), "BASSIST_AZURE_CLIENT_ID");
    }

    #[test]
    fn beta_providers_stay_connectable() {
        assert!(ProviderId::Azure.provider().is_connectable());
        assert!(ProviderId::Github.provider().is_connectable());
    }

    #[test]
    fn coming_soon_providers_are_not_connectable() {
        let provider = Provider {
            implementation_status: Some(ImplementationStatus::ComingSoon),
            ..ProviderId::Bitbucket.provider().clone()
        };
        assert!(!provider.is_connectable());
        assert_eq!(provider.implementation_status.unwrap().label(), "Coming soon");
    }
}
