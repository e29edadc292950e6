//! Authorization URL construction, one arm per provider.
//!
//! Parameter names, ordering, hosts and scope delimiters are the wire
//! contract of each provider's authorize endpoint.

use crate::providers::ProviderId;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITLAB_AUTHORIZE_URL: &str = "https://gitlab.com/oauth/authorize";
pub const BITBUCKET_AUTHORIZE_URL: &str = "https://bitbucket.org/site/oauth2/authorize";
pub const AZURE_AUTHORIZE_URL: &str = "https://app.vssps.visualstudio.com/oauth2/authorize";
pub const JIRA_AUTHORIZE_URL: &str = "https://auth.atlassian.com/authorize";

/// Separator a provider expects between scopes in the `scope` parameter.
pub fn scope_delimiter(provider: ProviderId) -> Option<&'static str> {
    match provider {
        ProviderId::Github => Some(","),
        ProviderId::Gitlab => Some("+"),
        ProviderId::Azure | ProviderId::Jira => Some(" "),
        // The builder sends no scope parameter to Bitbucket.
        ProviderId::Bitbucket => None,
    }
}

/// Join scopes the way `provider` expects them in the query string.
///
/// Spaces are written as `%20`; every other character is kept as-is so
/// the joined list stays readable in the final URL.
pub fn join_scopes<S: AsRef<str>>(provider: ProviderId, scopes: &[S]) -> String {
    let Some(delimiter) = scope_delimiter(provider) else {
        return String::new();
    };
    scopes
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(delimiter)
        .replace(' ', "%20")
}

/// Build the authorization URL the browser should be sent to.
///
/// `state` is written exactly as provided. `redirect_uri` is
/// percent-encoded. Bitbucket ignores both `scopes` and `redirect_uri`.
pub fn build_auth_url<S: AsRef<str>>(
    provider: ProviderId,
    client_id: &str,
    scopes: &[S],
    state: &str,
    redirect_uri: &str,
) -> String {
    let client_id = urlencoding::encode(client_id);
    let scope = join_scopes(provider, scopes);
    let redirect = urlencoding::encode(redirect_uri);

    let url = match provider {
        ProviderId::Github => format!(
            "{GITHUB_AUTHORIZE_URL}?client_id={client_id}&redirect_uri={redirect}&scope={scope}&state={state}"
        ),
        ProviderId::Gitlab => format!(
            "{GITLAB_AUTHORIZE_URL}?client_id={client_id}&redirect_uri={redirect}&response_type=code&scope={scope}&state={state}"
        ),
        ProviderId::Bitbucket => format!(
            "{BITBUCKET_AUTHORIZE_URL}?client_id={client_id}&response_type=code&state={state}"
        ),
        ProviderId::Azure => format!(
            "{AZURE_AUTHORIZE_URL}?client_id={client_id}&response_type=Assertion&state={state}&scope={scope}&redirect_uri={redirect}"
        ),
        ProviderId::Jira => format!(
            "{JIRA_AUTHORIZE_URL}?audience=api.atlassian.com&client_id={client_id}&scope={scope}&redirect_uri={redirect}&state={state}&response_type=code&prompt=consent"
        ),
    };

    tracing::debug!(provider = %provider, "built authorization url");
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIRECT: &str = "http://localhost:3000/oauth-callback";

    fn build(provider: ProviderId) -> String {
        build_auth_url(provider, "cid-123", provider.provider().scopes, "st4te", REDIRECT)
    }

    fn query_value(raw: &str, key: &str) -> Option<String> {
        let parsed = url::Url::parse(raw).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn hosts_match_each_provider() {
        let expected = [
            (ProviderId::Github, "github.com"),
            (ProviderId::Gitlab, "gitlab.com"),
            (ProviderId::Bitbucket, "bitbucket.org"),
            (ProviderId::Azure, "app.vssps.visualstudio.com"),
            (ProviderId::Jira, "auth.atlassian.com"),
        ];
        for (provider, host) in expected {
            let parsed = url::Url::parse(&build(provider)).unwrap();
            assert_eq!(parsed.scheme(), "https");
            assert_eq!(parsed.host_str(), Some(host), "{provider}");
        }
    }

    #[test]
    fn github_scopes_are_comma_joined() {
        let url = build(ProviderId::Github);
        assert!(url.contains("scope=repo,read:user,user:email"));
        assert!(url.starts_with("https://github.com/login/oauth/authorize?client_id=cid-123"));
    }

    #[test]
    fn gitlab_scopes_are_plus_joined() {
        let url = build(ProviderId::Gitlab);
        assert!(url.contains("scope=api+read_user"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn azure_and_jira_scopes_are_space_joined() {
        assert_eq!(
            query_value(&build(ProviderId::Azure), "scope").as_deref(),
            Some("vso.work_full vso.project")
        );
        assert_eq!(
            query_value(&build(ProviderId::Jira), "scope").as_deref(),
            Some("read:jira-work write:jira-work read:jira-user offline_access")
        );
        assert!(build(ProviderId::Azure).contains("response_type=Assertion"));
        assert!(build(ProviderId::Jira).contains("audience=api.atlassian.com"));
        assert!(build(ProviderId::Jira).contains("prompt=consent"));
    }

    #[test]
    fn redirect_uri_is_percent_encoded() {
        for provider in [
            ProviderId::Github,
            ProviderId::Gitlab,
            ProviderId::Azure,
            ProviderId::Jira,
        ] {
            let url = build(provider);
            assert!(
                url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth-callback"),
                "{provider}: {url}"
            );
            assert_eq!(query_value(&url, "redirect_uri").as_deref(), Some(REDIRECT));
        }
    }

    #[test]
    fn bitbucket_ignores_scopes_and_redirect() {
        let url = build(ProviderId::Bitbucket);
        assert_eq!(
            url,
            "https://bitbucket.org/site/oauth2/authorize?client_id=cid-123&response_type=code&state=st4te"
        );
        assert!(!url.contains("scope="));
        assert!(!url.contains("redirect_uri="));
    }

    #[test]
    fn state_is_passed_through_as_provided() {
        for provider in ProviderId::ALL {
            assert_eq!(query_value(&build(provider), "state").as_deref(), Some("st4te"));
        }
    }

    #[test]
    fn custom_scopes_override_registry_defaults() {
        let url = build_auth_url(ProviderId::Github, "cid", &["gist"], "s", REDIRECT);
        assert!(url.contains("scope=gist&"));
        let url = build_auth_url(ProviderId::Gitlab, "cid", &Vec::<String>::new(), "s", REDIRECT);
        assert!(url.contains("scope=&"));
    }

    #[test]
    fn join_scopes_for_bitbucket_is_empty() {
        assert_eq!(join_scopes(ProviderId::Bitbucket, &["repository"]), "");
    }
}
