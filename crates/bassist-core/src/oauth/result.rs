//! Classification of the `/oauth-result` redirect.
//!
//! The callback page receives `oauth=<status>&provider=<id>&message=<text>`
//! and classifies it exactly once per load. Classification never fails:
//! anything unrecognized becomes [`OAuthStatus::UnknownError`].

use serde::Serialize;

use crate::providers::{self, ProviderId};

/// Query parameter names on the callback URL.
pub const STATUS_PARAM: &str = "oauth";
pub const PROVIDER_PARAM: &str = "provider";
pub const MESSAGE_PARAM: &str = "message";

/// Outcome of an OAuth round-trip as reported by the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthStatus {
    Success,
    Error,
    Expired,
    Invalid,
    UnknownError,
}

impl OAuthStatus {
    /// Strict, case-sensitive parse of the raw status parameter.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("success") => OAuthStatus::Success,
            Some("error") => OAuthStatus::Error,
            Some("expired") => OAuthStatus::Expired,
            Some("invalid") => OAuthStatus::Invalid,
            _ => OAuthStatus::UnknownError,
        }
    }

    /// Message shown when the callback carries no `message`.
    pub fn default_message(&self) -> Option<&'static str> {
        match self {
            OAuthStatus::Success => Some("Successfully connected"),
            OAuthStatus::Error => None,
            OAuthStatus::Expired => Some("OAuth session expired"),
            OAuthStatus::Invalid => Some("Invalid OAuth response"),
            OAuthStatus::UnknownError => Some("An unexpected error occurred"),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OAuthStatus::Success => "Connection successful",
            OAuthStatus::Error => "Connection failed",
            OAuthStatus::Expired => "Session expired",
            OAuthStatus::Invalid => "Invalid response",
            OAuthStatus::UnknownError => "Something went wrong",
        }
    }

    /// Actions the result page offers for this outcome.
    pub fn affordances(&self) -> &'static [Affordance] {
        match self {
            OAuthStatus::Success => &[Affordance::ProceedToIntegrations, Affordance::ReturnHome],
            OAuthStatus::Error => &[Affordance::RetryConnection, Affordance::ReturnHome],
            OAuthStatus::Expired => &[Affordance::Reconnect, Affordance::ReturnHome],
            OAuthStatus::Invalid | OAuthStatus::UnknownError => &[Affordance::ReturnHome],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OAuthStatus::Success)
    }
}

/// Something the user can do from the result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    ProceedToIntegrations,
    ReturnHome,
    /// Restart the OAuth flow for the same provider.
    RetryConnection,
    /// Same mechanics as `RetryConnection`, offered after expiry.
    Reconnect,
}

impl Affordance {
    pub fn label(&self) -> &'static str {
        match self {
            Affordance::ProceedToIntegrations => "Go to integrations",
            Affordance::ReturnHome => "Return home",
            Affordance::RetryConnection => "Retry connection",
            Affordance::Reconnect => "Reconnect",
        }
    }

    /// Whether invoking this action re-enters the authorization URL flow.
    pub fn restarts_oauth(&self) -> bool {
        matches!(self, Affordance::RetryConnection | Affordance::Reconnect)
    }
}

const TROUBLESHOOTING_HINTS: &[&str] = &[
    "Make sure you approved the requested permissions on the provider's consent screen",
    "Check that your account has access to the organization or workspace you selected",
    "Disable browser extensions that block third-party cookies or redirects",
    "Try again in a few minutes in case the provider is temporarily unavailable",
];

/// Classified callback, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthResultOutcome {
    pub status: OAuthStatus,
    /// Resolved provider, if the callback named a known one.
    pub provider: Option<ProviderId>,
    /// Provider display name or "External service".
    pub provider_name: &'static str,
    /// Callback message, or the status default. `None` only for `Error`
    /// callbacks that carried no message.
    pub message: Option<String>,
}

impl OAuthResultOutcome {
    pub fn affordances(&self) -> &'static [Affordance] {
        self.status.affordances()
    }

    pub fn offers(&self, affordance: Affordance) -> bool {
        self.affordances().contains(&affordance)
    }

    /// Troubleshooting hints, only populated for `Error` outcomes.
    pub fn troubleshooting_hints(&self) -> &'static [&'static str] {
        match self.status {
            OAuthStatus::Error => TROUBLESHOOTING_HINTS,
            _ => &[],
        }
    }

    /// Provider a retry/reconnect should target.
    pub fn retry_target(&self) -> Option<ProviderId> {
        if self.affordances().iter().any(Affordance::restarts_oauth) {
            self.provider
        } else {
            None
        }
    }
}

/// Classify raw parameter values.
pub fn classify(
    status: Option<&str>,
    provider: Option<&str>,
    message: Option<&str>,
) -> OAuthResultOutcome {
    let status = OAuthStatus::parse(status);
    let resolved = provider.and_then(|raw| raw.trim().parse::<ProviderId>().ok());
    let provider_name = providers::display_name_or_default(provider);
    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| status.default_message().map(str::to_string));

    tracing::debug!(?status, provider = ?resolved, "classified oauth callback");

    OAuthResultOutcome {
        status,
        provider: resolved,
        provider_name,
        message,
    }
}

/// Classify a callback query string (leading `?` optional).
/// Repeated parameters resolve to their first occurrence.
pub fn classify_query(query: &str) -> OAuthResultOutcome {
    let query = query.trim().trim_start_matches('?');
    let (mut status, mut provider, mut message) = (None, None, None);
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            STATUS_PARAM => &mut status,
            PROVIDER_PARAM => &mut provider,
            MESSAGE_PARAM => &mut message,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    classify(status.as_deref(), provider.as_deref(), message.as_deref())
}

/// Base used to resolve relative callback paths like `/oauth-result?...`.
const RELATIVE_BASE: &str = "http://localhost/";

/// Classify a full callback URL, a relative callback path or a bare query.
///
/// Fragments are never part of the query.
pub fn classify_callback(input: &str) -> OAuthResultOutcome {
    let input = input.trim();
    let resolved = if input.starts_with(['/', '?']) {
        url::Url::parse(RELATIVE_BASE).and_then(|base| base.join(input))
    } else {
        url::Url::parse(input)
    };
    match resolved {
        Ok(parsed) => classify_query(parsed.query().unwrap_or_default()),
        Err(_) => {
            let query = input.split_once('#').map_or(input, |(q, _)| q);
            classify_query(query)
        }
    }
}
