//! Per-provider connection state, owned by the caller.
//!
//! The backend is the source of truth; this container mirrors its last
//! reported state. Failed backend calls never change the mirror. State
//! changing actions (connect, disconnect) are serialized per provider.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::backend::ConnectionBackend;
use super::record::{empty_snapshot, IntegrationConnection, ProviderStatus, StatusSnapshot};
use crate::error::{ConnectionError, OAuthError};
use crate::oauth::result::OAuthResultOutcome;
use crate::oauth::{state, AuthorizationRequest, OAuthSettings};
use crate::providers::ProviderId;

type InFlight = Arc<Mutex<HashSet<ProviderId>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a provider busy until dropped.
#[derive(Debug)]
struct InFlightGuard {
    provider: ProviderId,
    in_flight: InFlight,
}

impl InFlightGuard {
    fn acquire(in_flight: &InFlight, provider: ProviderId) -> Result<Self, ConnectionError> {
        if !lock(in_flight).insert(provider) {
            return Err(ConnectionError::Busy { provider });
        }
        Ok(Self {
            provider,
            in_flight: Arc::clone(in_flight),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.provider);
    }
}

/// An OAuth attempt in progress. Holds the provider busy until it is
/// finished or dropped.
#[derive(Debug)]
pub struct ConnectAttempt {
    request: AuthorizationRequest,
    _guard: InFlightGuard,
}

impl ConnectAttempt {
    pub fn provider(&self) -> ProviderId {
        self.request.provider
    }

    /// Where to send the browser.
    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn state(&self) -> &str {
        &self.request.state
    }

    /// Check the `state` echoed back by the provider.
    pub fn verify_state(&self, returned: &str) -> Result<(), OAuthError> {
        if state::states_match(&self.request.state, returned) {
            Ok(())
        } else {
            Err(OAuthError::StateMismatch {
                provider: self.request.provider,
            })
        }
    }
}

/// Injectable container for "is provider X connected".
pub struct ConnectionState<B> {
    backend: B,
    statuses: Mutex<StatusSnapshot>,
    in_flight: InFlight,
}

impl<B: ConnectionBackend> ConnectionState<B> {
    /// Start with every provider disconnected until the first refresh.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            statuses: Mutex::new(empty_snapshot()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Last known status of every provider, in registry order.
    pub fn get_status(&self) -> StatusSnapshot {
        lock(&self.statuses).clone()
    }

    pub fn status(&self, provider: ProviderId) -> ProviderStatus {
        lock(&self.statuses)
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProviderStatus::disconnected(provider))
    }

    pub fn is_connected(&self, provider: ProviderId) -> bool {
        self.status(provider).connected
    }

    /// Whether a connect or disconnect for `provider` is in flight.
    pub fn is_busy(&self, provider: ProviderId) -> bool {
        lock(&self.in_flight).contains(&provider)
    }

    /// Reload status from the backend. On failure the previous state is kept.
    ///
    /// A successful reload replaces the mirror wholesale, including stale
    /// markers; providers the backend omits read as disconnected.
    pub async fn refresh(&self) -> Result<StatusSnapshot, ConnectionError> {
        match self.backend.fetch_status().await {
            Ok(snapshot) => {
                let mut fresh = empty_snapshot();
                fresh.extend(snapshot);
                let mut statuses = lock(&self.statuses);
                *statuses = fresh;
                tracing::debug!(
                    connected = statuses.values().filter(|s| s.connected).count(),
                    "refreshed integration status"
                );
                Ok(statuses.clone())
            }
            Err(e) => {
                tracing::warn!(error = %e, "integration status refresh failed; keeping last known state");
                Err(ConnectionError::Refresh(e))
            }
        }
    }

    /// Disconnect `provider` on the backend and mirror the result.
    pub async fn disconnect(&self, provider: ProviderId) -> Result<(), ConnectionError> {
        let _guard = InFlightGuard::acquire(&self.in_flight, provider)?;

        if let Err(source) = self.backend.disconnect(provider).await {
            tracing::warn!(%provider, error = %source, "disconnect failed; keeping last known state");
            return Err(ConnectionError::Backend { provider, source });
        }

        let mut statuses = lock(&self.statuses);
        let entry = statuses
            .entry(provider)
            .or_insert_with(|| ProviderStatus::disconnected(provider));
        entry.connected = false;
        entry.connected_at = None;
        entry.stale = false;
        tracing::info!(%provider, "integration disconnected");
        Ok(())
    }

    /// Start an OAuth attempt for `provider`.
    ///
    /// Fails with `Busy` while another connect or disconnect for the same
    /// provider is in flight.
    pub fn begin_connect(
        &self,
        settings: &OAuthSettings,
        provider: ProviderId,
    ) -> Result<ConnectAttempt, ConnectionError> {
        let guard = InFlightGuard::acquire(&self.in_flight, provider)?;
        let request = settings.authorization_request(provider)?;
        tracing::info!(%provider, "starting oauth connection");
        Ok(ConnectAttempt {
            request,
            _guard: guard,
        })
    }

    /// Finish an attempt once the result page has been classified.
    ///
    /// A successful outcome for the attempt's provider reloads status from
    /// the backend. Any other outcome leaves state untouched. The provider
    /// is released either way.
    pub async fn finish_connect(
        &self,
        attempt: ConnectAttempt,
        outcome: &OAuthResultOutcome,
    ) -> Result<ProviderStatus, ConnectionError> {
        let provider = attempt.provider();
        let matches_attempt = outcome.provider.map_or(true, |p| p == provider);

        if outcome.status.is_success() && matches_attempt {
            self.refresh().await?;
        } else {
            tracing::info!(%provider, status = ?outcome.status, "oauth attempt did not connect");
        }
        drop(attempt);
        Ok(self.status(provider))
    }

    /// Fetch the full connection record for `provider`.
    ///
    /// Backend failure is reported; an absent or malformed record is `None`.
    pub async fn connection(
        &self,
        provider: ProviderId,
    ) -> Result<Option<IntegrationConnection>, ConnectionError> {
        self.backend
            .fetch_connection(provider)
            .await
            .map_err(|source| ConnectionError::Backend { provider, source })
    }

    /// Record the HTTP status of a failed provider API call.
    ///
    /// 401 and 403 mean the stored token is no longer accepted: the
    /// provider is shown as disconnected and stale so the user reconnects.
    /// Returns whether the state changed.
    pub fn report_api_failure(&self, provider: ProviderId, http_status: u16) -> bool {
        if !matches!(http_status, 401 | 403) {
            return false;
        }
        let mut statuses = lock(&self.statuses);
        let Some(entry) = statuses.get_mut(&provider) else {
            return false;
        };
        if !entry.connected {
            return false;
        }
        entry.connected = false;
        entry.stale = true;
        tracing::warn!(%provider, http_status, "provider rejected stored token; reconnect required");
        true
    }
}
