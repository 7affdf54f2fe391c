//! Package-id resolution
//!
//! The lending protocol upgrades its package from time to time; the latest id
//! is served by the open API. [`PackageIdCache`] keeps the last answer for a
//! TTL and guarantees at most one refresh in flight. While a refresh runs,
//! other callers get the stale value immediately when there is one. The
//! caller that started the refresh, and callers with nothing cached, wait on
//! the shared refresh.
//!
//! The fetch runs on its own task, so it finishes even when every waiter is
//! dropped. The next caller that finds it finished stores the result.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Deserialize;
use tokio::time::Instant;

use navi_core::{ObjectId, ProtocolConfig, RpcError};

use crate::state::LendingError;

/// Anything that can report the current package id
pub trait PackageSource: Send + Sync + 'static {
    fn fetch_package_id(&self) -> BoxFuture<'static, Result<ObjectId, LendingError>>;
}

type SharedRefresh = Shared<BoxFuture<'static, Result<ObjectId, String>>>;

#[derive(Default)]
struct CacheState {
    value: Option<ObjectId>,
    expires_at: Option<Instant>,
    /// Generation tag and the refresh every waiter shares
    in_flight: Option<(u64, SharedRefresh)>,
    generation: u64,
}

impl CacheState {
    fn fresh(&self, now: Instant) -> Option<ObjectId> {
        match (&self.value, self.expires_at) {
            (Some(value), Some(expires_at)) if now < expires_at => Some(value.clone()),
            _ => None,
        }
    }
}

enum Step {
    Ready(ObjectId),
    Wait(u64, SharedRefresh),
    Settle(u64, Result<ObjectId, String>),
}

/// Single-flight TTL cache for the protocol package id
pub struct PackageIdCache<S> {
    source: S,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl<S: PackageSource> PackageIdCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Cache seeded with an already-expired value, served while the first
    /// refresh is in flight or when it fails
    pub fn with_fallback(source: S, ttl: Duration, fallback: ObjectId) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(CacheState {
                value: Some(fallback),
                ..CacheState::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>, LendingError> {
        self.state
            .lock()
            .map_err(|_| LendingError::PackageResolution("package cache lock poisoned".into()))
    }

    /// Last known value, fresh or not
    pub fn peek(&self) -> Option<ObjectId> {
        self.lock().ok().and_then(|s| s.value.clone())
    }

    /// Mark the cached value as expired
    pub fn invalidate(&self) -> Result<(), LendingError> {
        self.lock()?.expires_at = None;
        Ok(())
    }

    /// Current package id, refreshing when the cached one has expired
    pub async fn get_or_refresh(&self) -> Result<ObjectId, LendingError> {
        let step = {
            let mut state = self.lock()?;
            if let Some(value) = state.fresh(Instant::now()) {
                Step::Ready(value)
            } else if let Some((generation, refresh)) = state.in_flight.clone() {
                match (refresh.clone().now_or_never(), &state.value) {
                    (Some(result), _) => Step::Settle(generation, result),
                    (None, Some(stale)) => Step::Ready(stale.clone()),
                    (None, None) => Step::Wait(generation, refresh),
                }
            } else {
                state.generation += 1;
                let generation = state.generation;
                let task = tokio::spawn(self.source.fetch_package_id());
                let refresh = async move {
                    match task.await {
                        Ok(result) => result.map_err(|e| e.to_string()),
                        Err(e) => Err(format!("package refresh task failed: {}", e)),
                    }
                }
                .boxed()
                .shared();
                state.in_flight = Some((generation, refresh.clone()));
                tracing::debug!(generation, "Refreshing package id");
                Step::Wait(generation, refresh)
            }
        };

        match step {
            Step::Ready(value) => Ok(value),
            Step::Settle(generation, result) => self.complete(generation, result),
            Step::Wait(generation, refresh) => {
                let result = refresh.await;
                self.complete(generation, result)
            }
        }
    }

    fn complete(
        &self,
        generation: u64,
        result: Result<ObjectId, String>,
    ) -> Result<ObjectId, LendingError> {
        let mut state = self.lock()?;
        let current = state
            .in_flight
            .as_ref()
            .is_some_and(|(g, _)| *g == generation);

        match result {
            Ok(package) => {
                if current {
                    state.value = Some(package.clone());
                    state.expires_at = Some(Instant::now() + self.ttl);
                    state.in_flight = None;
                    tracing::info!(package = %package, "Package id resolved");
                }
                Ok(package)
            }
            Err(message) => {
                if current {
                    state.in_flight = None;
                }
                match &state.value {
                    Some(stale) => {
                        tracing::warn!(error = %message, package = %stale, "Package refresh failed, serving stale id");
                        Ok(stale.clone())
                    }
                    None => Err(LendingError::PackageResolution(message)),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageResponse {
    package_id: String,
}

/// Package id from the protocol's open API
#[derive(Clone)]
pub struct OpenApiPackageSource {
    http: reqwest::Client,
    url: String,
}

impl OpenApiPackageSource {
    pub fn new(config: &ProtocolConfig, timeout_secs: u64) -> Result<Self, LendingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", config.open_api_url, e),
            })?;
        Ok(Self {
            http,
            url: format!("{}/api/package", config.open_api_url.trim_end_matches('/')),
        })
    }
}

async fn fetch_package(http: reqwest::Client, url: String) -> Result<ObjectId, LendingError> {
    let response = http.get(&url).send().await.map_err(|e| RpcError::Unreachable {
        url: format!("{}: {}", url, e),
    })?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(RpcError::HttpStatus {
            status: status.as_u16(),
            message,
        }
        .into());
    }
    let body: PackageResponse = response
        .json()
        .await
        .map_err(|e| RpcError::ParseError(format!("package: {}", e)))?;
    Ok(ObjectId::parse(&body.package_id)?)
}

impl PackageSource for OpenApiPackageSource {
    fn fetch_package_id(&self) -> BoxFuture<'static, Result<ObjectId, LendingError>> {
        fetch_package(self.http.clone(), self.url.clone()).boxed()
    }
}
