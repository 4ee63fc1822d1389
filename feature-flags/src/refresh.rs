use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::FlagRefreshError;
use crate::flag_definitions::{FlagTable, RemoteFlagPayload};

const FETCH_TIMEOUT_SECS: u64 = 5;

/// Where remote flag payloads come from. The real source is the rollout
/// control plane over HTTP; tests swap in a static one.
#[async_trait]
pub trait FlagSource {
    async fn fetch(&self) -> Result<RemoteFlagPayload, FlagRefreshError>;
}

pub struct HttpFlagSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFlagSource {
    pub fn new(url: String) -> anyhow::Result<HttpFlagSource> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;

        Ok(HttpFlagSource { url, client })
    }
}

#[async_trait]
impl FlagSource for HttpFlagSource {
    async fn fetch(&self) -> Result<RemoteFlagPayload, FlagRefreshError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| FlagRefreshError::FetchFailed(e.to_string()))?
            .text()
            .await
            .map_err(|e| FlagRefreshError::FetchFailed(e.to_string()))?;

        RemoteFlagPayload::from_json(&body)
    }
}

/// In-memory source for tests and local development.
#[derive(Clone, Default)]
pub struct StaticFlagSource {
    payload: Option<RemoteFlagPayload>,
}

impl StaticFlagSource {
    pub fn new(payload: RemoteFlagPayload) -> StaticFlagSource {
        StaticFlagSource {
            payload: Some(payload),
        }
    }

    /// A source that fails every fetch.
    pub fn failing() -> StaticFlagSource {
        StaticFlagSource { payload: None }
    }
}

#[async_trait]
impl FlagSource for StaticFlagSource {
    async fn fetch(&self) -> Result<RemoteFlagPayload, FlagRefreshError> {
        match &self.payload {
            Some(payload) => Ok(payload.clone()),
            None => Err(FlagRefreshError::FetchFailed("static source".to_string())),
        }
    }
}

/// Shared handle over the active table. Readers clone out an `Arc` snapshot;
/// the single refresh writer replaces the whole table. Nobody ever mutates a
/// table in place.
#[derive(Clone, Default)]
pub struct FlagTableHandle {
    inner: Arc<RwLock<Arc<FlagTable>>>,
}

impl FlagTableHandle {
    pub fn new(table: FlagTable) -> FlagTableHandle {
        FlagTableHandle {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    pub fn snapshot(&self) -> Arc<FlagTable> {
        self.inner
            .read()
            .expect("flag table lock poisoned")
            .clone()
    }

    pub fn swap(&self, table: FlagTable) {
        *self.inner.write().expect("flag table lock poisoned") = Arc::new(table);
    }

    /// Fetch from `source` and swap in the result. On any failure the
    /// last-known-good table stays active.
    pub async fn refresh_from(
        &self,
        source: &(dyn FlagSource + Sync),
    ) -> Result<(), FlagRefreshError> {
        let payload = source.fetch().await?;
        let next = self.snapshot().with_remote_payload(payload);
        self.swap(next);
        Ok(())
    }
}

/// Background poll task; spawn once at startup. Needs to outlive individual
/// fetch failures, so it only logs them.
pub async fn refresh_loop<S>(handle: FlagTableHandle, source: S, period: Duration)
where
    S: FlagSource + Send + Sync,
{
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match handle.refresh_from(&source).await {
            Ok(()) => tracing::debug!("flag table refreshed"),
            Err(e) => {
                tracing::warn!("flag refresh failed, keeping last-known-good table: {}", e);
            }
        }
    }
}
