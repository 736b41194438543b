// Upstream resource fetcher.
//
// One method per FPL endpoint, each fetching exactly one resource with no
// cross-resource knowledge. The client is constructed once at startup from
// config and injected into the service; it holds nothing but the connection
// pool, the base URL, and the per-call timeout. Any failure maps to
// `CoreError::UpstreamUnavailable` tagged with the resource name; there are
// no retries here.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CoreError;
use crate::fpl::types::{Catalog, Entry, Fixture, LiveEvent, PicksResponse};

pub const FPL_BASE_URL: &str = "https://fantasy.premierleague.com/api";

#[derive(Debug, Clone)]
pub struct FplClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl FplClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Global catalog: players, teams, positions, events.
    pub async fn bootstrap(&self) -> Result<Catalog, CoreError> {
        self.get_json("bootstrap-static/", "catalog").await
    }

    /// Full season fixture list.
    pub async fn fixtures(&self) -> Result<Vec<Fixture>, CoreError> {
        self.get_json("fixtures/", "fixtures").await
    }

    /// A manager's picks for one event.
    pub async fn picks(&self, entry_id: u64, event_id: u32) -> Result<PicksResponse, CoreError> {
        self.get_json(&format!("entry/{entry_id}/event/{event_id}/picks/"), "picks")
            .await
    }

    /// Manager entry record (bank, squad value).
    pub async fn entry(&self, entry_id: u64) -> Result<Entry, CoreError> {
        self.get_json(&format!("entry/{entry_id}/"), "manager-entry")
            .await
    }

    /// Per-player live stats for one event.
    pub async fn live(&self, event_id: u32) -> Result<LiveEvent, CoreError> {
        self.get_json(&format!("event/{event_id}/live/"), "live-event")
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &'static str,
    ) -> Result<T, CoreError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(resource, %url, "fetching upstream resource");

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CoreError::UpstreamUnavailable {
                resource,
                message: e.to_string(),
            })?
            .error_for_status()
            .map_err(|e| CoreError::UpstreamUnavailable {
                resource,
                message: e.to_string(),
            })?;

        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::UpstreamUnavailable {
                resource,
                message: format!("invalid response body: {e}"),
            })
    }
}
