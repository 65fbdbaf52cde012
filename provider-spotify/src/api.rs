//! Spotify Connect Web API client
//!
//! Only the two control-plane calls the adapter needs: moving playback to
//! the SDK's device and starting a track on it.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_async::time::sleep;
use tracing::{debug, instrument, warn};

use crate::error::{Result, SpotifyError};
use crate::types::{track_uri, ApiErrorBody, StartPlaybackBody, TransferPlaybackBody};

/// Spotify Web API base URL
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Per-request timeout for control-plane calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect Web API client.
pub struct ConnectApi {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    /// Delay before the single handoff retry
    handoff_retry_delay: Duration,
}

impl ConnectApi {
    pub fn new(http_client: Arc<dyn HttpClient>, handoff_retry_delay: Duration) -> Self {
        Self {
            http_client,
            base_url: SPOTIFY_API_BASE.to_string(),
            handoff_retry_delay,
        }
    }

    /// Point the client at another API root (test servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Transfer the user's playback to `device_id` without starting it.
    ///
    /// Transient failures are retried once after the handoff retry delay.
    #[instrument(skip(self, access_token))]
    pub async fn transfer_playback(&self, access_token: &str, device_id: &str) -> Result<()> {
        let body = TransferPlaybackBody {
            device_ids: vec![device_id.to_string()],
            play: false,
        };

        match self.put_json("/me/player", access_token, &body).await {
            Err(e) if e.is_retryable() => {
                warn!(
                    error = %e,
                    retry_in_ms = self.handoff_retry_delay.as_millis() as u64,
                    "Device handoff failed, retrying once"
                );
                sleep(self.handoff_retry_delay).await;
                self.put_json("/me/player", access_token, &body).await
            }
            other => other,
        }
    }

    /// Start `track_id` on `device_id` at `position`.
    #[instrument(skip(self, access_token))]
    pub async fn start_playback(
        &self,
        access_token: &str,
        device_id: &str,
        track_id: &str,
        position: Option<Duration>,
    ) -> Result<()> {
        let body = StartPlaybackBody {
            uris: vec![track_uri(track_id)],
            position_ms: position.map(|p| p.as_millis() as u64),
        };
        let path = format!(
            "/me/player/play?device_id={}",
            urlencoding::encode(device_id)
        );
        self.put_json(&path, access_token, &body).await
    }

    async fn put_json<T: serde::Serialize>(
        &self,
        path: &str,
        access_token: &str,
        body: &T,
    ) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Put, format!("{}{}", self.base_url, path))
            .bearer_token(access_token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(body)?;

        let response = self.http_client.execute(request).await?;
        if response.is_success() {
            debug!(path, status = response.status, "Spotify API request succeeded");
            Ok(())
        } else {
            Err(api_error(&response))
        }
    }
}

fn api_error(response: &HttpResponse) -> SpotifyError {
    let message = response
        .json::<ApiErrorBody>()
        .map(|body| body.error.message)
        .unwrap_or_else(|_| response.text());
    SpotifyError::ApiError {
        status_code: response.status,
        message,
    }
}
