//! OpenVidu-compatible video session manager.
//!
//! Talks to the provider's REST API. Sessions are named after the channel
//! id, so no local session registry is needed: the provider is the source
//! of truth, and "already exists" / "not found" responses map onto the
//! idempotent semantics the coordinator expects.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use haven_core::video::VideoSessions;
use haven_types::channel::ChannelId;
use haven_types::config::VideoConfig;
use haven_types::error::VideoError;

/// REST client for an OpenVidu-compatible provider.
///
/// The shared secret is wrapped in [`SecretString`] and only exposed when
/// building the basic-auth header.
pub struct OpenViduClient {
    client: reqwest::Client,
    base_url: String,
    secret: Option<SecretString>,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Deserialize)]
struct ConnectionResponse {
    token: String,
}

/// Basic-auth header value for the provider's fixed `OPENVIDUAPP` user.
fn basic_auth(secret: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("OPENVIDUAPP:{secret}")))
}

fn session_name(channel_id: ChannelId) -> String {
    format!("channel-{channel_id}")
}

impl OpenViduClient {
    pub fn new(config: &VideoConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret: config.secret.clone().map(SecretString::from),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, format!("{}{path}", self.base_url));
        if let Some(secret) = &self.secret {
            builder = builder.header("Authorization", basic_auth(secret.expose_secret()));
        }
        builder
    }
}

impl VideoSessions for OpenViduClient {
    async fn ensure_session(&self, channel_id: ChannelId) -> Result<String, VideoError> {
        let response = self
            .request(reqwest::Method::POST, "/openvidu/api/sessions")
            .json(&serde_json::json!({ "customSessionId": session_name(channel_id) }))
            .send()
            .await
            .map_err(|e| VideoError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let session: SessionResponse = response
                    .json()
                    .await
                    .map_err(|e| VideoError::Provider(e.to_string()))?;
                Ok(session.id)
            }
            // 409: the session already exists under that name.
            reqwest::StatusCode::CONFLICT => {
                debug!(channel_id, "video session already exists");
                Ok(session_name(channel_id))
            }
            status => Err(VideoError::Provider(format!(
                "session create returned {status}"
            ))),
        }
    }

    async fn create_token(&self, channel_id: ChannelId) -> Result<String, VideoError> {
        let path = format!(
            "/openvidu/api/sessions/{}/connection",
            session_name(channel_id)
        );
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| VideoError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let connection: ConnectionResponse = response
                    .json()
                    .await
                    .map_err(|e| VideoError::Provider(e.to_string()))?;
                Ok(connection.token)
            }
            reqwest::StatusCode::NOT_FOUND => Err(VideoError::NotFound),
            status => Err(VideoError::Provider(format!(
                "token create returned {status}"
            ))),
        }
    }

    async fn close_session(&self, channel_id: ChannelId) -> Result<(), VideoError> {
        let path = format!("/openvidu/api/sessions/{}", session_name(channel_id));
        let response = self
            .request(reqwest::Method::DELETE, &path)
            .send()
            .await
            .map_err(|e| VideoError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already closed (or never created): success for cleanup paths.
            reqwest::StatusCode::NOT_FOUND => {
                debug!(channel_id, "video session already closed");
                Ok(())
            }
            status => Err(VideoError::Provider(format!(
                "session close returned {status}"
            ))),
        }
    }
}
