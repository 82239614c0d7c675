use crate::domain::NotificationPayload;
use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

/// Sends a single notification to a single device.
///
/// On success it returns the identifier the provider assigned to the message.
#[async_trait::async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(
        &self,
        delivery_address: &str,
        payload: &NotificationPayload,
    ) -> Result<String, PushError>;
}

#[derive(thiserror::Error, Debug)]
pub enum PushError {
    /// The provider answered, and said no (expired or malformed token, quota, ...).
    #[error("{0}")]
    Rejected(String),
    // Built from `reqwest::Error::without_url`: the message ends up in the response body, and the
    // url carries our project id.
    #[error("Failed to reach the push provider: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("The push provider accepted the message but sent back an unreadable response: {0}")]
    UnexpectedResponse(#[source] reqwest::Error),
}

/// Talks to the FCM HTTP v1 API.
pub struct PushClient {
    http_client: Client,
    send_url: Url,
    access_token: Secret<String>,
}

impl PushClient {
    pub fn new(
        base_url: String,
        project_id: String,
        access_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let mut send_url = Url::parse(&base_url).context("Invalid push provider base url")?;
        // Appended segment by segment: a path prefix on the base url is kept and the project id is
        // percent-encoded.
        send_url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("The push provider base url cannot be a base"))?
            .pop_if_empty()
            .extend(["v1", "projects", project_id.as_str(), "messages:send"]);
        Ok(Self {
            http_client,
            send_url,
            access_token,
        })
    }
}

#[async_trait::async_trait]
impl PushProvider for PushClient {
    #[tracing::instrument(name = "Send push notification", skip(self, delivery_address, payload))]
    async fn send(
        &self,
        delivery_address: &str,
        payload: &NotificationPayload,
    ) -> Result<String, PushError> {
        let request_body = SendRequest {
            message: Message {
                token: delivery_address,
                notification: payload,
            },
        };
        let response = self
            .http_client
            .post(self.send_url.clone())
            .bearer_auth(self.access_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            // The provider explains itself in `error.message`; fall back to the status line when the
            // body is not what we expect (e.g. a proxy error page).
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|r| r.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.to_string());
            return Err(PushError::Rejected(message));
        }

        let sent = response
            .json::<SendResponse>()
            .await
            .map_err(|e| PushError::UnexpectedResponse(e.without_url()))?;
        Ok(sent.name)
    }
}

#[derive(serde::Serialize)]
struct SendRequest<'a> {
    message: Message<'a>,
}

#[derive(serde::Serialize)]
struct Message<'a> {
    token: &'a str,
    notification: &'a NotificationPayload,
}

#[derive(serde::Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}
