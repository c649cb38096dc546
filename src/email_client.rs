use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::SubscriberEmail;

/// Client for the transactional mail API.
///
/// Establishing a HTTP connection is expensive, so a single `EmailClient`
/// (and the `reqwest::Client` connection pool inside it) is built at startup
/// and shared by all handlers.
#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    reply_to: SubscriberEmail,
    authorization_token: Secret<String>,
}

/// Categorization tag attached to every message
#[derive(Clone, Copy, Debug)]
pub struct Tag {
    pub name: &'static str,
    pub value: &'static str,
}

/// Failure categories reported by the mail API. The `String` payloads hold
/// the API's own message, which is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("destination rejected: {0}")]
    MessageRejected(String),
    #[error("sending domain not verified: {0}")]
    DomainNotVerified(String),
    #[error("send configuration missing: {0}")]
    ConfigurationMissing(String),
    #[error("mail API failure")]
    Unexpected(#[source] anyhow::Error),
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    reply_to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    tags: [TagBody<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TagBody<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    message_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    code: String,
    #[serde(default)]
    message: String,
}

impl From<ApiError> for DispatchError {
    fn from(e: ApiError) -> Self {
        match e.code.as_str() {
            "MessageRejected" => Self::MessageRejected(e.message),
            "MailFromDomainNotVerifiedException" => Self::DomainNotVerified(e.message),
            "ConfigurationSetDoesNotExistException" => Self::ConfigurationMissing(e.message),
            code => Self::Unexpected(anyhow::anyhow!("{code}: {}", e.message)),
        }
    }
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: SubscriberEmail,
        reply_to: SubscriberEmail,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            // only fails if the TLS backend cannot be initialised
            .expect("failed to build http client");
        Self {
            http_client,
            base_url,
            sender,
            reply_to,
            authorization_token,
        }
    }

    /// Send a single message; returns the id the mail API assigned to it.
    ///
    /// No retries are attempted here.
    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
        tag: Tag,
    ) -> Result<String, DispatchError> {
        let url = format!("{}/email", self.base_url.trim_end_matches('/'));
        let body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            reply_to: self.reply_to.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
            tags: [TagBody {
                name: tag.name,
                value: tag.value,
            }],
        };

        let resp = self
            .http_client
            .post(&url)
            .header(
                "X-Mail-Api-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Unexpected(e.into()))?;

        let status = resp.status();
        if status.is_success() {
            let sent: SendEmailResponse = resp
                .json()
                .await
                .map_err(|e| DispatchError::Unexpected(e.into()))?;
            return Ok(sent.message_id);
        }

        // error bodies are best-effort; an unparseable one is still a failure
        let text = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiError>(&text) {
            Ok(api_error) => Err(api_error.into()),
            Err(_) => Err(DispatchError::Unexpected(anyhow::anyhow!(
                "mail API returned {status}: {text}"
            ))),
        }
    }
}
