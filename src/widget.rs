use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use reqwest::Client;
use tokio::sync::watch;

use crate::configuration::WidgetSettings;
use crate::domain::trim_input;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionRequest;
use crate::domain::SubscriptionResult;
use crate::fallback_store::FallbackStore;
use crate::fallback_store::Storage;

pub const RATE_LIMITED: &str = "Please wait before submitting again.";
pub const EMAIL_REQUIRED: &str = "Please enter your email address.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const FIELD_REQUIRED: &str = "This field is required";
pub const FIELD_INVALID: &str = "Please enter a valid email address";
pub const CONFIRMED: &str = "Thank you for subscribing! Please check your email for confirmation.";
pub const SAVED_FOR_LATER: &str = "Thank you for subscribing! We'll send you updates soon.";
pub const SAVED_LOCALLY: &str =
    "Thank you for subscribing! You will receive our weekly wellness updates.";
pub const REJECTED: &str = "Subscription failed. Please try again.";

const SUBMIT_LABEL: &str = "Subscribe";
const BUSY_LABEL: &str = "Subscribing...";

/// The request never produced a usable `SubscriptionResult`
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("could not connect")]
    Connect(#[source] reqwest::Error),
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    #[error("malformed response")]
    Malformed(#[source] serde_json::Error),
}

impl From<reqwest::Error> for ConnectivityError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Transport(e)
        }
    }
}

impl ConnectivityError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "Request timed out. Please try again.",
            Self::Connect(_) => {
                "Unable to connect. Please check your internet connection and try again."
            }
            Self::Transport(_) | Self::Malformed(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Talks to `POST /subscribe`.
pub struct SubscriptionClient {
    http_client: Client,
    endpoint: String,
}

impl SubscriptionClient {
    pub fn new(
        endpoint: String,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build http client");
        Self {
            http_client,
            endpoint,
        }
    }

    /// Any response whose body decodes as a `SubscriptionResult` is a result,
    /// whatever its status code; 400s and 500s carry `success: false`.
    #[tracing::instrument(name = "Calling subscription endpoint", skip_all, err)]
    pub async fn subscribe(
        &self,
        email: &str,
    ) -> Result<SubscriptionResult, ConnectivityError> {
        let body = self
            .http_client
            .post(&self.endpoint)
            .json(&SubscriptionRequest::new(email))
            .send()
            .await?
            .bytes()
            .await?;
        serde_json::from_slice(&body).map_err(ConnectivityError::Malformed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A toast shown to the visitor after an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(
        level: NoticeLevel,
        message: &str,
    ) -> Self {
        Self {
            level,
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitControl {
    pub disabled: bool,
    pub label: String,
}

impl SubmitControl {
    fn idle() -> Self {
        Self {
            disabled: false,
            label: SUBMIT_LABEL.to_string(),
        }
    }

    fn busy() -> Self {
        Self {
            disabled: true,
            label: BUSY_LABEL.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormState {
    pub email: String,
    /// Inline error next to the email field
    pub field_error: Option<String>,
    pub submit: SubmitControl,
}

pub enum WidgetEvent {
    EmailInput(String),
    Submit,
}

/// One newsletter form. All mutable state (form contents, last submission
/// time) lives here, so several widgets on a page do not interfere.
///
/// `submit` borrows the widget mutably across the network call, so a second
/// submission cannot start while one is in flight. The form state is
/// published on a `watch` channel; renderers hold a receiver from
/// `watch_form` and see the busy submit control while the call is pending.
pub struct SubscriptionWidget<S> {
    /// `None` if no remote endpoint is configured
    client: Option<SubscriptionClient>,
    store: FallbackStore<S>,
    use_fallback: bool,
    min_interval: chrono::Duration,
    last_submission: Option<DateTime<Utc>>,
    form: watch::Sender<FormState>,
}

impl<S: Storage> SubscriptionWidget<S> {
    pub fn new(
        settings: &WidgetSettings,
        storage: S,
    ) -> Self {
        let client = settings
            .endpoint()
            .map(|url| SubscriptionClient::new(url.to_string(), settings.timeout()));
        let (form, _) = watch::channel(FormState {
            email: String::new(),
            field_error: None,
            submit: SubmitControl::idle(),
        });
        Self {
            client,
            store: FallbackStore::new(storage),
            use_fallback: settings.use_fallback,
            min_interval: settings.min_submission_interval(),
            last_submission: None,
            form,
        }
    }

    /// Snapshot of the current form state
    pub fn form(&self) -> FormState { self.form.borrow().clone() }

    pub fn watch_form(&self) -> watch::Receiver<FormState> { self.form.subscribe() }

    pub fn store(&self) -> &FallbackStore<S> { &self.store }

    pub async fn handle(
        &mut self,
        event: WidgetEvent,
    ) -> Option<Notice> {
        match event {
            WidgetEvent::EmailInput(value) => {
                self.form.send_modify(|form| {
                    form.email = value;
                    form.field_error = None;
                });
                None
            }
            WidgetEvent::Submit => Some(self.submit().await),
        }
    }

    pub async fn submit(&mut self) -> Notice { self.submit_at(Utc::now()).await }

    /// Invalid input and rate-limited attempts never reach the network.
    /// Attempts rejected as invalid still count towards the rate limit.
    pub async fn submit_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Notice {
        if let Some(last) = self.last_submission {
            if now - last < self.min_interval {
                return Notice::new(NoticeLevel::Warning, RATE_LIMITED);
            }
        }
        self.last_submission = Some(now);
        self.form.send_modify(|form| form.field_error = None);

        let raw = trim_input(&self.form.borrow().email).to_string();
        if raw.is_empty() {
            self.set_field_error(FIELD_REQUIRED);
            return Notice::new(NoticeLevel::Error, EMAIL_REQUIRED);
        }
        let Ok(email) = SubscriberEmail::parse(&raw) else {
            self.set_field_error(FIELD_INVALID);
            return Notice::new(NoticeLevel::Error, EMAIL_INVALID);
        };

        let outcome = match &self.client {
            None => None,
            Some(client) => {
                self.form.send_modify(|form| form.submit = SubmitControl::busy());
                Some(client.subscribe(&raw).await)
            }
        };
        self.form.send_modify(|form| form.submit = SubmitControl::idle());

        match outcome {
            None => {
                self.save_locally(&email);
                self.reset();
                Notice::new(NoticeLevel::Success, SAVED_LOCALLY)
            }
            Some(Ok(SubscriptionResult::Success { message, .. })) => {
                // kept as a local backup regardless
                self.save_locally(&email);
                self.reset();
                Notice::new(NoticeLevel::Success, non_empty_or(&message, CONFIRMED))
            }
            Some(Ok(SubscriptionResult::Failure { error })) => {
                tracing::warn!(error.message = %error, "subscription rejected by server");
                self.fall_back_or(&email, non_empty_or(&error, REJECTED))
            }
            Some(Err(e)) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "subscription request failed"
                );
                self.fall_back_or(&email, e.user_message())
            }
        }
    }

    /// With fallback enabled the visitor is never told the remote call
    /// failed.
    fn fall_back_or(
        &mut self,
        email: &SubscriberEmail,
        error: &str,
    ) -> Notice {
        if self.use_fallback {
            self.save_locally(email);
            self.reset();
            Notice::new(NoticeLevel::Success, SAVED_FOR_LATER)
        } else {
            Notice::new(NoticeLevel::Error, error)
        }
    }

    /// Storage failures must not break the submission flow
    fn save_locally(
        &self,
        email: &SubscriberEmail,
    ) {
        if let Err(e) = self.store.upsert(email) {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "failed to save subscription locally"
            );
        }
    }

    fn set_field_error(
        &self,
        message: &str,
    ) {
        self.form
            .send_modify(|form| form.field_error = Some(message.to_string()));
    }

    fn reset(&mut self) {
        self.form.send_modify(|form| {
            form.email.clear();
            form.field_error = None;
        });
    }
}

fn non_empty_or<'a>(
    value: &'a str,
    default: &'a str,
) -> &'a str {
    match value.trim().is_empty() {
        true => default,
        false => value,
    }
}
