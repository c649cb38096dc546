use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;

use super::error_chain_fmt;
use crate::domain::NewSubscriber;
use crate::domain::Rejection;
use crate::domain::RequestBodyError;
use crate::domain::SubscriptionRequest;
use crate::domain::SubscriptionResult;
use crate::email_client::DispatchError;
use crate::email_client::EmailClient;
use crate::email_client::Tag;
use crate::welcome_email;
use crate::welcome_email::WelcomeEmail;

pub const CONFIRMATION_MESSAGE: &str =
    "Subscription confirmed! Please check your email for confirmation.";

const SUBSCRIPTION_TAG: Tag = Tag {
    name: "newsletter",
    value: "subscription",
};

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Invalid request body")]
    Body(#[source] RequestBodyError),
    #[error("Email address is required")]
    MissingEmail,
    #[error("Invalid email address format")]
    InvalidEmail,
    #[error("Failed to send welcome email")]
    Dispatch(#[source] DispatchError),
}

impl From<Rejection> for SubscribeError {
    fn from(value: Rejection) -> Self {
        match value {
            Rejection::MissingEmail => Self::MissingEmail,
            Rejection::InvalidEmail => Self::InvalidEmail,
        }
    }
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SubscribeError {
    /// What the caller gets to see. Dispatch failures are reduced to a fixed
    /// wording per category; the mail API's own text only goes to the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Body(_) => "Invalid request body",
            Self::MissingEmail => "Email address is required",
            Self::InvalidEmail => "Invalid email address format",
            Self::Dispatch(DispatchError::MessageRejected(_)) => {
                "Invalid email address. Please check and try again."
            }
            Self::Dispatch(DispatchError::DomainNotVerified(_)) => {
                "Service temporarily unavailable. Please try again later."
            }
            Self::Dispatch(DispatchError::ConfigurationMissing(_)) => {
                "Service configuration error. Please contact support."
            }
            Self::Dispatch(DispatchError::Unexpected(_)) => {
                "Failed to process subscription. Please try again later."
            }
        }
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Body(_) | Self::MissingEmail | Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(SubscriptionResult::failure(self.user_message()))
    }
}

/// `OPTIONS /subscribe`
///
/// CORS preflight: no validation, no side effects. The CORS headers
/// themselves are added to every response by the `DefaultHeaders`
/// middleware (see `startup::run`).
pub async fn preflight() -> HttpResponse { HttpResponse::Ok().finish() }

/// `POST /subscribe`
///
/// Validates the body, then dispatches a welcome email. Nothing is stored.
///
/// ```sh
///     curl -v --json '{"email":"john@foo.com"}' http://127.0.0.1:8000/subscribe
/// ```
///
/// The body is taken as raw bytes rather than `web::Json`, because some
/// proxies wrap the JSON object in a JSON string, and because extractor
/// failures would bypass our response shape.
#[tracing::instrument(
    name = "Adding new subscriber",
    skip(body, email_client),
    fields(
        // the address itself is never recorded
        subscriber_domain = tracing::field::Empty,
        message_id = tracing::field::Empty,
    )
)]
pub async fn subscribe(
    body: web::Bytes,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_sub: NewSubscriber = SubscriptionRequest::from_body(&body)
        .map_err(SubscribeError::Body)?
        .validate()?;
    tracing::Span::current().record("subscriber_domain", new_sub.email.domain());

    let message_id = send_welcome_email(&email_client, &new_sub)
        .await
        .map_err(|e| {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "failed to dispatch welcome email"
            );
            SubscribeError::Dispatch(e)
        })?;
    tracing::Span::current().record("message_id", message_id.as_str());
    tracing::info!("welcome email sent");

    Ok(HttpResponse::Ok().json(SubscriptionResult::Success {
        message: CONFIRMATION_MESSAGE.to_string(),
        message_id,
    }))
}

#[tracing::instrument(name = "Sending welcome email to new subscriber", skip_all)]
async fn send_welcome_email(
    email_client: &EmailClient,
    new_sub: &NewSubscriber,
) -> Result<String, DispatchError> {
    let body = WelcomeEmail::render(&new_sub.name);
    email_client
        .send_email(
            &new_sub.email,
            welcome_email::SUBJECT,
            &body.html,
            &body.text,
            SUBSCRIPTION_TAG,
        )
        .await
}
