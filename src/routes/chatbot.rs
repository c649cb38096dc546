use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde_json::json;

use super::error_chain_fmt;
use crate::chatbot::sanitize_input;
use crate::chatbot::ChatReply;
use crate::chatbot::ChatRequest;
use crate::chatbot::MAX_MESSAGE_LENGTH;
use crate::domain::Intent;

#[derive(thiserror::Error)]
pub enum ChatError {
    #[error("Invalid request body")]
    Body(#[source] serde_json::Error),
    #[error("Message is required")]
    MissingMessage,
    #[error("Message is too long")]
    TooLong,
}

impl std::fmt::Debug for ChatError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode { StatusCode::BAD_REQUEST }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// `POST /chatbot`
///
/// ```sh
///     curl --json '{"message":"I feel anxious"}' http://127.0.0.1:8000/chatbot
/// ```
///
/// Responds with `{"intent": "...", "reply": "..."}`. The message itself is
/// only logged after `sanitize_input`.
#[tracing::instrument(
    name = "Answering chatbot message",
    skip(body),
    fields(intent = tracing::field::Empty)
)]
pub async fn chatbot(body: web::Bytes) -> Result<HttpResponse, ChatError> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(ChatError::Body)?;
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(ChatError::MissingMessage)?;
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ChatError::TooLong);
    }

    let reply = ChatReply::to(message);
    tracing::Span::current().record("intent", tracing::field::debug(&reply.intent));
    tracing::info!(excerpt = %sanitize_input(message), "chatbot message");
    if reply.intent == Intent::Crisis {
        tracing::warn!("crisis intent detected");
    }

    Ok(HttpResponse::Ok().json(reply))
}
