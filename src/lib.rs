//! Subscription intake for the TranquilMindQuest newsletter.
//!
//! Three pieces share this crate:
//!
//! - the subscription handler (`routes`, `startup`): a stateless
//!   `POST /subscribe` endpoint that validates an email and dispatches a
//!   welcome email through the mail API (`email_client`)
//! - the client widget (`widget`): form logic that calls the handler and
//!   degrades gracefully when it cannot
//! - the local fallback store (`fallback_store`): a deduplicated, best-effort
//!   list of subscribers kept on the client side
//!
//! Alongside them, `chatbot` answers `POST /chatbot` with scripted replies.
pub mod chatbot;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod fallback_store;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod welcome_email;
pub mod widget;
