use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use super::NewSubscriber;
use super::SubscriberEmail;
use super::SubscriberName;
use super::trim_input;

/// Body of `POST /subscribe`, as sent by the widget.
///
/// Fields of the wrong JSON type are treated as absent rather than failing
/// deserialization, so that `{"email": 42}` is reported as a missing email.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SubscriptionRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestBodyError {
    #[error("request body is not valid JSON")]
    Malformed(#[from] serde_json::Error),
    #[error("request body is not a JSON object")]
    NotAnObject,
}

/// Why a well-formed request was still rejected
#[derive(Debug, PartialEq, Eq)]
pub enum Rejection {
    MissingEmail,
    InvalidEmail,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl SubscriptionRequest {
    pub fn new(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            name: None,
        }
    }

    /// Decode a raw body. Proxies may hand the body over either as a JSON
    /// object or as a JSON string containing the encoded object; both are
    /// accepted, as is an empty body (equivalent to `{}`).
    pub fn from_body(body: &[u8]) -> Result<Self, RequestBodyError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            Value::Null => Ok(Self::default()),
            Value::String(inner) => match serde_json::from_str::<Value>(&inner)? {
                obj @ Value::Object(_) => Ok(serde_json::from_value(obj)?),
                Value::Null => Ok(Self::default()),
                _ => Err(RequestBodyError::NotAnObject),
            },
            obj @ Value::Object(_) => Ok(serde_json::from_value(obj)?),
            _ => Err(RequestBodyError::NotAnObject),
        }
    }

    /// Validation order matters: a blank email is "missing", not "invalid".
    pub fn validate(self) -> Result<NewSubscriber, Rejection> {
        let raw = self
            .email
            .filter(|e| !trim_input(e).is_empty())
            .ok_or(Rejection::MissingEmail)?;
        let email = SubscriberEmail::parse(&raw).map_err(|_| Rejection::InvalidEmail)?;
        let name = SubscriberName::display_name(self.name.as_deref(), &email);
        Ok(NewSubscriber { email, name })
    }
}
