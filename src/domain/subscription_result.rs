use serde::Deserialize;
use serde::Serialize;

/// Normalized outcome of a subscription attempt, as returned by the handler.
///
/// On the wire this is a flat object discriminated by `success`:
///
/// ```json
/// {"success": true, "message": "...", "messageId": "..."}
/// {"success": false, "error": "..."}
/// ```
///
/// Being an enum, a result can never carry both a message and an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireResult", try_from = "WireResult")]
pub enum SubscriptionResult {
    Success {
        message: String,
        /// Opaque id assigned by the mail sender; diagnostics only
        message_id: String,
    },
    Failure {
        error: String,
    },
}

impl SubscriptionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool { matches!(self, Self::Success { .. }) }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<SubscriptionResult> for WireResult {
    fn from(value: SubscriptionResult) -> Self {
        match value {
            SubscriptionResult::Success {
                message,
                message_id,
            } => Self {
                success: true,
                message: Some(message),
                message_id: Some(message_id),
                error: None,
            },
            SubscriptionResult::Failure { error } => Self {
                success: false,
                message: None,
                message_id: None,
                error: Some(error),
            },
        }
    }
}

// missing text fields decode as empty strings; it is up to the reader to
// substitute its own wording
impl TryFrom<WireResult> for SubscriptionResult {
    type Error = String;
    fn try_from(value: WireResult) -> Result<Self, Self::Error> {
        match (value.success, value.error) {
            (true, Some(_)) => Err("successful result carries an error".to_string()),
            (true, None) => Ok(Self::Success {
                message: value.message.unwrap_or_default(),
                message_id: value.message_id.unwrap_or_default(),
            }),
            (false, error) => Ok(Self::Failure {
                error: error.unwrap_or_default(),
            }),
        }
    }
}
