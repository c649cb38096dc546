use unicode_segmentation::UnicodeSegmentation;

use super::SubscriberEmail;

const MAX_GRAPHEMES: usize = 256;

/// The name used to greet a subscriber. Never empty.
///
/// Names are not validated: anything the visitor typed is accepted, trimmed
/// and truncated to 256 graphemes. Escaping is the renderer's job (see
/// `crate::welcome_email`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriberName(String);

impl SubscriberName {
    /// Use `name` if it has any non-whitespace content, otherwise fall back
    /// to the local part of `email`.
    pub fn display_name(
        name: Option<&str>,
        email: &SubscriberEmail,
    ) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.local_part());
        Self(name.graphemes(true).take(MAX_GRAPHEMES).collect())
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str { &self.0 }
}
