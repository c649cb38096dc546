use once_cell::sync::Lazy;
use regex::Regex;

/// Deliberately loose: `local@domain.tld`, no whitespace, exactly one `@`
/// before the domain. U+FEFF is not in Rust's `\s`, so it is listed
/// explicitly.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@\x{FEFF}]+@[^\s@\x{FEFF}]+\.[^\s@\x{FEFF}]+$")
        .expect("email pattern must compile")
});

/// RFC 5321 limit, in characters
const MAX_LENGTH: usize = 254;

/// Strip surrounding whitespace, including byte order marks pasted along
/// with an address.
pub fn trim_input(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A syntactically valid, normalized (trimmed, lower-cased) email address. Used
/// for senders and recipients alike, and as the dedup key of the fallback
/// store.
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: &str) -> Result<Self, String> {
        let trimmed = trim_input(email);
        match trimmed.chars().count() <= MAX_LENGTH && EMAIL_PATTERN.is_match(trimmed) {
            true => Ok(Self(trimmed.to_lowercase())),
            false => Err(format!("Invalid email: {email:?}")),
        }
    }

    /// Everything before the `@`
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// Everything after the first `@`; safe to log, unlike the full address
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
