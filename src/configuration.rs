use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;

/// Global configuration, loaded from `configuration/*.yaml`. See
/// `get_configuration`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub cors: CorsSettings,
    pub widget: WidgetSettings,
}

/// Server configuration
#[derive(Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    /// Port for the server; 0 lets the OS pick one (tests)
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Transactional mail API used to dispatch welcome emails
#[derive(Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub reply_to_email: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(&self.sender_email)
    }

    pub fn reply_to(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(&self.reply_to_email)
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    /// Fails if either configured address is not a valid email.
    pub fn client(self) -> Result<EmailClient, String> {
        let sender = self.sender()?;
        let reply_to = self.reply_to()?;
        let timeout = self.timeout();
        Ok(EmailClient::new(
            self.base_url,
            sender,
            reply_to,
            self.authorization_token,
            timeout,
        ))
    }
}

#[derive(Clone, Deserialize)]
pub struct CorsSettings {
    /// Value of `Access-Control-Allow-Origin`
    #[serde(default = "any_origin")]
    pub allowed_origin: String,
}

fn any_origin() -> String { "*".to_string() }

/// Settings consumed by the client-side subscription widget (see
/// `crate::widget`), not by the server.
#[derive(Clone, Deserialize)]
pub struct WidgetSettings {
    /// Remote subscription endpoint. Absent, blank and placeholder urls all
    /// mean "not configured".
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// Fall back to local persistence if the remote call fails
    pub use_fallback: bool,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,

    /// u32 so that the conversion to a signed duration is lossless
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_submission_interval_milliseconds: u32,

    /// Directory backing the local fallback store
    pub storage_dir: PathBuf,
}

/// Deployment templates ship with this marker in place of the real api id.
const PLACEHOLDER_MARKER: &str = "YOUR_API_ID";

impl WidgetSettings {
    pub fn endpoint(&self) -> Option<&str> {
        self.api_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && !url.contains(PLACEHOLDER_MARKER))
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    pub fn min_submission_interval(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::from(self.min_submission_interval_milliseconds))
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// override with `APP_`-prefixed env vars.
///
/// All required fields must be present, otherwise initialisation fails
/// immediately and the server does not start.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, `serde-aux` is required to parse other
            // types.
            //
            // `APP_APPLICATION__PORT=5001` -> `Settings.application.port`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
