use once_cell::sync::Lazy;
use serde_json::json;
use serde_json::Value;
use subscription_intake::configuration::get_configuration;
use subscription_intake::configuration::Settings;
use subscription_intake::configuration::WidgetSettings;
use subscription_intake::fallback_store::MemoryStorage;
use subscription_intake::startup::Application;
use subscription_intake::telemetry::get_subscriber;
use subscription_intake::telemetry::init_subscriber;
use subscription_intake::widget::SubscriptionWidget;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

pub const TEST_ORIGIN: &str = "https://tranquilmindquest.com";

/// Init the tracing subscriber once only.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different types, hence the duplicated arms
    match std::env::var("TEST_LOG") {
        Ok(_) => init_subscriber(get_subscriber("test", "debug", std::io::stdout)),
        Err(_) => init_subscriber(get_subscriber("test", "debug", std::io::sink)),
    }
});

pub struct TestApp {
    /// `http://127.0.0.1:{port}`
    pub addr: String,
    /// Stands in for the mail API
    pub email_server: MockServer,
    pub cfg: Settings,
}

impl TestApp {
    pub fn subscribe_url(&self) -> String { format!("{}/subscribe", self.addr) }

    pub async fn post_subscribe(
        &self,
        body: impl Into<reqwest::Body>,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(self.subscribe_url())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("execute request")
    }

    pub async fn post_subscribe_json(
        &self,
        body: Value,
    ) -> reqwest::Response {
        self.post_subscribe(body.to_string()).await
    }

    pub async fn post_chatbot(
        &self,
        body: Value,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/chatbot", self.addr))
            .json(&body)
            .send()
            .await
            .expect("execute request")
    }

    /// Make the mail API accept every message, assigning `message_id`
    pub async fn mail_api_accepts(
        &self,
        message_id: &str,
    ) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"MessageId": message_id})))
            .mount(&self.email_server)
            .await;
    }

    /// Widget pointed at this app, with in-memory storage
    pub fn widget(
        &self,
        use_fallback: bool,
    ) -> SubscriptionWidget<MemoryStorage> {
        let settings = WidgetSettings {
            api_endpoint: Some(self.subscribe_url()),
            use_fallback,
            ..self.cfg.widget.clone()
        };
        SubscriptionWidget::new(&settings, MemoryStorage::default())
    }
}

/// Spawn the app on a random port, with the mail API mocked.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let cfg = {
        let mut c = get_configuration().expect("failed to read configuration");
        // port 0: the OS picks a free port, reported back by `get_port`
        c.application.host = "127.0.0.1".to_string();
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c.cors.allowed_origin = TEST_ORIGIN.to_string();
        c
    };

    let app = Application::build(cfg.clone())
        .await
        .expect("failed to build application");
    let addr = format!("http://127.0.0.1:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        email_server,
        cfg,
    }
}
