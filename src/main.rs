use subscription_intake::configuration::get_configuration;
use subscription_intake::startup::Application;
use subscription_intake::telemetry::get_subscriber;
use subscription_intake::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the subscription handler
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // only logs at the specified level and higher are emitted; override
    // with RUST_LOG
    let subscriber = get_subscriber("subscription-intake", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration()?;
    let app = Application::build(cfg).await?;
    tracing::info!(port = app.get_port(), "listening");
    app.run_until_stopped().await?;
    Ok(())
}
