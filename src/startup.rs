use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::CorsSettings;
use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::routes::chatbot;
use crate::routes::health_check;
use crate::routes::preflight;
use crate::routes::subscribe;

pub const ALLOW_HEADERS: &str = "Content-Type,Authorization";
pub const ALLOW_METHODS: &str = "OPTIONS,POST,GET";

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build the email client; the server does not
    /// start until `run_until_stopped` is awaited.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // port 0 means the OS picked one; this is what we report back
        let port = listener.local_addr()?.port();

        let email_client = cfg
            .email_client
            .client()
            .map_err(|e| anyhow::anyhow!("invalid email client settings: {e}"))?;

        let server = run(listener, email_client, cfg.cors)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    cors: CorsSettings,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc` internally; every worker gets a cheap clone
    let email_client = web::Data::new(email_client);

    // actix spins up one worker per core, each running this closure, hence
    // the clones
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            // every response, including errors and preflights, must be
            // readable by the widget cross-origin
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", cors.allowed_origin.clone()))
                    .add(("Access-Control-Allow-Headers", ALLOW_HEADERS))
                    .add(("Access-Control-Allow-Methods", ALLOW_METHODS)),
            )
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/subscribe")
                    .route(web::post().to(subscribe))
                    .route(web::method(Method::OPTIONS).to(preflight)),
            )
            .service(
                web::resource("/chatbot")
                    .route(web::post().to(chatbot))
                    .route(web::method(Method::OPTIONS).to(preflight)),
            )
            .app_data(email_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
