use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use rent_gateway::config::Settings;
use rent_gateway::routes::{self, handle_query_payload_error, AppState, StaticFiles};
use rent_gateway::services::{Mailer, PlacesClient, ValuationClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is not configured yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting rent gateway...");

    let places = PlacesClient::new(&settings.places).map_err(|e| {
        error!("Failed to create Places client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let valuation = ValuationClient::new(&settings.valuation).map_err(|e| {
        error!("Failed to create valuation client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    // Credentials are checked per request so the rest of the API works without them
    if settings.email.host.is_none() || settings.email.sender_address.is_none() {
        tracing::warn!("Email is not fully configured, /api/send-email will fail until it is");
    }

    let app_state = AppState {
        places: Arc::new(places),
        valuation: Arc::new(valuation),
        mailer: Arc::new(Mailer::smtp(settings.email.clone())),
    };

    let static_files = web::Data::new(StaticFiles::new(&settings.static_files));
    info!("Serving front-end from {}", settings.static_files.root);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(static_files.clone())
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}
