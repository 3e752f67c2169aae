use std::net::SocketAddr;

use timetable_server::searchch::{ClientConfig, FixtureTransport, TimetableClient, Transport};
use timetable_server::web::{AppState, create_router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_LOG_FILTER: &str = "timetable_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind = std::env::var("TIMETABLE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let addr: SocketAddr = match bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(%bind, "invalid TIMETABLE_BIND: {e}");
            std::process::exit(1);
        }
    };

    let mut config = ClientConfig::new();
    if let Ok(base_url) = std::env::var("TIMETABLE_BASE_URL") {
        config = config.with_base_url(base_url);
    }

    // Fixtures take precedence over the live API.
    if let Ok(dir) = std::env::var("TIMETABLE_FIXTURES") {
        match FixtureTransport::from_dir(&dir) {
            Ok(transport) => {
                info!(%dir, endpoints = ?transport.endpoints(), "serving fixtures");
                serve(TimetableClient::with_transport(config, transport), addr).await;
            }
            Err(e) => {
                error!("Failed to load fixtures: {e}");
                std::process::exit(1);
            }
        }
    } else {
        info!(base_url = %config.base_url, "using live timetable API");
        match TimetableClient::new(config) {
            Ok(client) => serve(client, addr).await,
            Err(e) => {
                error!("Failed to create timetable client: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn serve<T: Transport>(client: TimetableClient<T>, addr: SocketAddr) {
    let app = create_router(AppState::new(client));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "failed to bind: {e}");
            std::process::exit(1);
        }
    };

    info!("Timetable server listening on http://{addr}");
    info!("  GET /health");
    info!("  GET /api/locations?q=");
    info!("  GET /api/locations/nearby?lat=&lon=");
    info!("  GET /api/trips?from=&to=");
    info!("  GET /api/trips/more?context=");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        std::process::exit(1);
    }
}
