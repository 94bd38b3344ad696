use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use directory_api::{router, AppState};
use directory_core::repositories::MenuRepository;
use directory_core::services::{MenuCache, MenuService};
use directory_infrastructure::database::connection;
use directory_infrastructure::{InMemoryMenuRepository, PgMenuRepository};
use directory_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes file logs on shutdown
    let _log_guard = directory_shared::telemetry::init_telemetry(&config.telemetry)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    // Connect to the menu store
    let menu_repo: Arc<dyn MenuRepository> = match &config.database.url {
        Some(url) => {
            info!("Connecting to database...");
            let pool = connection::create_pool(url, &config.database).await?;
            if config.database.run_migrations {
                connection::run_migrations(&pool).await?;
            }
            info!("Database connection established.");
            Arc::new(PgMenuRepository::new(pool))
        }
        None => {
            if config.is_production() {
                error!("DATABASE__URL is required in production");
                std::process::exit(1);
            }
            warn!("No database configured, menus are kept in memory only");
            Arc::new(InMemoryMenuRepository::new())
        }
    };

    // One cache per process, shared by every request handler
    let menu_cache = Arc::new(MenuCache::new(config.menu_cache.ttl()));
    let menu_service = Arc::new(MenuService::new(menu_repo, menu_cache));

    // Build router
    let app = router(AppState::new(menu_service)).layer(
        CorsLayer::new()
            .allow_origin("http://localhost:5173".parse::<HeaderValue>()?)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
