//! Templatehub server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, http::HeaderValue, middleware};
use templatehub_api::{middleware::AppState, router as api_router};
use templatehub_common::{Config, LocalStorage, StorageService};
use templatehub_core::{
    CatalogService, HttpPaymentGateway, IdentityService, MediaService, OrderService,
    PaymentService, ReviewService,
};
use templatehub_db::repositories::{
    ListingImageRepository, ListingRepository, OrderRepository, ReviewRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Maximum request body size; image uploads are the only large payloads.
const MAX_BODY_BYTES: usize = 50_000_000;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Environment first, so config can read .env values
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "templatehub=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting templatehub server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = templatehub_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    templatehub_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let listing_repo = ListingRepository::new(Arc::clone(&db));
    let image_repo = ListingImageRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));

    // Object storage for listing images
    let storage: StorageService = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.base_path),
        config.storage.base_url.clone(),
    ));

    // Payment gateway client
    let payment: PaymentService = Arc::new(HttpPaymentGateway::new(&config.payment));

    // Initialize services
    let identity_service = IdentityService::new(user_repo.clone(), config.auth.clone());
    let catalog_service = CatalogService::new(
        listing_repo.clone(),
        image_repo.clone(),
        review_repo.clone(),
        user_repo.clone(),
    );
    let media_service = MediaService::new(listing_repo.clone(), image_repo.clone(), storage);
    let order_service = OrderService::new(
        order_repo,
        listing_repo,
        image_repo,
        user_repo,
        payment,
        &config.payment,
    );
    let review_service = ReviewService::new(
        review_repo,
        OrderRepository::new(Arc::clone(&db)),
        UserRepository::new(Arc::clone(&db)),
    );

    // Create app state
    let state = AppState {
        identity_service,
        catalog_service,
        media_service,
        order_service,
        review_service,
        auth: config.auth.clone(),
    };

    // CORS: configured origin list, or permissive when none is configured
    let cors = if config.server.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            templatehub_api::middleware::auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
