//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;

use auth::{AuthConfig, PgAccountRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::config::Env;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = Env::process();

    // Auth configuration
    let auth_config = match AuthConfig::from_env(&env) {
        Ok(config) => config,
        // Local runs may skip the secrets; tokens then die with the process
        Err(e) if cfg!(debug_assertions) => {
            tracing::warn!(error = %e, "Auth config incomplete, using development defaults");
            AuthConfig::development()
        }
        Err(e) => return Err(e.into()),
    };

    // Database connection
    let database_url = env.required("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(env.parsed_or("DATABASE_MAX_CONNECTIONS", 5)?)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // CORS configuration
    let frontend_origins = env
        .optional("FRONTEND_ORIGINS")
        .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(PgAccountRepository::new(pool), auth_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env.parsed_or("BIND_ADDR", DEFAULT_BIND_ADDR.parse()?)?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
