mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod rate_limit;
mod response;
mod validation;

use app::build_router;
use config::Config;
use rate_limit::{RateLimitConfig, RateLimiter};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub async fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new(
            "info,securevault_auth=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging().await;
    tracing::info!("Starting securevault-auth...");

    let config = Config::from_env()?;
    tracing::info!("Running in {} mode", config.environment.as_str());

    // Le pool global lit DATABASE_URL; on y propage l'URL résolue par la
    // config pour que le chemin composé depuis POSTGRES_* fonctionne aussi.
    // Doit se faire avant le premier accès au pool.
    unsafe {
        std::env::set_var("DATABASE_URL", &config.database_url);
    }

    let jwt_manager = auth::jwt::JwtManager::new(&config.jwt_secret, config.jwt_expiration_hours);
    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        per_minute: config.rate_limit_per_minute,
        per_hour: config.rate_limit_per_hour,
    }));

    let app = build_router(jwt_manager, rate_limiter);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
