// src/app.rs

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::jwt::JwtManager;
use crate::auth::services::AuthService;
use crate::handlers::auth::{change_password, login, logout, register, verify_token};
use crate::handlers::health::health;
use crate::rate_limit::{self, RateLimiter};

/// Configure les routes d'authentification
pub fn auth_routes(auth_service: Arc<AuthService>, jwt_manager: JwtManager) -> Router {
    // Public endpoints (state: AuthService)
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(auth_service.clone());

    // Protected endpoints (state: JwtManager) using AuthClaims
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/verify-token", post(verify_token))
        .route("/change-password", post(change_password))
        .with_state(jwt_manager)
        .layer(axum::extract::Extension(auth_service));

    public.merge(protected)
}

/// Construit l'application complète. Le limiteur de débit est possédé par
/// l'appelant et partagé avec le middleware — pas d'état global.
pub fn build_router(jwt_manager: JwtManager, rate_limiter: Arc<RateLimiter>) -> Router {
    let auth_service = Arc::new(AuthService::new(jwt_manager.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(auth_service, jwt_manager))
        // Limite de débit en amont de toutes les routes
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit::enforce,
        ))
        .layer(CorsLayer::permissive())
        // Middleware global de tracing
        .layer(TraceLayer::new_for_http())
}
