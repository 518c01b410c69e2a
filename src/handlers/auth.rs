// src/handlers/auth.rs

use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

use crate::auth::extractors::AuthClaims;
use crate::auth::services::{AuthService, ClientInfo};
use crate::error::AppError;
use crate::response::AppResponse;
use securevault_api::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, VerifyTokenResponse,
};

/// Le hachage Argon2 est volontairement coûteux: les opérations qui hachent
/// ou vérifient un mot de passe partent sur le pool bloquant pour ne pas
/// geler les workers async.
async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {e}")))?
}

/// POST /auth/register
/// Inscription d'un nouvel utilisateur
pub async fn register(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<AppResponse<RegisterResponse>, AppError> {
    let client = ClientInfo::from_headers(&headers);

    let response = run_blocking(move || auth_service.register(&payload, &client)).await?;
    Ok(AppResponse::created(response))
}

/// POST /auth/login
/// Connexion d'un utilisateur
pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let client = ClientInfo::from_headers(&headers);

    let response = run_blocking(move || auth_service.login(&payload, &client)).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /auth/logout
/// Révoque la session embarquée dans le bearer token (idempotent)
pub async fn logout(
    claims: AuthClaims,
    Extension(auth_service): Extension<Arc<AuthService>>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    let response = auth_service.logout(&claims)?;
    Ok(AppResponse::ok(response))
}

/// POST /auth/verify-token
/// Vérifie compte actif + session vivante derrière le bearer token
pub async fn verify_token(
    claims: AuthClaims,
    Extension(auth_service): Extension<Arc<AuthService>>,
) -> Result<AppResponse<VerifyTokenResponse>, AppError> {
    let response = auth_service.verify_token(&claims)?;
    Ok(AppResponse::ok(response))
}

/// POST /auth/change-password
/// Change le mot de passe et révoque les autres sessions du compte
pub async fn change_password(
    claims: AuthClaims,
    Extension(auth_service): Extension<Arc<AuthService>>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    let response =
        run_blocking(move || auth_service.change_password(&claims, &payload)).await?;
    Ok(AppResponse::ok(response))
}
