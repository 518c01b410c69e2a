// src/rate_limit.rs
//
// Limiteur de débit à fenêtres fixes (par minute et par heure), par client.
// Composant possédé explicitement: construit au démarrage, partagé via Arc
// dans la pile de middlewares — pas de singleton global.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use securevault_api::ErrorResponse;
use std::sync::Arc;

pub const DEFAULT_PER_MINUTE: u32 = 100;
pub const DEFAULT_PER_HOUR: u32 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub per_minute: u32,
    pub per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: DEFAULT_PER_MINUTE,
            per_hour: DEFAULT_PER_HOUR,
        }
    }
}

#[derive(Debug)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

impl Window {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    /// Redémarre la fenêtre si sa durée est écoulée, puis teste le budget.
    /// Retourne le délai avant la prochaine fenêtre si le budget est épuisé.
    fn check(&mut self, now: DateTime<Utc>, length: Duration, budget: u32) -> Option<i64> {
        if now >= self.started_at + length {
            self.started_at = now;
            self.count = 0;
        }

        if self.count >= budget {
            let retry_after = (self.started_at + length - now).num_seconds().max(1);
            return Some(retry_after);
        }

        None
    }
}

#[derive(Debug)]
struct ClientWindows {
    minute: Window,
    hour: Window,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: DashMap<String, ClientWindows>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: i64 },
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    /// Les deux budgets doivent être disponibles; une requête refusée ne
    /// consomme aucun des deux.
    fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let mut entry = self
            .clients
            .entry(key.to_string())
            .or_insert_with(|| ClientWindows {
                minute: Window::new(now),
                hour: Window::new(now),
            });

        let minute_wait = entry
            .minute
            .check(now, Duration::minutes(1), self.config.per_minute);
        let hour_wait = entry
            .hour
            .check(now, Duration::hours(1), self.config.per_hour);

        match minute_wait.max(hour_wait) {
            Some(retry_after_secs) => RateLimitDecision::Limited { retry_after_secs },
            None => {
                entry.minute.count += 1;
                entry.hour.count += 1;
                RateLimitDecision::Allowed
            }
        }
    }
}

/// Middleware appliqué en amont de toutes les routes: 429 + Retry-After
/// quand le budget du client est épuisé.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = crate::auth::services::ClientInfo::from_headers(request.headers()).ip;

    match limiter.check(&key) {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            tracing::warn!(client = %key, retry_after_secs, "Rate limit exceeded");

            let body = Json(ErrorResponse {
                error: "RATE_LIMIT_EXCEEDED".to_string(),
                message: format!("Rate limit exceeded. Retry in {retry_after_secs} seconds."),
                details: None,
                locked_until: None,
            });
            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            #[allow(clippy::cast_sign_loss)]
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs as u64),
            );
            response
        }
    }
}
