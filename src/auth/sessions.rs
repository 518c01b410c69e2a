use crate::auth::tokens;
use crate::db::error::RepositoryError;
use crate::db::models::session::{NewSession, Session};
use crate::db::repositories::session_repository::SessionRepository;
use crate::error::AppError;
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Expiration absolue (pas glissante): 24h après création, quelle que soit
/// l'activité. `last_activity_at` n'est qu'un horodatage d'audit.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct SessionManager {
    ttl_hours: i64,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SESSION_TTL_HOURS)
    }
}

impl SessionManager {
    pub fn new(ttl_hours: i64) -> Self {
        Self { ttl_hours }
    }

    /// Crée une session active pour le compte; le jeton généré est la seule
    /// poignée de révocation du bearer token qui l'embarquera.
    pub fn create(
        &self,
        user_id: Uuid,
        ip_address: &str,
        user_agent: Option<String>,
    ) -> Result<Session, RepositoryError> {
        let new_session = NewSession {
            user_id,
            session_token: tokens::generate_token(),
            ip_address: ip_address.to_string(),
            user_agent,
            expires_at: Utc::now() + Duration::hours(self.ttl_hours),
        };

        SessionRepository::create(&new_session)
    }

    /// Valide la session embarquée dans un bearer token. Pas de moissonneur
    /// en arrière-plan: une session passée `expires_at` est déclarée morte
    /// ici, à l'usage.
    pub fn validate(&self, user_id: Uuid, session_token: &str) -> Result<Session, AppError> {
        let session = SessionRepository::find_active_by_token(user_id, session_token)?
            .ok_or(AppError::SessionNotFound)?;

        if session.is_expired(Utc::now()) {
            return Err(AppError::SessionExpired);
        }

        SessionRepository::touch_activity(session.id)?;
        Ok(session)
    }

    /// Révocation idempotente: révoquer deux fois n'est pas une erreur.
    pub fn revoke(&self, user_id: Uuid, session_token: &str) -> Result<(), RepositoryError> {
        SessionRepository::revoke(user_id, session_token)
    }
}
