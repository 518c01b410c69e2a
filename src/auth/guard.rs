use crate::db::error::RepositoryError;
use crate::db::models::user::User;
use crate::db::repositories::user_repository::UserRepository;
use chrono::{Duration, Utc};
use uuid::Uuid;

pub const MAX_FAILED_ATTEMPTS: i32 = 5;
pub const LOCKOUT_MINUTES: i64 = 30;

/// Machine à états de verrouillage par compte:
/// OPEN → (échecs ≥ seuil) → LOCKED → (succès, ou fenêtre écoulée) → OPEN.
///
/// Le déverrouillage est paresseux: `is_locked` ne nettoie jamais un
/// `locked_until` passé; seul `record_success` remet l'état à zéro. Un
/// verrou périmé se lit simplement comme "non verrouillé".
#[derive(Debug, Clone)]
pub struct AccountGuard {
    max_failed_attempts: i32,
    lockout_minutes: i64,
}

impl Default for AccountGuard {
    fn default() -> Self {
        Self::new(MAX_FAILED_ATTEMPTS, LOCKOUT_MINUTES)
    }
}

impl AccountGuard {
    pub fn new(max_failed_attempts: i32, lockout_minutes: i64) -> Self {
        Self {
            max_failed_attempts,
            lockout_minutes,
        }
    }

    /// Vrai ssi un verrou est posé et encore dans le futur.
    pub fn is_locked(&self, user: &User) -> bool {
        user.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// Incrémente le compteur d'échecs (atomiquement, côté base) et pose le
    /// verrou dès que le seuil est atteint.
    pub fn record_failure(&self, user_id: Uuid) -> Result<User, RepositoryError> {
        let user = UserRepository::increment_failed_attempts(user_id)?;

        if user.failed_attempts >= self.max_failed_attempts {
            let until = Utc::now() + Duration::minutes(self.lockout_minutes);
            return UserRepository::lock_until(user_id, until);
        }

        Ok(user)
    }

    /// Remet le compteur à zéro et lève le verrou, inconditionnellement.
    pub fn record_success(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        UserRepository::clear_failed_attempts(user_id)
    }
}
