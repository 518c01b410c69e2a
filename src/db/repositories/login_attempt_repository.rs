use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::login_attempt::{LoginAttempt, NewLoginAttempt};
use crate::db::schema::login_attempts;
use diesel::prelude::*;
use uuid::Uuid;

pub struct LoginAttemptRepository;

impl LoginAttemptRepository {
    /// Journalise une tentative de login (journal en append seul, jamais
    /// modifié ni purgé par ce service).
    // user_agent must be owned: NewLoginAttempt borrows &Option<String> from it
    #[allow(clippy::needless_pass_by_value)]
    pub fn create(
        user_id: Option<Uuid>,
        ip_address: &str,
        user_agent: Option<String>,
        username_attempted: &str,
        success: bool,
    ) -> Result<LoginAttempt, RepositoryError> {
        let mut conn = get_connection()?;

        let new_attempt = NewLoginAttempt {
            user_id: &user_id,
            ip_address,
            user_agent: &user_agent,
            username_attempted,
            success,
        };

        diesel::insert_into(login_attempts::table)
            .values(new_attempt)
            .get_result::<LoginAttempt>(&mut conn)
            .map_err(Into::into)
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod tests {
    use super::*;

    #[test]
    fn create_attempt_without_account_reference() {
        let attempt = LoginAttemptRepository::create(
            None,
            "203.0.113.7",
            Some("test-agent".to_string()),
            "ghost_user",
            false,
        )
        .expect("create attempt");

        assert!(attempt.user_id.is_none());
        assert!(!attempt.success);
        assert_eq!(attempt.username_attempted, "ghost_user");
    }
}
