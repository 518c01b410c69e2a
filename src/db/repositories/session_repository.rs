use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::session::{NewSession, Session};
use crate::db::schema::sessions;
use chrono::Utc;
use diesel::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

pub struct SessionRepository;

impl SessionRepository {
    pub fn create(new_session: &NewSession) -> Result<Session, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(sessions::table)
            .values(new_session)
            .get_result::<Session>(&mut conn)
            .map_err(Into::into)
    }

    /// Recherche une session active par son jeton. L'expiration n'est pas
    /// filtrée ici: c'est le SessionManager qui distingue expirée/introuvable.
    pub fn find_active_by_token(
        user_id: Uuid,
        session_token: &str,
    ) -> Result<Option<Session>, RepositoryError> {
        let mut conn = get_connection()?;

        sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::session_token.eq(session_token))
            .filter(sessions::is_active.eq(true))
            .first::<Session>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Horodate la dernière activité.
    pub fn touch_activity(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(sessions::table.filter(sessions::id.eq(id)))
            .set(sessions::last_activity_at.eq(Utc::now()))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Révoque la session. Idempotent: révoquer une session déjà inactive
    /// ou inexistante n'est pas une erreur.
    pub fn revoke(user_id: Uuid, session_token: &str) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::session_token.eq(session_token)),
        )
        .set(sessions::is_active.eq(false))
        .execute(&mut conn)?;

        Ok(())
    }

    /// Révoque toutes les autres sessions actives du compte. Prend la
    /// connexion en paramètre pour se composer dans la transaction du
    /// changement de mot de passe.
    pub fn revoke_all_except(
        conn: &mut PgConnection,
        user_id: Uuid,
        session_token_to_keep: &str,
    ) -> QueryResult<usize> {
        diesel::update(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::is_active.eq(true))
                .filter(sessions::session_token.ne(session_token_to_keep)),
        )
        .set(sessions::is_active.eq(false))
        .execute(conn)
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod tests {
    use super::*;
    use crate::db::models::user::NewUser;
    use crate::db::repositories::user_repository::UserRepository;
    use crate::db::schema::users;
    use chrono::Duration;

    fn create_test_user() -> Uuid {
        let unique = Uuid::new_v4();
        let new_user = NewUser {
            username: format!("sess_user_{}", unique.simple()),
            email: format!("sess_{unique}@example.com"),
            password_hash: "test_hash".to_string(),
            verification_token: None,
            verification_expires: None,
        };
        UserRepository::create(&new_user)
            .expect("Failed to create test user")
            .id
    }

    fn delete_user(id: Uuid) {
        let mut conn = get_connection().expect("connection");
        let _ = diesel::delete(users::table.filter(users::id.eq(id))).execute(&mut conn);
    }

    fn make_session(user_id: Uuid, token: &str) -> NewSession {
        NewSession {
            user_id,
            session_token: token.to_string(),
            ip_address: "127.0.0.1".to_string(),
            user_agent: Some("test-agent".to_string()),
            expires_at: Utc::now() + Duration::hours(24),
        }
    }

    #[test]
    fn create_and_find_active_session() {
        let user_id = create_test_user();
        let token = format!("tok_{}", Uuid::new_v4());

        let created = SessionRepository::create(&make_session(user_id, &token)).expect("create");
        let found = SessionRepository::find_active_by_token(user_id, &token)
            .expect("query")
            .expect("session should exist");

        assert_eq!(found.id, created.id);
        assert!(found.is_active);

        delete_user(user_id);
    }

    #[test]
    fn revoke_is_idempotent() {
        let user_id = create_test_user();
        let token = format!("tok_{}", Uuid::new_v4());
        SessionRepository::create(&make_session(user_id, &token)).expect("create");

        SessionRepository::revoke(user_id, &token).expect("first revoke");
        SessionRepository::revoke(user_id, &token).expect("second revoke should not error");

        let found = SessionRepository::find_active_by_token(user_id, &token).expect("query");
        assert!(found.is_none(), "Revoked session is no longer active");

        delete_user(user_id);
    }

    #[test]
    fn revoke_unknown_token_is_not_an_error() {
        let user_id = create_test_user();

        let result = SessionRepository::revoke(user_id, "does_not_exist");
        assert!(result.is_ok());

        delete_user(user_id);
    }
}
