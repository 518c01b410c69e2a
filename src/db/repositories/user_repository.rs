use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, User};
use crate::db::repositories::session_repository::SessionRepository;
use crate::db::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    /// Trouver un utilisateur par ID
    pub fn find_by_id(id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        users::table
            .filter(users::id.eq(id))
            .first::<User>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_username(username: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        users::table
            .filter(users::username.eq(username))
            .first::<User>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_email(email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Résolution login: username OU email, en une seule lecture.
    pub fn find_by_username_or_email(identifier: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        users::table
            .filter(
                users::username
                    .eq(identifier)
                    .or(users::email.eq(identifier)),
            )
            .first::<User>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Créer un nouvel utilisateur. Les contraintes d'unicité de la base
    /// restent l'arbitre final des doublons (voir UniqueViolation).
    pub fn create(new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(users::table)
            .values(new_user)
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    /// Mettre à jour le dernier login
    pub fn update_last_login(id: Uuid) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::last_login_at.eq(Utc::now()))
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    /// Incrément atomique du compteur d'échecs (pas de lecture-modification-écriture:
    /// deux logins concurrents ne peuvent pas se perdre mutuellement un incrément).
    pub fn increment_failed_attempts(id: Uuid) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::failed_attempts.eq(users::failed_attempts + 1))
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    /// Pose le verrou jusqu'à l'instant donné.
    pub fn lock_until(id: Uuid, until: DateTime<Utc>) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::locked_until.eq(until))
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    /// Remet le compteur à zéro et lève le verrou, inconditionnellement.
    pub fn clear_failed_attempts(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::failed_attempts.eq(0),
                users::locked_until.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Changement de mot de passe + révocation des autres sessions, dans une
    /// même transaction: aucun état intermédiaire (ancien hash avec sessions
    /// révoquées, ou nouveau hash avec vieilles sessions actives) n'est
    /// observable ni ne survit à un crash.
    pub fn update_password_revoking_sessions(
        id: Uuid,
        new_password_hash: &str,
        session_token_to_keep: &str,
    ) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::update(users::table.filter(users::id.eq(id)))
                .set((
                    users::password_hash.eq(new_password_hash),
                    users::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            SessionRepository::revoke_all_except(conn, id, session_token_to_keep)?;

            Ok(())
        })
        .map_err(Into::into)
    }
}
