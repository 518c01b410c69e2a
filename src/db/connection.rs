use super::{DbConnection, DbPool};
use crate::db::error::RepositoryError;
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;
use once_cell::sync::Lazy;

pub static DB_POOL: Lazy<DbPool> = Lazy::new(|| {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let manager = ConnectionManager::<PgConnection>::new(&database_url);

    diesel::r2d2::Pool::builder()
        .max_size(5)
        .build(manager)
        .expect("Failed to create database pool")
});

/// Récupère une connexion du pool global.
pub fn get_connection() -> Result<DbConnection, RepositoryError> {
    DB_POOL.get().map_err(Into::into)
}
