use crate::db::schema::login_attempts;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = login_attempts)]
pub struct NewLoginAttempt<'a> {
    pub user_id: &'a Option<Uuid>,
    pub ip_address: &'a str,
    pub user_agent: &'a Option<String>,
    pub username_attempted: &'a str,
    pub success: bool,
}

// All fields are required for Diesel Queryable deserialization (schema alignment).
#[allow(dead_code)]
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = login_attempts)]
pub struct LoginAttempt {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub username_attempted: String,
    pub success: bool,
    pub attempted_at: DateTime<Utc>,
}
