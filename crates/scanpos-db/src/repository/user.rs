//! # User Repository
//!
//! Staff accounts. Emails are stored lowercased by the caller.

use sqlx::SqlitePool;
use tracing::debug;

use super::product::with_value;
use crate::error::DbResult;
use scanpos_core::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, business_name, \
     business_address, business_phone, business_gst, created_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, business_name,
                business_address, business_phone, business_gst, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.business_name)
        .bind(&user.business_address)
        .bind(&user.business_phone)
        .bind(&user.business_gst)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e.into(), &user.email))?;

        Ok(())
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
