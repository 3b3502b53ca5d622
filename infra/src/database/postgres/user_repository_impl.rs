//! Postgres implementation of the UserRepository trait.
//!
//! Every operation is a single statement against the `users` table of the
//! managed database. Code consumption is a conditional `UPDATE ... RETURNING`
//! so that matching and clearing the code cannot interleave with another
//! verification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use pf_core::domain::entities::user::User;
use pf_core::errors::DomainError;
use pf_core::repositories::UserRepository;
use pf_shared::utils::phone::mask_phone_number;

const USER_COLUMNS: &str = "id, phone_number, name, email, address, security_code, \
     code_expires_at, created_at, updated_at";

/// Postgres implementation of UserRepository
pub struct PgUserRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new Postgres user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a User entity
    fn row_to_user(row: &PgRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            phone_number: row.try_get("phone_number")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            security_code: row.try_get("security_code")?,
            code_expires_at: row.try_get("code_expires_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn lookup_error(e: sqlx::Error) -> DomainError {
        DomainError::UserLookup {
            message: e.to_string(),
        }
    }

    fn persistence_error(e: sqlx::Error) -> DomainError {
        DomainError::Persistence {
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT {} FROM users WHERE phone_number = $1 LIMIT 1",
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(phone_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::lookup_error)?;

        row.as_ref()
            .map(Self::row_to_user)
            .transpose()
            .map_err(Self::lookup_error)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = format!(
            r#"
            INSERT INTO users (
                id, phone_number, name, email, address,
                security_code, code_expires_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user.id)
            .bind(&user.phone_number)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.address)
            .bind(&user.security_code)
            .bind(user.code_expires_at)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::persistence_error)?;

        tracing::debug!(
            phone = %mask_phone_number(&user.phone_number),
            user_id = %user.id,
            "Inserted user row"
        );

        Self::row_to_user(&row).map_err(Self::persistence_error)
    }

    async fn update_code(
        &self,
        phone_number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, DomainError> {
        let query = format!(
            r#"
            UPDATE users
            SET security_code = $2, code_expires_at = $3, updated_at = $4
            WHERE phone_number = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(phone_number)
            .bind(code)
            .bind(expires_at)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::persistence_error)?;

        match row {
            Some(row) => Self::row_to_user(&row).map_err(Self::persistence_error),
            None => Err(DomainError::Persistence {
                message: format!("no user with phone {}", mask_phone_number(phone_number)),
            }),
        }
    }

    async fn consume_code(
        &self,
        phone_number: &str,
        code: &str,
        valid_at: Option<DateTime<Utc>>,
    ) -> Result<Option<User>, DomainError> {
        let query = format!(
            r#"
            UPDATE users
            SET security_code = NULL, code_expires_at = NULL
            WHERE phone_number = $1
              AND security_code = $2
              AND ($3::timestamptz IS NULL OR code_expires_at > $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(phone_number)
            .bind(code)
            .bind(valid_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::lookup_error)?;

        row.as_ref()
            .map(Self::row_to_user)
            .transpose()
            .map_err(Self::lookup_error)
    }
}
