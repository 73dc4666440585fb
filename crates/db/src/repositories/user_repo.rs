//! Repository for the `users` and `user_roles` tables.

use empodhera_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Columns of `users` mapped onto [`User`].
const COLUMNS: &str = "id, email, name, phone, password_hash, is_active, created_at, updated_at";

/// Provides account and role operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user. Roles are granted separately.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, phone, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Look up a user by `users.id`.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by (normalised) email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Grant a role. Granting a role the user already has is a no-op.
    pub async fn add_role(pool: &PgPool, user_id: DbId, role: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_user_roles_user_role DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Role names held by a user, alphabetically.
    pub async fn roles(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
