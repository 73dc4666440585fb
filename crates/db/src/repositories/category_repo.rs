//! Repository for the `categories` table.

use sqlx::PgPool;

use crate::models::finance::{Category, CreateCategory};

const COLUMNS: &str = "id, name, type, color, icon, created_at";

pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, type, color, icon)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(input.kind.as_str())
            .bind(&input.color)
            .bind(&input.icon)
            .fetch_one(pool)
            .await
    }

    /// List categories alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name, id");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }
}
