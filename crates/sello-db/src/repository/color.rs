//! # Color Repository
//!
//! Database operations for catalog colors.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sello_core::Color;

/// Repository for color database operations.
pub struct ColorRepository;

impl ColorRepository {
    /// Inserts a new color.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - color name already exists
    pub async fn insert(conn: &mut SqliteConnection, color: &Color) -> DbResult<()> {
        debug!(id = %color.id, name = %color.name, "Inserting color");

        sqlx::query(
            r#"
            INSERT INTO colors (id, name, hex_code, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&color.id)
        .bind(&color.name)
        .bind(&color.hex_code)
        .bind(color.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a color by its ID.
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Color>> {
        let color = sqlx::query_as::<_, Color>(
            r#"
            SELECT id, name, hex_code, created_at
            FROM colors
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(color)
    }

    /// Lists all colors sorted by name.
    pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Color>> {
        let colors = sqlx::query_as::<_, Color>(
            r#"
            SELECT id, name, hex_code, created_at
            FROM colors
            ORDER BY name
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(colors)
    }
}

/// Helper to generate a new color ID.
pub fn generate_color_id() -> String {
    Uuid::new_v4().to_string()
}
