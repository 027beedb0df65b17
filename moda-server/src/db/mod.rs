//! Database Module
//!
//! Handles the embedded SurrealDB (RocksDB) instance and schema bootstrap

pub mod models;
pub mod repository;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed store at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("moda")
            .use_db("store")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!("Database connection established (SurrealDB embedded, RocksDB)");

        define_schema(&db)
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
        tracing::info!("Database schema defined");

        Ok(Self { db })
    }
}

/// Tables stay schemaless, indexes carry the uniqueness rules.
/// review.order 上的唯一索引是"一单一评"的最后防线。
pub async fn define_schema(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query("DEFINE TABLE IF NOT EXISTS product SCHEMALESS")
        .await?
        .check()?;
    db.query("DEFINE TABLE IF NOT EXISTS user SCHEMALESS")
        .await?
        .check()?;
    db.query("DEFINE TABLE IF NOT EXISTS order SCHEMALESS")
        .await?
        .check()?;
    db.query("DEFINE TABLE IF NOT EXISTS review SCHEMALESS")
        .await?
        .check()?;
    db.query("DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE")
        .await?
        .check()?;
    db.query("DEFINE INDEX IF NOT EXISTS review_order ON review FIELDS order UNIQUE")
        .await?
        .check()?;
    db.query("DEFINE INDEX IF NOT EXISTS order_user ON order FIELDS user")
        .await?
        .check()?;
    Ok(())
}
