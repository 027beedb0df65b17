//! Order Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderStatus};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "order";

// =============================================================================
// Order Repository
// =============================================================================

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a fully built order (lines and totals already snapshotted)
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// All orders of one user, newest first
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Move the order to a new status
    pub async fn set_status(&self, id: &RecordId, status: OrderStatus) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET status = $status RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", status.as_str().to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Flip the rated flag after a review mutation re-check
    pub async fn set_rated(&self, id: &RecordId, rated: bool) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET rated = $rated")
            .bind(("id", id.clone()))
            .bind(("rated", rated))
            .await?;
        Ok(())
    }
}
