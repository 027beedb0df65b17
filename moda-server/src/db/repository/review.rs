//! Review Repository
//!
//! 一个订单只允许一条 review 文档（唯一索引兜底），追加评论是对
//! product_reviews 数组的覆盖写，由 ReviewService 先在内存里合并。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Review;
use crate::utils::time::now_millis;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const REVIEW_TABLE: &str = "review";

// =============================================================================
// Review Repository
// =============================================================================

#[derive(Clone)]
pub struct ReviewRepository {
    base: BaseRepository,
}

impl ReviewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new review document
    pub async fn create(&self, review: Review) -> RepoResult<Review> {
        let created: Option<Review> = self.base.db().create(REVIEW_TABLE).content(review).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create review".to_string()))
    }

    /// Find review by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Review>> {
        let review: Option<Review> = self.base.db().select(id.clone()).await?;
        Ok(review)
    }

    /// The single review attached to an order, if any
    pub async fn find_by_order(&self, order: &RecordId) -> RepoResult<Option<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review WHERE order = $order LIMIT 1")
            .bind(("order", order.to_string()))
            .await?
            .take(0)?;
        Ok(reviews.into_iter().next())
    }

    /// Reviews carrying at least one line for the given product
    pub async fn find_touching(&self, product: &RecordId) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review WHERE product_reviews.product CONTAINS $product")
            .bind(("product", product.to_string()))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// Reviews carrying lines for any of the given products
    pub async fn find_touching_any(&self, product_refs: &[String]) -> RepoResult<Vec<Review>> {
        let refs: Vec<String> = product_refs.to_vec();
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review WHERE product_reviews.product CONTAINSANY $refs")
            .bind(("refs", refs))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// Overwrite header fields and the merged line array in one write
    pub async fn save_content(&self, id: &RecordId, review: &Review) -> RepoResult<Review> {
        let lines = serde_json::to_value(&review.product_reviews)
            .map_err(|e| RepoError::Database(format!("Failed to serialize review lines: {e}")))?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET overall_rating = $overall_rating, \
                 overall_comment = $overall_comment, \
                 product_reviews = $product_reviews, \
                 delivery_rating = $delivery_rating, \
                 service_rating = $service_rating, \
                 updated_at = $updated_at RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("overall_rating", review.overall_rating))
            .bind(("overall_comment", review.overall_comment.clone()))
            .bind(("product_reviews", lines))
            .bind(("delivery_rating", review.delivery_rating))
            .bind(("service_rating", review.service_rating))
            .bind(("updated_at", now_millis()))
            .await?;
        let reviews: Vec<Review> = result.take(0)?;
        reviews
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Review {} not found", id)))
    }

    /// Hard delete a review
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<Review> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Review {} not found", id)));
        }
        Ok(())
    }
}
