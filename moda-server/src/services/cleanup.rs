//! Deletion Cascade Service
//!
//! 商品删除后的跨集合清理。步骤顺序执行，不包在一个事务里：
//! 任何一步失败只记日志并继续，结果是尽力而为的最终一致。

use crate::db::models::{CartLine, Product};
use crate::db::repository::{ProductRepository, ReviewRepository, UserRepository};
use crate::services::images::ImageStore;
use crate::services::rating::RatingService;
use shared::{AppError, ErrorCode};
use std::collections::HashSet;
use std::sync::Arc;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Summary returned to the admin caller
#[derive(Debug, Clone, serde::Serialize)]
pub struct CascadeReport {
    pub deleted_count: usize,
    pub deleted_ids: Vec<String>,
}

// =============================================================================
// Cleanup Service
// =============================================================================

#[derive(Clone)]
pub struct CleanupService {
    products: ProductRepository,
    users: UserRepository,
    reviews: ReviewRepository,
    rating: RatingService,
    images: Arc<dyn ImageStore>,
}

impl CleanupService {
    pub fn new(db: Surreal<Db>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            reviews: ReviewRepository::new(db.clone()),
            rating: RatingService::new(db),
            images,
        }
    }

    /// Delete products and strip every reference to them: favorites, cart
    /// lines, review lines, stored images. Ratings of co-reviewed products
    /// are repaired afterwards.
    pub async fn delete_products(&self, ids: &[String]) -> Result<CascadeReport, AppError> {
        // 1. Keep well-formed product ids only
        let candidates: Vec<RecordId> = ids
            .iter()
            .filter_map(|raw| {
                let id = raw.parse::<RecordId>().ok()?;
                (id.table() == "product").then_some(id)
            })
            .collect();
        if candidates.is_empty() {
            return Err(AppError::validation("No valid product ids supplied"));
        }

        // 2. Load what actually exists
        let found: Vec<Product> = self.products.find_by_ids(&candidates).await?;
        if found.is_empty() {
            return Err(AppError::new(ErrorCode::ProductNotFound));
        }
        let image_urls: Vec<String> = found
            .iter()
            .flat_map(|p| p.images.iter().cloned())
            .collect();

        // 3. Delete the product documents
        let mut deleted: Vec<RecordId> = Vec::with_capacity(found.len());
        for product in &found {
            let Some(id) = &product.id else { continue };
            match self.products.delete(id).await {
                Ok(()) => deleted.push(id.clone()),
                Err(e) => tracing::warn!(product = %id, error = %e, "Cascade: product delete failed"),
            }
        }

        // 4. Favorites (customer accounts only)
        for id in &deleted {
            match self.users.pull_favorite_everywhere(id).await {
                Ok(count) if count > 0 => {
                    tracing::info!(product = %id, users = count, "Cascade: favorites cleaned");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(product = %id, error = %e, "Cascade: favorites cleanup failed");
                }
            }
        }

        // 5. Cart lines (customer accounts only)
        if let Err(e) = self.cleanup_carts(&deleted).await {
            tracing::warn!(error = %e, "Cascade: cart cleanup failed");
        }

        // 6. Review lines + rating repair
        if let Err(e) = self.cleanup_reviews(&deleted).await {
            tracing::warn!(error = %e, "Cascade: review cleanup failed");
        }

        // 7. Stored images, best effort
        self.delete_images(image_urls).await;

        let report = CascadeReport {
            deleted_count: deleted.len(),
            deleted_ids: deleted.iter().map(|id| id.to_string()).collect(),
        };
        tracing::info!(count = report.deleted_count, "Product cascade finished");
        Ok(report)
    }

    /// Drop cart lines referencing any deleted product, one write per user
    async fn cleanup_carts(&self, ids: &[RecordId]) -> Result<(), AppError> {
        let refs: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let users = self.users.find_with_cart_refs(&refs).await?;

        for user in &users {
            let Some(user_id) = &user.id else { continue };
            let kept: Vec<CartLine> = user
                .cart
                .iter()
                .filter(|line| !refs.contains(&line.product.to_string()))
                .cloned()
                .collect();
            if kept.len() != user.cart.len() {
                self.users.set_cart(user_id, &kept).await?;
            }
        }

        if !users.is_empty() {
            tracing::info!(users = users.len(), "Cascade: carts cleaned");
        }
        Ok(())
    }

    /// Strip review lines for deleted products. Emptied review documents are
    /// retained. Every surviving product those reviews still reference gets
    /// its rating recomputed; the deleted products themselves are gone and
    /// their cache rows with them.
    async fn cleanup_reviews(&self, ids: &[RecordId]) -> Result<(), AppError> {
        let refs: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let reviews = self.reviews.find_touching_any(&refs).await?;

        let mut affected: HashSet<RecordId> = HashSet::new();
        let mut stripped = 0usize;
        for review in &reviews {
            let Some(review_id) = &review.id else { continue };

            for line in &review.product_reviews {
                if !refs.contains(&line.product.to_string()) {
                    affected.insert(line.product.clone());
                }
            }

            let mut updated = review.clone();
            updated
                .product_reviews
                .retain(|line| !refs.contains(&line.product.to_string()));
            if updated.product_reviews.len() != review.product_reviews.len() {
                self.reviews.save_content(review_id, &updated).await?;
                stripped += 1;
            }
        }

        self.rating.recompute_all(&affected).await?;

        if stripped > 0 {
            tracing::info!(
                reviews = stripped,
                products = affected.len(),
                "Cascade: review lines stripped"
            );
        }
        Ok(())
    }

    /// Best-effort removal of stored image files; never fails the cascade
    async fn delete_images(&self, urls: Vec<String>) {
        let mut removed = 0usize;
        for url in &urls {
            match self.images.delete(url).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(url = %url, error = %e, "Cascade: image delete failed"),
            }
        }
        if removed > 0 {
            tracing::info!(count = removed, "Cascade: product images removed");
        }
    }
}
