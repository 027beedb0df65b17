//! Rating Aggregation Service
//!
//! product.rating / review_count 是派生缓存，这里是唯一写入方。
//! Recompute 是纯函数式的全量聚合，重复调用不改变结果。

use crate::db::repository::{ProductRepository, ReviewRepository};
use shared::AppError;
use std::collections::HashSet;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct RatingService {
    products: ProductRepository,
    reviews: ReviewRepository,
}

impl RatingService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            reviews: ReviewRepository::new(db),
        }
    }

    /// Recompute one product's aggregate from every review line that
    /// references it. With no lines left the cache resets to 0 / 0.
    /// 商品已被级联删除时写入自动落空（UPDATE 对缺失记录是 no-op）。
    pub async fn recompute(&self, product: &RecordId) -> Result<(f64, i64), AppError> {
        let reviews = self.reviews.find_touching(product).await?;

        let ratings: Vec<f64> = reviews
            .iter()
            .flat_map(|review| review.product_reviews.iter())
            .filter(|line| line.product == *product)
            .map(|line| line.rating)
            .collect();

        let count = ratings.len() as i64;
        let rating = if count == 0 {
            0.0
        } else {
            let mean = ratings.iter().sum::<f64>() / count as f64;
            (mean * 10.0).round() / 10.0
        };

        self.products.update_rating(product, rating, count).await?;

        tracing::debug!(product = %product, rating, count, "Product rating recomputed");
        Ok((rating, count))
    }

    /// Recompute a set of products one by one
    pub async fn recompute_all(&self, products: &HashSet<RecordId>) -> Result<(), AppError> {
        for product in products {
            self.recompute(product).await?;
        }
        Ok(())
    }

    /// Full catalog resync. Serial on purpose: this is a repair/backfill job
    /// and its runtime grows with catalog size.
    pub async fn sync_all(&self) -> Result<usize, AppError> {
        let all = self.products.find_all().await?;

        let mut synced = 0;
        for product in &all {
            let Some(id) = &product.id else {
                continue;
            };
            self.recompute(id).await?;
            synced += 1;
        }

        tracing::info!(count = synced, "Catalog ratings resynced");
        Ok(synced)
    }
}
