//! Favorites Service
//!
//! 收藏夹是 user 文档上的弱引用集合，商品删除后由级联清理。

use crate::db::models::Product;
use crate::db::repository::{ProductRepository, UserRepository};
use crate::services::parse_ref;
use shared::{AppError, ErrorCode};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct FavoriteService {
    users: UserRepository,
    products: ProductRepository,
}

impl FavoriteService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Add a product to the favorites set. Favoriting twice is reported.
    pub async fn add(&self, user_id: &RecordId, product_ref: &str) -> Result<Vec<String>, AppError> {
        let product_id = parse_ref(product_ref, "product")?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
        self.products
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        if user.favorites.contains(&product_id) {
            return Err(AppError::new(ErrorCode::AlreadyFavorited));
        }

        let updated = self.users.add_favorite(user_id, &product_id).await?;
        tracing::info!(user = %user_id, product = %product_id, "Product favorited");
        Ok(updated.favorites.iter().map(|id| id.to_string()).collect())
    }

    /// Remove a product from the favorites set. The product itself may
    /// already be gone, only membership is checked.
    pub async fn remove(
        &self,
        user_id: &RecordId,
        product_ref: &str,
    ) -> Result<Vec<String>, AppError> {
        let product_id = parse_ref(product_ref, "product")?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
        if !user.favorites.contains(&product_id) {
            return Err(AppError::new(ErrorCode::FavoriteNotFound));
        }

        let updated = self.users.remove_favorite(user_id, &product_id).await?;
        tracing::info!(user = %user_id, product = %product_id, "Favorite removed");
        Ok(updated.favorites.iter().map(|id| id.to_string()).collect())
    }

    /// Favorited products that still resolve; stale references are skipped
    pub async fn list(&self, user_id: &RecordId) -> Result<Vec<Product>, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        if user.favorites.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.products.find_by_ids(&user.favorites).await?)
    }
}
