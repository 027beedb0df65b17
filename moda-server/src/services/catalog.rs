//! Catalog Service
//!
//! 商品目录维护。rating / review_count / sold 是派生字段，
//! 创建后只能由对应服务改写，这里不接受外部值。

use crate::db::models::{Product, ProductCreate, ProductUpdate, Variant};
use crate::db::repository::ProductRepository;
use crate::services::images::ImageStore;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price,
    validate_required_text,
};
use shared::{AppError, ErrorCode};
use std::collections::HashSet;
use std::sync::Arc;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
    images: Arc<dyn ImageStore>,
}

impl CatalogService {
    pub fn new(db: Surreal<Db>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            products: ProductRepository::new(db),
            images,
        }
    }

    pub async fn create_product(&self, data: ProductCreate) -> Result<Product, AppError> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
        validate_price(data.price, "price")?;
        validate_variants(&data.variants)?;

        if self.products.find_by_name(&data.name).await?.is_some() {
            return Err(AppError::with_message(
                ErrorCode::ProductNameExists,
                format!("Product '{}' already exists", data.name),
            ));
        }

        let created = self.products.create(data).await?;
        tracing::info!(product = ?created.id, name = %created.name, "Product created");
        Ok(created)
    }

    pub async fn update_product(
        &self,
        id: &RecordId,
        data: ProductUpdate,
    ) -> Result<Product, AppError> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
            // Renaming onto another product's name is a conflict
            if let Some(other) = self.products.find_by_name(name).await?
                && other.id.as_ref() != Some(id)
            {
                return Err(AppError::with_message(
                    ErrorCode::ProductNameExists,
                    format!("Product '{name}' already exists"),
                ));
            }
        }
        validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
        if let Some(price) = data.price {
            validate_price(price, "price")?;
        }
        if let Some(variants) = &data.variants {
            validate_variants(variants)?;
        }

        if self.products.find_by_id(id).await?.is_none() {
            return Err(AppError::new(ErrorCode::ProductNotFound));
        }

        let updated = self.products.update(id, data).await?;
        tracing::info!(product = %id, "Product updated");
        Ok(updated)
    }

    pub async fn get_product(&self, id: &RecordId) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))
    }

    /// Whole catalog, newest first
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.find_all().await?)
    }

    /// Store an uploaded image and append its URL to the product.
    /// 上传失败中止操作，商品不变。
    pub async fn attach_image(&self, id: &RecordId, data: &[u8]) -> Result<Product, AppError> {
        self.get_product(id).await?;

        let url = self.images.store(data).await?;
        let updated = self.products.push_image(id, &url).await?;

        tracing::info!(product = %id, url = %url, "Product image attached");
        Ok(updated)
    }
}

/// Variants carry the stock ladder; shapes are checked before any write
fn validate_variants(variants: &[Variant]) -> Result<(), AppError> {
    if variants.is_empty() {
        return Err(AppError::validation("At least one variant is required"));
    }
    for variant in variants {
        validate_required_text(&variant.color, "color", MAX_SHORT_TEXT_LEN)?;
        if variant.sizes.is_empty() {
            return Err(AppError::validation(format!(
                "Variant '{}' has no sizes",
                variant.color
            )));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in &variant.sizes {
            validate_required_text(&entry.size, "size", MAX_SHORT_TEXT_LEN)?;
            if !seen.insert(entry.size.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate size '{}' in variant '{}'",
                    entry.size, variant.color
                )));
            }
            if entry.stock < 0 {
                return Err(AppError::validation(format!(
                    "stock must not be negative for size '{}'",
                    entry.size
                )));
            }
        }
    }
    Ok(())
}
