//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate, Variant};
use crate::utils::time::now_millis;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Find all products matching the given ids
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<Product>> {
        let ids: Vec<RecordId> = ids.to_vec();
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE id IN $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by exact name (duplicate check)
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Product '{}' already exists",
                data.name
            )));
        }

        let now = now_millis();
        let product = Product {
            id: None,
            name: data.name,
            description: data.description.unwrap_or_default(),
            category: data.category.unwrap_or_default(),
            material: data.material.unwrap_or_default(),
            price: data.price,
            variants: data.variants,
            rating: 0.0,
            review_count: 0,
            sold: 0,
            images: data.images,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (partial merge)
    pub async fn update(&self, id: &RecordId, data: ProductUpdate) -> RepoResult<Product> {
        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();

        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.material.is_some() {
            set_parts.push("material = $material");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.variants.is_some() {
            set_parts.push("variants = $variants");
        }
        if data.images.is_some() {
            set_parts.push("images = $images");
        }

        if set_parts.is_empty() {
            // No fields to update
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }
        set_parts.push("updated_at = $updated_at");

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("id", id.clone()))
            .bind(("updated_at", now_millis()));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.material {
            query = query.bind(("material", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.variants {
            // embedded objects are bound as a JSON value
            let value = serde_json::to_value(&v)
                .map_err(|e| RepoError::Database(format!("Failed to serialize variants: {e}")))?;
            query = query.bind(("variants", value));
        }
        if let Some(v) = data.images {
            query = query.bind(("images", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;

        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<Product> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Write the derived rating cache. A missing product is a silent no-op,
    /// the cascade may have removed it between read and write.
    pub async fn update_rating(&self, id: &RecordId, rating: f64, review_count: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET rating = $rating, review_count = $review_count, updated_at = $updated_at")
            .bind(("id", id.clone()))
            .bind(("rating", rating))
            .bind(("review_count", review_count))
            .bind(("updated_at", now_millis()))
            .await?;
        Ok(())
    }

    /// Persist post-purchase stock levels and bump the sold counter
    pub async fn apply_sale(&self, id: &RecordId, variants: Vec<Variant>, quantity: i64) -> RepoResult<()> {
        let value = serde_json::to_value(&variants)
            .map_err(|e| RepoError::Database(format!("Failed to serialize variants: {e}")))?;
        self.base
            .db()
            .query("UPDATE $id SET variants = $variants, sold += $quantity, updated_at = $updated_at")
            .bind(("id", id.clone()))
            .bind(("variants", value))
            .bind(("quantity", quantity))
            .bind(("updated_at", now_millis()))
            .await?;
        Ok(())
    }

    /// Append a stored image URL to the product
    pub async fn push_image(&self, id: &RecordId, url: &str) -> RepoResult<Product> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET images += $url, updated_at = $updated_at RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("url", url.to_string()))
            .bind(("updated_at", now_millis()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}
