//! User Repository
//!
//! 购物车和收藏夹都内嵌在 user 文档里，这里提供针对这两个数组的
//! 原子追加 / 移除操作，整体覆盖写仅用于对账后的收敛。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CartLine, User, UserCreate};
use crate::utils::time::now_millis;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

// =============================================================================
// User Repository
// =============================================================================

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    /// Find user by email (unique)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User '{}' already exists",
                data.email
            )));
        }

        let mut user = User::new(data.email, data.name.unwrap_or_default());
        user.is_admin = data.is_admin.unwrap_or(false);
        user.created_at = now_millis();

        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;

        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Replace the whole cart array (single write, used after reconciliation)
    pub async fn set_cart(&self, id: &RecordId, cart: &[CartLine]) -> RepoResult<User> {
        let value = serde_json::to_value(cart)
            .map_err(|e| RepoError::Database(format!("Failed to serialize cart: {e}")))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET cart = $cart RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("cart", value))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Append one cart line without touching the rest of the array.
    /// 并发加购时两个追加都会落库，对账阶段再收敛。
    pub async fn push_cart_line(&self, id: &RecordId, line: &CartLine) -> RepoResult<User> {
        let value = serde_json::to_value(line)
            .map_err(|e| RepoError::Database(format!("Failed to serialize cart line: {e}")))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET cart += $line RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("line", value))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Add a product reference to the favorites array
    pub async fn add_favorite(&self, id: &RecordId, product: &RecordId) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET favorites += $product RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("product", product.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Remove a product reference from the favorites array
    pub async fn remove_favorite(&self, id: &RecordId, product: &RecordId) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET favorites -= $product RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("product", product.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Strip a deleted product from every customer favorites array.
    /// Admin accounts are skipped, they carry no shopper state.
    pub async fn pull_favorite_everywhere(&self, product: &RecordId) -> RepoResult<usize> {
        let reference = product.to_string();
        let users: Vec<User> = self
            .base
            .db()
            .query(
                "UPDATE user SET favorites -= $product \
                 WHERE is_admin = false AND favorites CONTAINS $product RETURN AFTER",
            )
            .bind(("product", reference))
            .await?
            .take(0)?;
        Ok(users.len())
    }

    /// Customers whose cart still references any of the given products
    pub async fn find_with_cart_refs(&self, product_refs: &[String]) -> RepoResult<Vec<User>> {
        let refs: Vec<String> = product_refs.to_vec();
        let users: Vec<User> = self
            .base
            .db()
            .query(
                "SELECT * FROM user \
                 WHERE is_admin = false AND cart.product CONTAINSANY $refs",
            )
            .bind(("refs", refs))
            .await?
            .take(0)?;
        Ok(users)
    }
}
