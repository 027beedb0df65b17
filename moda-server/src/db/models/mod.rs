//! Database Models

// Serde helpers
pub mod serde_helpers;

// Catalog
pub mod product;

// Users (cart + favorites live on the user document)
pub mod user;

// Orders
pub mod order;

// Reviews
pub mod review;

// Re-exports
pub use order::{Order, OrderCreate, OrderLine, OrderLineCreate, OrderStatus};
pub use product::{Product, ProductCreate, ProductUpdate, SizeStock, Variant};
pub use review::{ProductReview, ProductReviewSubmit, Review, ReviewSubmit, ReviewUpdate};
pub use user::{CartLine, User, UserCreate};
