//! Application state: shared database handle and service accessors

use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::services::{
    CartService, CatalogService, CleanupService, FavoriteService, ImageStore, LocalImageStore,
    OrderService, RatingService, ReviewService,
};
use shared::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        // 1. Database lives under work_dir/moda.db
        let db_path = PathBuf::from(&config.work_dir).join("moda.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        // 2. Image files under work_dir/images
        let images_dir = PathBuf::from(&config.work_dir).join("images");
        let images: Arc<dyn ImageStore> =
            Arc::new(LocalImageStore::new(images_dir, config.max_image_bytes));

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            images,
        })
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    // ====== Service accessors ======

    pub fn cart_service(&self) -> CartService {
        CartService::new(self.get_db())
    }

    pub fn review_service(&self) -> ReviewService {
        ReviewService::new(self.get_db())
    }

    pub fn rating_service(&self) -> RatingService {
        RatingService::new(self.get_db())
    }

    pub fn cleanup_service(&self) -> CleanupService {
        CleanupService::new(self.get_db(), self.images.clone())
    }

    pub fn favorite_service(&self) -> FavoriteService {
        FavoriteService::new(self.get_db())
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.get_db())
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.get_db(), self.images.clone())
    }
}
