//! Moda Store Server - 时尚电商后端一致性引擎
//!
//! # 架构概述
//!
//! 本模块是商店后端的主入口，提供以下核心功能：
//!
//! - **购物车对账** (`services/cart`): 购物车行与实时库存的收敛
//! - **评价协调** (`services/review`): 一单一评、按键去重的追加式评价
//! - **评分聚合** (`services/rating`): 商品缓存评分的全量重算与回填
//! - **删除级联** (`services/cleanup`): 商品删除后的跨集合清理
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//!
//! # 模块结构
//!
//! ```text
//! moda-server/src/
//! ├── core/          # 配置、应用状态
//! ├── services/      # 购物车、评价、评分、级联、收藏、订单、目录、图片
//! ├── db/            # 模型、仓储、schema
//! ├── money.rs       # 金额计算 (rust_decimal)
//! └── utils/         # 日志、校验、时间
//! ```

pub mod core;
pub mod db;
pub mod money;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{AppState, Config};
pub use db::DbService;
pub use services::{
    CartRequest, CartService, CatalogService, CleanupService, FavoriteService, OrderService,
    RatingService, ReviewService,
};

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // 加载 .env (如果存在)
    dotenv::dotenv().ok();

    let config = Config::from_env();

    // 确保工作目录存在
    std::fs::create_dir_all(&config.work_dir)?;

    // 初始化日志
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  ___          __
   /  |/  /___  ____/ /___ _
  / /|_/ / __ \/ __  / __ `/
 / /  / / /_/ / /_/ / /_/ /
/_/  /_/\____/\__,_/\__,_/
    "#
    );
}
