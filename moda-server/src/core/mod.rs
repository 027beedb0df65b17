//! 核心模块 - Core module
//!
//! 配置加载与全局应用状态。
//! Configuration loading and the shared application state.

pub mod config;
pub mod state;

pub use config::Config;
pub use state::AppState;
