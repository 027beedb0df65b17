//! 工具模块 - 通用工具函数
//!
//! # 内容
//!
//! - [`logger`] - 日志初始化
//! - [`time`] - 时间戳工具
//! - [`validation`] - 请求字段校验

pub mod logger;
pub mod time;
pub mod validation;
