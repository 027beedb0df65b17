//! 时间工具函数
//!
//! 所有文档时间戳统一为 `i64` Unix millis，repository 层从这里取当前时间。

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
