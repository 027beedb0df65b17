//! Logging Infrastructure
//!
//! tracing 订阅器装配。级别优先读 RUST_LOG，其次用配置值；
//! 配置了日志目录时额外挂一个按天滚动的文件输出。

use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults (stdout, info level)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger, optionally with a daily-rolling file appender
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let fallback = log_level.unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // 日志目录可建则写文件，建不了就只留 stdout
    if let Some(dir) = log_dir
        && std::fs::create_dir_all(dir).is_ok()
    {
        let appender = tracing_appender::rolling::daily(dir, "moda-server");
        subscriber.with_writer(appender).init();
        return;
    }

    subscriber.init();
}
