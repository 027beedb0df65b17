use moda_server::{AppState, Config, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    setup_environment()?;

    // 打印横幅
    print_banner();

    tracing::info!("Moda Store Server starting...");

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 初始化应用状态 (数据库, 图片存储)
    let state = AppState::initialize(&config).await?;

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Application state initialized"
    );

    // 4. 启动时回填一次缓存评分，消除离线期间积累的漂移
    let synced = state.rating_service().sync_all().await?;
    tracing::info!(products = synced, "Rating backfill finished");

    Ok(())
}
