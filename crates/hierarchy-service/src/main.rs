//! 空间层级级联运维工具
//!
//! 加载配置、初始化可观测性后执行单条子命令。

use anyhow::Result;
use clap::Parser;
use espacios_shared::{config::AppConfig, observability};
use tracing::info;

use espacios_hierarchy::cli::{self, Cli};

const SERVICE_NAME: &str = "espacios-cascade";

#[tokio::main]
async fn main() -> Result<()> {
    // .env 文件可选
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // 1. 统一加载配置
    let config = AppConfig::load(SERVICE_NAME)?;

    // 2. 从 AppConfig 中提取可观测性配置，命令行日志级别优先
    let mut obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    if let Some(level) = &cli.log_level {
        obs_config = obs_config.with_log_level(level.clone());
    }
    observability::init(&obs_config)?;

    info!(
        environment = %config.environment,
        lock_descendants = config.cascade.lock_descendants,
        "Configuration loaded"
    );

    cli::run(cli.command, &config).await
}
