//! CLI 命令执行
//!
//! 负责组装数据库连接、仓储、级联引擎与用例服务，并分发子命令。

use std::sync::Arc;

use anyhow::Result;
use espacios_shared::{config::AppConfig, database::Database};
use tracing::info;

use super::commands::Commands;
use crate::cascade::CascadeEngine;
use crate::models::NodeKind;
use crate::repository::{NodeRepository, PgTransactionProvider};
use crate::service::HierarchyService;

/// 执行子命令
pub async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let db = Database::connect(&config.database).await?;
    db.health_check().await?;
    info!("Database connection established");

    let result = dispatch(command, config, &db).await;

    db.close().await;
    result
}

async fn dispatch(command: Commands, config: &AppConfig, db: &Database) -> Result<()> {
    if let Commands::Migrate = command {
        db.run_migrations().await?;
        return Ok(());
    }

    let pool = db.pool().clone();
    let node_repo = Arc::new(NodeRepository::new(pool.clone()));
    let engine = Arc::new(CascadeEngine::new(
        PgTransactionProvider::new(pool),
        config.cascade,
    ));
    let service = HierarchyService::new(node_repo, engine);

    match command {
        Commands::Deactivate { kind, id } => {
            let kind = NodeKind::from(kind);
            let change = service.deactivate(kind, id).await?;
            info!(
                kind = %kind,
                id,
                cascaded = change.cascaded,
                "Deactivate command finished"
            );
        }
        Commands::Delete { kind, id } => {
            let kind = NodeKind::from(kind);
            service.delete(kind, id).await?;
            info!(kind = %kind, id, "Delete command finished");
        }
        Commands::Migrate => {}
    }

    Ok(())
}
