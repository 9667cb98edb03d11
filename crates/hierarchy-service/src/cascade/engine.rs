//! 级联引擎
//!
//! `CascadeRelationships` 的唯一实现。负责：
//! - 根 id 校验
//! - 通过 `run_in_transaction` 持有完整的事务边界
//! - 级联结果的日志与指标

use std::time::Instant;

use async_trait::async_trait;
use espacios_shared::config::CascadeConfig;
use espacios_shared::observability::metrics;
use tracing::{info, instrument, warn};

use super::deactivation::deactivate_descendants;
use super::deletion::delete_subtree;
use super::operation::{CascadeOperation, CascadeSummary};
use super::relationships::CascadeRelationships;
use crate::error::{HierarchyError, Result};
use crate::models::RowLock;
use crate::repository::TransactionProvider;
use crate::transaction::run_in_transaction;

/// 级联引擎
pub struct CascadeEngine<P>
where
    P: TransactionProvider,
{
    provider: P,
    config: CascadeConfig,
}

impl<P> CascadeEngine<P>
where
    P: TransactionProvider,
{
    pub fn new(provider: P, config: CascadeConfig) -> Self {
        Self { provider, config }
    }

    fn row_lock(&self) -> RowLock {
        if self.config.lock_descendants {
            RowLock::ForUpdate
        } else {
            RowLock::None
        }
    }

    /// 在单个事务内执行一次级联
    #[instrument(skip(self, operation), fields(operation = operation.name()))]
    pub async fn execute(
        &self,
        operation: CascadeOperation,
        root_id: i64,
    ) -> Result<CascadeSummary> {
        if root_id <= 0 {
            return Err(HierarchyError::Validation(format!(
                "{} id 必须为正整数: {}",
                operation.root(),
                root_id
            )));
        }

        let lock = self.row_lock();
        let start = Instant::now();

        let result = run_in_transaction(&self.provider, move |tx| {
            Box::pin(async move {
                if operation.is_deletion() {
                    delete_subtree(tx, operation, root_id, lock).await
                } else {
                    deactivate_descendants(tx, operation, root_id, lock).await
                }
            })
        })
        .await;

        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            Ok(summary) => {
                for (kind, rows) in &summary.affected {
                    metrics::record_cascade_rows(operation.name(), kind.table(), *rows);
                }
                metrics::record_cascade(operation.name(), "success", elapsed);
                info!(
                    root = %operation.root(),
                    root_id,
                    rows = summary.total_rows(),
                    "Cascade committed"
                );
            }
            Err(e) => {
                metrics::record_cascade(operation.name(), "error", elapsed);
                warn!(root = %operation.root(), root_id, error = %e, "Cascade rolled back");
            }
        }

        result
    }
}

#[async_trait]
impl<P> CascadeRelationships for CascadeEngine<P>
where
    P: TransactionProvider,
{
    async fn mark_campus_cascade_inactive(&self, campus_id: i64) -> Result<()> {
        self.execute(CascadeOperation::MarkCampusInactive, campus_id)
            .await
            .map(|_| ())
    }

    async fn mark_facultad_cascade_inactive(&self, facultad_id: i64) -> Result<()> {
        self.execute(CascadeOperation::MarkFacultadInactive, facultad_id)
            .await
            .map(|_| ())
    }

    async fn mark_bloques_cascade_inactive(&self, bloque_id: i64) -> Result<()> {
        self.execute(CascadeOperation::MarkBloqueInactive, bloque_id)
            .await
            .map(|_| ())
    }

    async fn delete_campus_cascade(&self, campus_id: i64) -> Result<()> {
        self.execute(CascadeOperation::DeleteCampus, campus_id)
            .await
            .map(|_| ())
    }

    async fn delete_facultad_cascade(&self, facultad_id: i64) -> Result<()> {
        self.execute(CascadeOperation::DeleteFacultad, facultad_id)
            .await
            .map(|_| ())
    }

    async fn delete_bloque_cascade(&self, bloque_id: i64) -> Result<()> {
        self.execute(CascadeOperation::DeleteBloque, bloque_id)
            .await
            .map(|_| ())
    }

    async fn delete_tipo_bloque_cascade(&self, tipo_bloque_id: i64) -> Result<()> {
        self.execute(CascadeOperation::DeleteTipoBloque, tipo_bloque_id)
            .await
            .map(|_| ())
    }
}
