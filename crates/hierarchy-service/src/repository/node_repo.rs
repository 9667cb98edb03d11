//! 节点仓储
//!
//! 提供用例层需要的节点查询、状态更新与单行删除

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::NodeRepositoryTrait;
use crate::error::Result;
use crate::models::{NodeKind, NodeRow};

/// 节点仓储
///
/// 对五张层级表做按 id 的行级操作，表名由 `NodeKind` 决定
pub struct NodeRepository {
    pool: PgPool,
}

impl NodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NodeRepositoryTrait for NodeRepository {
    async fn get_node(&self, kind: NodeKind, id: i64) -> Result<Option<NodeRow>> {
        let sql = format!("SELECT id, activo FROM {} WHERE id = $1", kind.table());

        let row = sqlx::query_as::<_, NodeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn set_activo(&self, kind: NodeKind, id: i64, activo: bool) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET activo = $2, updated_at = NOW() WHERE id = $1",
            kind.table()
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(activo)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 删除单行
    ///
    /// 返回是否成功删除（true 表示存在并已删除，false 表示记录不存在）
    async fn delete_node(&self, kind: NodeKind, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
