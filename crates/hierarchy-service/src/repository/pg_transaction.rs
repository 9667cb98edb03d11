//! PostgreSQL 事务实现
//!
//! 每个事务独占一个从连接池借出的连接。sqlx 的 `Transaction` 在未提交即 drop 时
//! 自动回滚并将连接归还连接池，因此 panic 路径同样会释放连接。

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::traits::{HierarchyTransaction, TransactionProvider};
use crate::error::Result;
use crate::models::{NodeKind, Relation, RowLock};

/// 基于连接池的事务提供者
#[derive(Clone)]
pub struct PgTransactionProvider {
    pool: PgPool,
}

impl PgTransactionProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionProvider for PgTransactionProvider {
    type Tx = PgHierarchyTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        let tx = self.pool.begin().await?;
        Ok(PgHierarchyTransaction { tx })
    }
}

/// 持有单个连接的层级事务
pub struct PgHierarchyTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl HierarchyTransaction for PgHierarchyTransaction {
    async fn select_child_ids(
        &mut self,
        relation: Relation,
        parent_ids: &[i64],
        lock: RowLock,
    ) -> Result<Vec<i64>> {
        let lock_clause = match lock {
            RowLock::None => "",
            RowLock::ForUpdate => " FOR UPDATE",
        };
        let sql = format!(
            "SELECT id FROM {} WHERE {} = ANY($1) ORDER BY id{}",
            relation.child().table(),
            relation.foreign_key(),
            lock_clause
        );

        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .bind(parent_ids)
            .fetch_all(&mut *self.tx)
            .await?;

        debug!(?relation, parents = parent_ids.len(), children = ids.len(), "child ids selected");
        Ok(ids)
    }

    async fn deactivate_ids(&mut self, kind: NodeKind, ids: &[i64]) -> Result<u64> {
        let sql = format!(
            "UPDATE {} SET activo = false, updated_at = NOW() WHERE id = ANY($1)",
            kind.table()
        );

        let result = sqlx::query(&sql).bind(ids).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn delete_children(&mut self, relation: Relation, parent_ids: &[i64]) -> Result<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ANY($1)",
            relation.child().table(),
            relation.foreign_key()
        );

        let result = sqlx::query(&sql)
            .bind(parent_ids)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_ids(&mut self, kind: NodeKind, ids: &[i64]) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE id = ANY($1)", kind.table());

        let result = sqlx::query(&sql).bind(ids).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
