//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于级联引擎与服务层依赖抽象而非具体实现，支持 mock 与内存实现测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NodeKind, NodeRow, Relation, RowLock};

/// 事务内的层级语句
///
/// 每个方法对应一条批量 SQL 语句（`= ANY($1)`），无论扇出多大，每层只产生一次往返。
/// `commit` / `rollback` 消费事务；未提交即被 drop 的事务必须回滚并归还连接。
#[async_trait]
pub trait HierarchyTransaction: Send + Sized {
    /// 查询父节点集合下的全部子节点 id
    async fn select_child_ids(
        &mut self,
        relation: Relation,
        parent_ids: &[i64],
        lock: RowLock,
    ) -> Result<Vec<i64>>;

    /// 将 id 集合内的行标记为 `activo = false`，返回影响行数
    async fn deactivate_ids(&mut self, kind: NodeKind, ids: &[i64]) -> Result<u64>;

    /// 删除外键指向父节点集合的全部子行，返回影响行数
    async fn delete_children(&mut self, relation: Relation, parent_ids: &[i64]) -> Result<u64>;

    /// 按 id 集合删除行，返回影响行数
    async fn delete_ids(&mut self, kind: NodeKind, ids: &[i64]) -> Result<u64>;

    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}

/// 事务提供者
///
/// 从连接池借出一个连接并开启事务。
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    type Tx: HierarchyTransaction;

    async fn begin(&self) -> Result<Self::Tx>;
}

/// 节点仓储接口
///
/// 供用例层做存在性检查和根节点自身的状态更新。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeRepositoryTrait: Send + Sync {
    async fn get_node(&self, kind: NodeKind, id: i64) -> Result<Option<NodeRow>>;
    async fn set_activo(&self, kind: NodeKind, id: i64, activo: bool) -> Result<()>;
    async fn delete_node(&self, kind: NodeKind, id: i64) -> Result<bool>;
}
