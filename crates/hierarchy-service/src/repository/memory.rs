//! 内存层级存储
//!
//! 事务语义与 PostgreSQL 实现一致的内存存储，适用于测试和本地开发：
//! - 事务在开启时的快照上读写，同时记下自己的写操作
//! - 提交时只把这些写操作重放到共享数据上，其他事务或事务外的写入不受影响
//! - 回滚或 drop 时整体丢弃
//! - 删除时检查外键引用，父节点先于子节点删除会失败
//! - 记录每条发出的语句，支持在第 N 条语句注入失败
//! - 统计连接借出与归还次数

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::{HierarchyTransaction, NodeRepositoryTrait, TransactionProvider};
use crate::error::{HierarchyError, Result};
use crate::models::{NodeKind, NodeRow, Relation, RowLock};

type Rows = BTreeMap<(NodeKind, i64), MemoryNode>;

/// 事务内已生效的写操作，提交时按顺序重放
#[derive(Debug, Clone)]
enum Change {
    Deactivate(NodeKind, Vec<i64>),
    Remove(NodeKind, Vec<i64>),
}

/// 内存中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNode {
    pub kind: NodeKind,
    pub id: i64,
    /// 层级父节点（campus_id / facultad_id / bloque_id）
    pub parent_id: Option<i64>,
    /// 仅 Bloque 使用
    pub tipo_bloque_id: Option<i64>,
    pub activo: bool,
}

impl MemoryNode {
    fn new(kind: NodeKind, id: i64, parent_id: Option<i64>) -> Self {
        Self {
            kind,
            id,
            parent_id,
            tipo_bloque_id: None,
            activo: true,
        }
    }

    pub fn campus(id: i64) -> Self {
        Self::new(NodeKind::Campus, id, None)
    }

    pub fn facultad(id: i64, campus_id: i64) -> Self {
        Self::new(NodeKind::Facultad, id, Some(campus_id))
    }

    pub fn bloque(id: i64, facultad_id: i64) -> Self {
        Self::new(NodeKind::Bloque, id, Some(facultad_id))
    }

    pub fn ambiente(id: i64, bloque_id: i64) -> Self {
        Self::new(NodeKind::Ambiente, id, Some(bloque_id))
    }

    pub fn tipo_bloque(id: i64) -> Self {
        Self::new(NodeKind::TipoBloque, id, None)
    }

    pub fn with_tipo_bloque(mut self, tipo_bloque_id: i64) -> Self {
        self.tipo_bloque_id = Some(tipo_bloque_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.activo = false;
        self
    }

    /// 该行通过 relation 指向的父节点 id
    fn parent_via(&self, relation: Relation) -> Option<i64> {
        if self.kind != relation.child() {
            return None;
        }
        match relation {
            Relation::TipoBloqueBloques => self.tipo_bloque_id,
            _ => self.parent_id,
        }
    }

    /// 该行的所有外键引用
    fn references(&self) -> Vec<(NodeKind, i64)> {
        let mut refs = Vec::with_capacity(2);
        let parent_kind = match self.kind {
            NodeKind::Facultad => Some(NodeKind::Campus),
            NodeKind::Bloque => Some(NodeKind::Facultad),
            NodeKind::Ambiente => Some(NodeKind::Bloque),
            NodeKind::Campus | NodeKind::TipoBloque => None,
        };
        if let (Some(kind), Some(id)) = (parent_kind, self.parent_id) {
            refs.push((kind, id));
        }
        if let Some(tipo) = self.tipo_bloque_id {
            refs.push((NodeKind::TipoBloque, tipo));
        }
        refs
    }
}

/// 已发出的语句
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    SelectChildIds {
        relation: Relation,
        parent_ids: Vec<i64>,
        lock: RowLock,
    },
    Deactivate {
        kind: NodeKind,
        ids: Vec<i64>,
    },
    DeleteChildren {
        relation: Relation,
        parent_ids: Vec<i64>,
    },
    Delete {
        kind: NodeKind,
        ids: Vec<i64>,
    },
}

impl Statement {
    /// 是否为写语句
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::SelectChildIds { .. })
    }
}

#[derive(Debug, Default)]
struct Inner {
    rows: Rows,
    statements: Vec<Statement>,
    /// 每个事务内第 N 条语句（从 1 开始）失败
    fail_on_statement: Option<usize>,
    fail_rollback: bool,
    acquired: usize,
    released: usize,
    commits: usize,
    rollbacks: usize,
}

/// 内存层级存储
///
/// 克隆共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖一行（不经过事务）
    pub fn insert(&self, node: MemoryNode) {
        self.inner.lock().rows.insert((node.kind, node.id), node);
    }

    pub fn get(&self, kind: NodeKind, id: i64) -> Option<MemoryNode> {
        self.inner.lock().rows.get(&(kind, id)).cloned()
    }

    pub fn contains(&self, kind: NodeKind, id: i64) -> bool {
        self.inner.lock().rows.contains_key(&(kind, id))
    }

    /// 所有行的快照
    pub fn snapshot(&self) -> Vec<MemoryNode> {
        self.inner.lock().rows.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按发出顺序返回全部语句（含失败语句）
    pub fn statements(&self) -> Vec<Statement> {
        self.inner.lock().statements.clone()
    }

    /// 让之后每个事务的第 `n` 条语句失败
    pub fn fail_on_statement(&self, n: usize) {
        self.inner.lock().fail_on_statement = Some(n);
    }

    /// 取消所有注入的失败
    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock();
        inner.fail_on_statement = None;
        inner.fail_rollback = false;
    }

    /// 让回滚本身失败
    pub fn fail_rollback(&self, fail: bool) {
        self.inner.lock().fail_rollback = fail;
    }

    pub fn commits(&self) -> usize {
        self.inner.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.inner.lock().rollbacks
    }

    pub fn acquired_connections(&self) -> usize {
        self.inner.lock().acquired
    }

    pub fn released_connections(&self) -> usize {
        self.inner.lock().released
    }

    /// 当前借出未归还的连接数
    pub fn open_connections(&self) -> usize {
        let inner = self.inner.lock();
        inner.acquired - inner.released
    }
}

#[async_trait]
impl TransactionProvider for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx> {
        let staged = {
            let mut inner = self.inner.lock();
            inner.acquired += 1;
            inner.rows.clone()
        };

        Ok(MemoryTransaction {
            store: self.clone(),
            staged,
            pending: Vec::new(),
            issued: 0,
            released: false,
        })
    }
}

#[async_trait]
impl NodeRepositoryTrait for MemoryStore {
    async fn get_node(&self, kind: NodeKind, id: i64) -> Result<Option<NodeRow>> {
        Ok(self.get(kind, id).map(|node| NodeRow {
            id: node.id,
            activo: node.activo,
        }))
    }

    async fn set_activo(&self, kind: NodeKind, id: i64, activo: bool) -> Result<()> {
        if let Some(node) = self.inner.lock().rows.get_mut(&(kind, id)) {
            node.activo = activo;
        }
        Ok(())
    }

    async fn delete_node(&self, kind: NodeKind, id: i64) -> Result<bool> {
        let mut inner = self.inner.lock();
        let removed = remove_checked(&mut inner.rows, kind, &[id])?;
        Ok(removed > 0)
    }
}

/// 内存事务
pub struct MemoryTransaction {
    store: MemoryStore,
    staged: Rows,
    pending: Vec<Change>,
    issued: usize,
    released: bool,
}

impl MemoryTransaction {
    /// 记录语句并在命中注入点时失败
    fn issue(&mut self, statement: Statement) -> Result<()> {
        self.issued += 1;
        let mut inner = self.store.inner.lock();
        inner.statements.push(statement);

        if inner.fail_on_statement == Some(self.issued) {
            return Err(HierarchyError::Database(sqlx::Error::Protocol(format!(
                "injected failure at statement {}",
                self.issued
            ))));
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.store.inner.lock().released += 1;
        }
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl HierarchyTransaction for MemoryTransaction {
    async fn select_child_ids(
        &mut self,
        relation: Relation,
        parent_ids: &[i64],
        lock: RowLock,
    ) -> Result<Vec<i64>> {
        self.issue(Statement::SelectChildIds {
            relation,
            parent_ids: parent_ids.to_vec(),
            lock,
        })?;

        Ok(self
            .staged
            .values()
            .filter(|node| {
                node.parent_via(relation)
                    .is_some_and(|parent| parent_ids.contains(&parent))
            })
            .map(|node| node.id)
            .collect())
    }

    async fn deactivate_ids(&mut self, kind: NodeKind, ids: &[i64]) -> Result<u64> {
        self.issue(Statement::Deactivate {
            kind,
            ids: ids.to_vec(),
        })?;

        let mut affected = 0;
        for id in ids {
            if let Some(node) = self.staged.get_mut(&(kind, *id)) {
                node.activo = false;
                affected += 1;
            }
        }
        self.pending.push(Change::Deactivate(kind, ids.to_vec()));
        Ok(affected)
    }

    async fn delete_children(&mut self, relation: Relation, parent_ids: &[i64]) -> Result<u64> {
        self.issue(Statement::DeleteChildren {
            relation,
            parent_ids: parent_ids.to_vec(),
        })?;

        let ids: Vec<i64> = self
            .staged
            .values()
            .filter(|node| {
                node.parent_via(relation)
                    .is_some_and(|parent| parent_ids.contains(&parent))
            })
            .map(|node| node.id)
            .collect();
        let affected = remove_checked(&mut self.staged, relation.child(), &ids)?;
        self.pending.push(Change::Remove(relation.child(), ids));
        Ok(affected)
    }

    async fn delete_ids(&mut self, kind: NodeKind, ids: &[i64]) -> Result<u64> {
        self.issue(Statement::Delete {
            kind,
            ids: ids.to_vec(),
        })?;

        let affected = remove_checked(&mut self.staged, kind, ids)?;
        self.pending.push(Change::Remove(kind, ids.to_vec()));
        Ok(affected)
    }

    async fn commit(mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        {
            let mut inner = self.store.inner.lock();
            for change in pending {
                match change {
                    Change::Deactivate(kind, ids) => {
                        for id in ids {
                            if let Some(node) = inner.rows.get_mut(&(kind, id)) {
                                node.activo = false;
                            }
                        }
                    }
                    Change::Remove(kind, ids) => {
                        for id in ids {
                            inner.rows.remove(&(kind, id));
                        }
                    }
                }
            }
            inner.commits += 1;
        }
        self.release();
        Ok(())
    }

    async fn rollback(mut self) -> Result<()> {
        let fail = {
            let mut inner = self.store.inner.lock();
            inner.rollbacks += 1;
            inner.fail_rollback
        };
        self.release();

        if fail {
            return Err(HierarchyError::Database(sqlx::Error::Protocol(
                "injected rollback failure".to_string(),
            )));
        }
        Ok(())
    }
}

/// 删除 id 集合内的行，若仍有其他行引用它们则整条语句失败
fn remove_checked(rows: &mut Rows, kind: NodeKind, ids: &[i64]) -> Result<u64> {
    let referenced = rows.values().find_map(|node| {
        if node.kind == kind && ids.contains(&node.id) {
            return None;
        }
        node.references()
            .into_iter()
            .find(|(ref_kind, ref_id)| *ref_kind == kind && ids.contains(ref_id))
            .map(|_| node)
    });

    if let Some(child) = referenced {
        return Err(HierarchyError::Database(sqlx::Error::Protocol(format!(
            "delete on {} violates foreign key constraint: still referenced by {} id={}",
            kind.table(),
            child.kind.table(),
            child.id
        ))));
    }

    let mut affected = 0;
    for id in ids {
        if rows.remove(&(kind, *id)).is_some() {
            affected += 1;
        }
    }
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(MemoryNode::campus(1));
        store.insert(MemoryNode::facultad(10, 1));
        store.insert(MemoryNode::bloque(100, 10));
        store.insert(MemoryNode::ambiente(1000, 100));
        store
    }

    #[tokio::test]
    async fn test_uncommitted_changes_are_discarded_on_drop() {
        let store = seeded();
        {
            let mut tx = store.begin().await.unwrap();
            tx.deactivate_ids(NodeKind::Facultad, &[10]).await.unwrap();
            assert_eq!(store.open_connections(), 1);
        }

        assert!(store.get(NodeKind::Facultad, 10).unwrap().activo);
        assert_eq!(store.open_connections(), 0);
        assert_eq!(store.commits(), 0);
    }

    #[tokio::test]
    async fn test_commit_applies_staged_rows() {
        let store = seeded();
        let mut tx = store.begin().await.unwrap();
        tx.deactivate_ids(NodeKind::Ambiente, &[1000]).await.unwrap();
        tx.commit().await.unwrap();

        assert!(!store.get(NodeKind::Ambiente, 1000).unwrap().activo);
        assert_eq!(store.released_connections(), 1);
    }

    #[tokio::test]
    async fn test_interleaved_commits_keep_each_others_writes() {
        let store = seeded();
        store.insert(MemoryNode::facultad(20, 1));

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.deactivate_ids(NodeKind::Facultad, &[10]).await.unwrap();
        second.deactivate_ids(NodeKind::Facultad, &[20]).await.unwrap();
        first.commit().await.unwrap();
        second.commit().await.unwrap();

        assert!(!store.get(NodeKind::Facultad, 10).unwrap().activo);
        assert!(!store.get(NodeKind::Facultad, 20).unwrap().activo);
        assert_eq!(store.commits(), 2);
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_commit_keeps_rows_written_outside_the_transaction() {
        let store = seeded();

        let mut tx = store.begin().await.unwrap();
        tx.delete_ids(NodeKind::Ambiente, &[1000]).await.unwrap();
        store.insert(MemoryNode::campus(99));
        store.set_activo(NodeKind::Campus, 1, false).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.contains(NodeKind::Campus, 99));
        assert!(!store.get(NodeKind::Campus, 1).unwrap().activo);
        assert!(!store.contains(NodeKind::Ambiente, 1000));
    }

    #[tokio::test]
    async fn test_delete_parent_before_child_violates_foreign_key() {
        let store = seeded();
        let mut tx = store.begin().await.unwrap();

        let err = tx.delete_ids(NodeKind::Bloque, &[100]).await.unwrap_err();
        assert!(err.to_string().contains("foreign key"));

        tx.rollback().await.unwrap();
        assert!(store.contains(NodeKind::Bloque, 100));
    }

    #[tokio::test]
    async fn test_select_child_ids_by_catalog_relation() {
        let store = seeded();
        store.insert(MemoryNode::tipo_bloque(7));
        store.insert(MemoryNode::bloque(101, 10).with_tipo_bloque(7));

        let mut tx = store.begin().await.unwrap();
        let ids = tx
            .select_child_ids(Relation::TipoBloqueBloques, &[7], RowLock::None)
            .await
            .unwrap();
        assert_eq!(ids, vec![101]);
    }

    #[tokio::test]
    async fn test_injected_failure_counts_per_transaction() {
        let store = seeded();
        store.fail_on_statement(2);

        let mut tx = store.begin().await.unwrap();
        tx.select_child_ids(Relation::CampusFacultades, &[1], RowLock::None)
            .await
            .unwrap();
        assert!(tx.deactivate_ids(NodeKind::Facultad, &[10]).await.is_err());
        drop(tx);

        assert_eq!(store.statements().len(), 2);
        assert_eq!(store.open_connections(), 0);
    }
}
